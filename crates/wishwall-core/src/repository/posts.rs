use std::sync::Arc;

use uuid::Uuid;

use super::{decode, encode, upvote_patch};
use crate::domain::{NewPost, Post};
use crate::error::StoreError;
use crate::ports::{OrderBy, RemoteStore, Table};

/// Post repository over the remote `posts` table.
#[derive(Clone)]
pub struct PostRepository {
    store: Arc<dyn RemoteStore>,
}

impl PostRepository {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    /// Insert a post. Content is trimmed; a blank recipient is left out of
    /// the row. Length checks are the caller's job.
    pub async fn create(&self, content: &str, recipient: Option<&str>) -> Result<Post, StoreError> {
        let draft = NewPost::new(content, recipient);
        let row = self.store.insert(Table::Posts, encode(&draft)?).await?;
        let post: Post = decode(row)?;
        tracing::debug!(post_id = %post.id, "Post created");
        Ok(post)
    }

    /// Every post, newest first.
    pub async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let rows = self
            .store
            .select(Table::Posts, None, OrderBy::descending("created_at"))
            .await?;
        rows.into_iter().map(decode).collect()
    }

    /// Write `known_current_count + 1`.
    ///
    /// Not an atomic increment: an upvote from another client landing between
    /// our read and this write is overwritten.
    pub async fn upvote(&self, id: Uuid, known_current_count: u64) -> Result<Post, StoreError> {
        let row = self
            .store
            .update(Table::Posts, id, upvote_patch(known_current_count))
            .await?;
        decode(row)
    }
}
