use std::sync::Arc;

use uuid::Uuid;

use super::{decode, encode, upvote_patch};
use crate::domain::{Comment, NewComment};
use crate::error::StoreError;
use crate::ports::{Filter, OrderBy, RemoteStore, Table};

/// Comment repository over the remote `comments` table.
#[derive(Clone)]
pub struct CommentRepository {
    store: Arc<dyn RemoteStore>,
}

impl CommentRepository {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Comments on one post in conversational order, oldest first.
    pub async fn list(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let rows = self
            .store
            .select(
                Table::Comments,
                Some(Filter::eq("post_id", post_id.to_string())),
                OrderBy::ascending("created_at"),
            )
            .await?;
        rows.into_iter().map(decode).collect()
    }

    pub async fn create(&self, post_id: Uuid, content: &str) -> Result<Comment, StoreError> {
        let draft = NewComment::new(post_id, content);
        let row = self.store.insert(Table::Comments, encode(&draft)?).await?;
        let comment: Comment = decode(row)?;
        tracing::debug!(post_id = %post_id, comment_id = %comment.id, "Comment created");
        Ok(comment)
    }

    /// Same last-write-wins semantics as [`super::PostRepository::upvote`].
    pub async fn upvote(&self, id: Uuid, known_current_count: u64) -> Result<Comment, StoreError> {
        let row = self
            .store
            .update(Table::Comments, id, upvote_patch(known_current_count))
            .await?;
        decode(row)
    }
}
