use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use super::projection::SortMode;
use super::state::{LocalPatch, UpvoteRejected, UpvoteTarget, ViewState};
use crate::error::StoreError;
use crate::ports::{ChangeEvent, ChangeHandler, Subscription, Table};
use crate::repository::{CommentRepository, PostRepository};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load wishes. Please refresh the page.";

/// Reason the view has to be rebuilt from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// First load.
    Mounted,
    /// Something changed in a subscribed table.
    RemoteChange(ChangeEvent),
    /// A post was created from this process.
    PostCreated,
}

/// Result of a local upvote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpvoteOutcome {
    Applied { upvotes: u64 },
    /// Another upvote for the same entity is still outstanding.
    AlreadyInFlight,
    NotFound,
    /// The store rejected the write. Already logged.
    Failed,
}

/// Keeps a [`ViewState`] consistent with the remote store.
///
/// The state lock is never held across a remote call, so other events
/// (including push-triggered reloads) interleave freely with upvotes.
pub struct Synchronizer {
    posts: PostRepository,
    comments: CommentRepository,
    state: RwLock<ViewState>,
    reloads: watch::Sender<u64>,
    /// Ticket handed to each reload as it starts.
    started: AtomicU64,
    /// Ticket of the newest reload whose outcome reached the state.
    applied: AtomicU64,
}

impl Synchronizer {
    pub fn new(posts: PostRepository, comments: CommentRepository) -> Self {
        let (reloads, _) = watch::channel(0);
        Self {
            posts,
            comments,
            state: RwLock::new(ViewState::default()),
            reloads,
            started: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Subscribe to post changes, then run the initial load.
    ///
    /// The returned handle keeps the subscription alive.
    pub async fn mount(self: &Arc<Self>) -> Result<Subscription, StoreError> {
        let subscription = self.attach().await?;
        self.invalidate(Invalidation::Mounted).await;
        Ok(subscription)
    }

    /// Route every change on the post table into [`Self::invalidate`].
    pub async fn attach(self: &Arc<Self>) -> Result<Subscription, StoreError> {
        let sync = Arc::clone(self);
        let handler: ChangeHandler = Box::new(move |event| {
            let sync = Arc::clone(&sync);
            Box::pin(async move {
                sync.invalidate(Invalidation::RemoteChange(event)).await;
            })
        });
        self.posts.store().subscribe(Table::Posts, handler).await
    }

    /// The single reconciliation entry point. Failures are logged and
    /// recorded in the load status.
    pub async fn invalidate(&self, reason: Invalidation) {
        tracing::debug!(?reason, "View invalidated");
        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "Failed to reload wall");
        }
    }

    /// Refetch everything and replace the local collections.
    ///
    /// One comment query per post, issued sequentially. When reloads
    /// overlap, the outcome of one that started earlier than the last
    /// applied one is discarded.
    pub async fn reload(&self) -> Result<(), StoreError> {
        let ticket = self.started.fetch_add(1, Ordering::SeqCst) + 1;

        let posts = match self.posts.list().await {
            Ok(posts) => posts,
            Err(e) => {
                self.apply(ticket, |state| state.load_failed(LOAD_FAILED_MESSAGE))
                    .await;
                self.reloads.send_modify(|generation| *generation += 1);
                return Err(e);
            }
        };

        let mut comments = HashMap::with_capacity(posts.len());
        for post in &posts {
            let thread = match self.comments.list(post.id).await {
                Ok(thread) => thread,
                Err(e) => {
                    tracing::warn!(post_id = %post.id, error = %e, "Failed to load comments");
                    Vec::new()
                }
            };
            comments.insert(post.id, thread);
        }

        let count = posts.len();
        if self
            .apply(ticket, |state| state.reconcile_from_remote(posts, comments))
            .await
        {
            tracing::debug!(posts = count, "Wall reconciled");
        } else {
            tracing::debug!(ticket, "Discarded snapshot from an overtaken reload");
        }
        self.reloads.send_modify(|generation| *generation += 1);
        Ok(())
    }

    /// Run a reload's transition unless a newer reload already landed.
    async fn apply(&self, ticket: u64, f: impl FnOnce(ViewState) -> ViewState) -> bool {
        let mut state = self.state.write().await;
        if ticket < self.applied.load(Ordering::SeqCst) {
            return false;
        }
        self.applied.store(ticket, Ordering::SeqCst);
        *state = f(std::mem::take(&mut *state));
        true
    }

    /// Refetch one post's comment thread. Failures are logged only.
    pub async fn refresh_comments(&self, post_id: Uuid) {
        match self.comments.list(post_id).await {
            Ok(thread) => {
                self.transition(|state| state.replace_comments(post_id, thread))
                    .await
            }
            Err(e) => {
                tracing::warn!(post_id = %post_id, error = %e, "Failed to refresh comments");
            }
        }
    }

    /// Hook for the post form: a new post means a full reload.
    pub async fn post_created(&self) {
        self.invalidate(Invalidation::PostCreated).await;
    }

    /// Hook for the comment form: only that post's thread is refetched.
    pub async fn comment_added(&self, post_id: Uuid) {
        self.refresh_comments(post_id).await;
    }

    pub async fn upvote_post(&self, id: Uuid) -> UpvoteOutcome {
        self.upvote(UpvoteTarget::Post(id)).await
    }

    pub async fn upvote_comment(&self, post_id: Uuid, comment_id: Uuid) -> UpvoteOutcome {
        self.upvote(UpvoteTarget::Comment {
            post_id,
            comment_id,
        })
        .await
    }

    async fn upvote(&self, target: UpvoteTarget) -> UpvoteOutcome {
        let begun = self.state.write().await.begin_upvote(target);
        let known = match begun {
            Ok(known) => known,
            Err(UpvoteRejected::InFlight) => {
                tracing::debug!(?target, "Upvote already in flight");
                return UpvoteOutcome::AlreadyInFlight;
            }
            Err(UpvoteRejected::Unknown) => return UpvoteOutcome::NotFound,
        };

        let result = match target {
            UpvoteTarget::Post(id) => self.posts.upvote(id, known).await.map(|p| p.upvotes),
            UpvoteTarget::Comment { comment_id, .. } => self
                .comments
                .upvote(comment_id, known)
                .await
                .map(|c| c.upvotes),
        };

        let mut state = self.state.write().await;
        state.finish_upvote(target);
        match result {
            Ok(upvotes) => {
                *state = std::mem::take(&mut *state).apply_local_patch(LocalPatch { target, upvotes });
                UpvoteOutcome::Applied { upvotes }
            }
            Err(e) => {
                tracing::warn!(?target, error = %e, "Failed to upvote");
                UpvoteOutcome::Failed
            }
        }
    }

    pub async fn set_sort(&self, sort: SortMode) {
        self.transition(|state| state.with_sort(sort)).await;
    }

    pub async fn set_recipient_filter(&self, input: &str) {
        self.transition(|state| state.with_recipient_filter(input))
            .await;
    }

    pub async fn clear_recipient_filter(&self) {
        self.transition(ViewState::without_recipient_filter).await;
    }

    /// Run `f` against the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&*self.state.read().await)
    }

    pub async fn snapshot(&self) -> ViewState {
        self.state.read().await.clone()
    }

    /// Receiver that ticks after every completed reload, successful or not.
    pub fn watch_reloads(&self) -> watch::Receiver<u64> {
        self.reloads.subscribe()
    }

    async fn transition(&self, f: impl FnOnce(ViewState) -> ViewState) {
        let mut state = self.state.write().await;
        *state = f(std::mem::take(&mut *state));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;
    use uuid::Uuid;

    use super::*;
    use crate::domain::Post;
    use crate::ports::{Filter, OrderBy, RemoteStore, Row};

    /// Serves posts from a list; the first post query is held until
    /// `release` is called.
    #[derive(Default)]
    struct HeldStore {
        posts: Mutex<Vec<Row>>,
        post_queries: AtomicUsize,
        gate: Notify,
    }

    impl HeldStore {
        fn add_post(&self, content: &str) -> Uuid {
            let post = Post {
                id: Uuid::new_v4(),
                content: content.into(),
                recipient: None,
                upvotes: 0,
                created_at: Utc::now(),
            };
            let row = serde_json::to_value(&post).unwrap();
            self.posts
                .lock()
                .unwrap()
                .push(row.as_object().cloned().unwrap());
            post.id
        }

        fn release(&self) {
            self.gate.notify_one();
        }
    }

    #[async_trait]
    impl RemoteStore for HeldStore {
        async fn insert(&self, _table: Table, _row: Row) -> Result<Row, StoreError> {
            Err(StoreError::Rejected("read-only".into()))
        }

        async fn select(
            &self,
            table: Table,
            _filter: Option<Filter>,
            _order: OrderBy,
        ) -> Result<Vec<Row>, StoreError> {
            if table == Table::Comments {
                return Ok(Vec::new());
            }
            let snapshot = self.posts.lock().unwrap().clone();
            if self.post_queries.fetch_add(1, Ordering::SeqCst) == 0 {
                self.gate.notified().await;
            }
            Ok(snapshot)
        }

        async fn update(&self, table: Table, id: Uuid, _patch: Row) -> Result<Row, StoreError> {
            Err(StoreError::NotFound {
                table: table.as_str(),
                id,
            })
        }

        async fn subscribe(
            &self,
            table: Table,
            _handler: ChangeHandler,
        ) -> Result<Subscription, StoreError> {
            Err(StoreError::Unavailable(format!("no feed for {table}")))
        }
    }

    fn synchronizer(store: Arc<HeldStore>) -> Arc<Synchronizer> {
        let remote: Arc<dyn RemoteStore> = store;
        Arc::new(Synchronizer::new(
            PostRepository::new(remote.clone()),
            CommentRepository::new(remote),
        ))
    }

    #[tokio::test]
    async fn test_overtaken_reload_does_not_overwrite_newer_snapshot() {
        let store = Arc::new(HeldStore::default());
        let sync = synchronizer(store.clone());

        // Starts first and reads an empty wall, then stalls.
        let stale = tokio::spawn({
            let sync = Arc::clone(&sync);
            async move { sync.reload().await }
        });
        while store.post_queries.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let id = store.add_post("arrived meanwhile");
        sync.reload().await.unwrap();
        assert_eq!(sync.read(|s| s.posts().len()).await, 1);

        store.release();
        stale.await.unwrap().unwrap();

        let posts: Vec<Uuid> = sync.read(|s| s.posts().iter().map(|p| p.id).collect()).await;
        assert_eq!(posts, vec![id]);
    }

    #[tokio::test]
    async fn test_sequential_reloads_all_apply() {
        let store = Arc::new(HeldStore::default());
        store.release();
        let sync = synchronizer(store.clone());

        sync.reload().await.unwrap();
        assert!(sync.read(|s| s.posts().is_empty()).await);

        store.add_post("later");
        sync.reload().await.unwrap();
        assert_eq!(sync.read(|s| s.posts().len()).await, 1);
    }
}
