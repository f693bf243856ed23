//! Application state - shared across all handlers.

use std::sync::Arc;

use wishwall_core::StoreError;
use wishwall_core::ports::{RemoteStore, Subscription};
use wishwall_core::repository::{CommentRepository, PostRepository};
use wishwall_core::view::Synchronizer;
use wishwall_infra::InMemoryStore;

use crate::config::AppConfig;
use crate::seed;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostRepository,
    pub comments: CommentRepository,
    pub sync: Arc<Synchronizer>,
    /// Keeps the post-table subscription alive for as long as any worker
    /// holds the state.
    _subscription: Arc<Subscription>,
}

impl AppState {
    /// Build the store from config, optionally seed it, and mount the wall.
    pub async fn new(config: &AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn RemoteStore> = Arc::new(InMemoryStore::new(config.store.clone()));
        if config.seed_demo {
            seed::seed_demo(store.clone()).await?;
        }
        Self::mount(store).await
    }

    /// Wire repositories and the synchronizer onto an existing store.
    pub async fn mount(store: Arc<dyn RemoteStore>) -> Result<Self, StoreError> {
        let posts = PostRepository::new(store.clone());
        let comments = CommentRepository::new(store);
        let sync = Arc::new(Synchronizer::new(posts.clone(), comments.clone()));
        let subscription = sync.mount().await?;

        tracing::info!("Application state initialized");

        Ok(Self {
            posts,
            comments,
            sync,
            _subscription: Arc::new(subscription),
        })
    }
}
