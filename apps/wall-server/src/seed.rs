//! Demo content for a fresh in-memory store.

use std::sync::Arc;

use wishwall_core::StoreError;
use wishwall_core::ports::RemoteStore;
use wishwall_core::repository::{CommentRepository, PostRepository};

const DEMO_WISHES: &[(&str, Option<&str>, &[&str])] = &[
    ("I wish for rain this weekend", None, &["Me too!", "The garden agrees"]),
    ("Happy birthday, hope it's a great one", Some("Amina"), &[]),
    ("More free concerts in the park", None, &["Yes please"]),
];

pub async fn seed_demo(store: Arc<dyn RemoteStore>) -> Result<(), StoreError> {
    let posts = PostRepository::new(store.clone());
    let comments = CommentRepository::new(store);

    for (content, recipient, replies) in DEMO_WISHES {
        let post = posts.create(content, *recipient).await?;
        for reply in *replies {
            comments.create(post.id, reply).await?;
        }
    }

    tracing::info!(wishes = DEMO_WISHES.len(), "Seeded demo wishes");
    Ok(())
}
