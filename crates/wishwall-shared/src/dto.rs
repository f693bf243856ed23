//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Body of `POST /api/posts/{id}/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Query string of `GET /api/wall`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WallQuery {
    pub sort: Option<String>,
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallStatus {
    Loading,
    Ready,
    Failed,
}

/// The wall as it should be rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallResponse {
    pub status: WallStatus,
    /// Loading, empty or failure message, when there is one to show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// e.g. "Showing messages for: Amina".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    pub sort: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    pub posts: Vec<PostView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    pub upvotes: u64,
    pub created_at: DateTime<Utc>,
    /// Relative age, e.g. "5m ago".
    pub age: String,
    pub upvoting: bool,
    pub comment_count: usize,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub upvotes: u64,
    pub created_at: DateTime<Utc>,
    pub age: String,
    pub upvoting: bool,
}

/// Result of an upvote click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpvoteResponse {
    /// `false` when an upvote for the same entity was still outstanding or
    /// the store did not take the write.
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upvotes: Option<u64>,
}

impl UpvoteResponse {
    pub fn applied(upvotes: u64) -> Self {
        Self {
            applied: true,
            upvotes: Some(upvotes),
        }
    }

    pub fn skipped() -> Self {
        Self {
            applied: false,
            upvotes: None,
        }
    }
}
