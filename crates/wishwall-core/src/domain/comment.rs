use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::limits::{self, COMMENT_CONTENT_MAX};
use crate::error::ValidationError;

/// Comment entity - a reply attached to exactly one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// Parent post. A reference, not ownership.
    pub post_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub upvotes: u64,
    pub created_at: DateTime<Utc>,
}

/// Row payload for inserting a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub post_id: Uuid,
    pub content: String,
}

impl NewComment {
    pub fn new(post_id: Uuid, content: &str) -> Self {
        Self {
            post_id,
            content: content.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        limits::check_content(&self.content, COMMENT_CONTENT_MAX)
    }
}
