use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::limits::{self, POST_CONTENT_MAX, RECIPIENT_MAX};
use crate::error::ValidationError;

/// Post entity - a single anonymous wish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub content: String,
    /// Name the wish is addressed to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default)]
    pub upvotes: u64,
    /// Assigned by the store at insert time.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Case-insensitive exact match against the recipient name.
    /// Posts without a recipient never match.
    pub fn is_addressed_to(&self, name: &str) -> bool {
        self.recipient
            .as_deref()
            .is_some_and(|recipient| recipient.to_lowercase() == name.to_lowercase())
    }
}

/// Row payload for inserting a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub content: String,
    /// Omitted from the row entirely when absent, never stored as "".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl NewPost {
    /// Normalize raw input: trim the content, drop a blank recipient.
    pub fn new(content: &str, recipient: Option<&str>) -> Self {
        Self {
            content: content.trim().to_string(),
            recipient: recipient
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        limits::check_content(&self.content, POST_CONTENT_MAX)?;
        if let Some(recipient) = &self.recipient {
            limits::check_length("recipient", recipient, RECIPIENT_MAX)?;
        }
        Ok(())
    }
}
