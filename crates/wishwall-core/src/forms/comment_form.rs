use uuid::Uuid;

use super::validation_message;
use crate::domain::{Comment, NewComment};
use crate::error::{ValidationError, WallError};
use crate::repository::CommentRepository;

pub const EMPTY_COMMENT_MESSAGE: &str = "Please enter a comment.";
pub const COMMENT_FAILED_MESSAGE: &str = "Failed to add comment. Try again.";

/// Draft of a reply to one post.
#[derive(Debug, Clone)]
pub struct CommentForm {
    post_id: Uuid,
    content: String,
    error: Option<String>,
}

impl CommentForm {
    pub fn new(post_id: Uuid) -> Self {
        Self {
            post_id,
            content: String::new(),
            error: None,
        }
    }

    pub fn post_id(&self) -> Uuid {
        self.post_id
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validate(&self) -> Result<NewComment, ValidationError> {
        let draft = NewComment::new(self.post_id, &self.content);
        draft.validate()?;
        Ok(draft)
    }

    pub async fn submit(&mut self, comments: &CommentRepository) -> Result<Comment, WallError> {
        let draft = match self.validate() {
            Ok(draft) => draft,
            Err(e) => {
                self.error = Some(validation_message(&e, EMPTY_COMMENT_MESSAGE));
                return Err(e.into());
            }
        };
        self.error = None;

        match comments.create(draft.post_id, &draft.content).await {
            Ok(comment) => {
                self.content.clear();
                Ok(comment)
            }
            Err(e) => {
                tracing::warn!(post_id = %self.post_id, error = %e, "Failed to create comment");
                self.error = Some(COMMENT_FAILED_MESSAGE.to_string());
                Err(e.into())
            }
        }
    }
}
