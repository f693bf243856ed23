use super::validation_message;
use crate::domain::limits::{self, POST_CONTENT_MAX};
use crate::domain::{NewPost, Post};
use crate::error::{ValidationError, WallError};
use crate::repository::PostRepository;

pub const EMPTY_WISH_MESSAGE: &str = "Please enter your wish";
pub const POST_FAILED_MESSAGE: &str = "Failed to post your wish. Please try again.";

/// Draft of a new wish.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    content: String,
    recipient: String,
    error: Option<String>,
}

impl PostForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.recipient = recipient.into();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Inline message from the last failed submit.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// e.g. "12/500 characters".
    pub fn character_count(&self) -> String {
        format!(
            "{}/{} characters",
            limits::char_count(&self.content),
            POST_CONTENT_MAX
        )
    }

    pub fn can_submit(&self) -> bool {
        !self.content.trim().is_empty()
    }

    pub fn validate(&self) -> Result<NewPost, ValidationError> {
        let draft = NewPost::new(&self.content, Some(&self.recipient));
        draft.validate()?;
        Ok(draft)
    }

    /// Validate and insert. On success the content is cleared; the
    /// recipient is kept for the next wish.
    pub async fn submit(&mut self, posts: &PostRepository) -> Result<Post, WallError> {
        let draft = match self.validate() {
            Ok(draft) => draft,
            Err(e) => {
                self.error = Some(validation_message(&e, EMPTY_WISH_MESSAGE));
                return Err(e.into());
            }
        };
        self.error = None;

        match posts
            .create(&draft.content, draft.recipient.as_deref())
            .await
        {
            Ok(post) => {
                self.content.clear();
                Ok(post)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create post");
                self.error = Some(POST_FAILED_MESSAGE.to_string());
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_count_uses_chars() {
        let mut form = PostForm::new();
        form.set_content("ünïcödé");
        assert_eq!(form.character_count(), "7/500 characters");
    }

    #[test]
    fn blank_content_cannot_submit() {
        let mut form = PostForm::new();
        form.set_content("   ");
        assert!(!form.can_submit());
        assert_eq!(form.validate(), Err(ValidationError::EmptyContent));
    }

    #[test]
    fn validate_normalizes_draft() {
        let mut form = PostForm::new();
        form.set_content("  more sunshine ");
        form.set_recipient("  ");
        let draft = form.validate().unwrap();
        assert_eq!(draft.content, "more sunshine");
        assert_eq!(draft.recipient, None);
    }
}
