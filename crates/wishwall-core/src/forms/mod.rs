//! Submission forms.
//!
//! A form holds the user's draft, validates it before anything is sent, and
//! keeps a short inline message for the last failure. The draft survives a
//! store failure so the user can retry.

mod comment_form;
mod post_form;

pub use comment_form::{COMMENT_FAILED_MESSAGE, CommentForm, EMPTY_COMMENT_MESSAGE};
pub use post_form::{EMPTY_WISH_MESSAGE, POST_FAILED_MESSAGE, PostForm};

use crate::error::ValidationError;

fn validation_message(err: &ValidationError, empty_message: &str) -> String {
    match err {
        ValidationError::EmptyContent => empty_message.to_string(),
        ValidationError::TooLong { field, max, .. } => {
            format!("The {field} can be at most {max} characters")
        }
    }
}
