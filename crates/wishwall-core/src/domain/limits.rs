//! Length limits shared by the forms and the store's constraints.
//!
//! Lengths are counted in `char`s, not bytes.

use crate::error::ValidationError;

pub const POST_CONTENT_MAX: usize = 500;
pub const RECIPIENT_MAX: usize = 80;
pub const COMMENT_CONTENT_MAX: usize = 400;

pub fn char_count(value: &str) -> usize {
    value.chars().count()
}

/// Check a body of text: non-empty once trimmed and at most `max` chars.
pub fn check_content(content: &str, max: usize) -> Result<(), ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    check_length("content", trimmed, max)
}

pub fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = char_count(value);
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}
