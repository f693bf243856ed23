//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Input rejected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Content is empty")]
    EmptyContent,

    #[error("{field} is too long: {actual} characters (max {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Any failure reported by the remote store.
///
/// Callers treat every variant the same way; the split only exists so the
/// logs say something useful.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Rejected by store: {0}")]
    Rejected(String),

    #[error("Row not found: {table} with id {id}")]
    NotFound { table: &'static str, id: Uuid },

    #[error("Malformed row: {0}")]
    Decode(String),
}

/// Errors surfaced by the submission forms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WallError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
