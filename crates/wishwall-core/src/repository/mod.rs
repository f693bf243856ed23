//! Repositories - domain operations mapped onto the remote store.
//!
//! Every failure comes back as a [`StoreError`]. Nothing here retries.

mod comments;
mod posts;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use comments::CommentRepository;
pub use posts::PostRepository;

use crate::error::StoreError;
use crate::ports::Row;

fn encode<T: Serialize>(value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(StoreError::Decode(format!("expected an object, got {other}"))),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}

fn decode<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()))
}

fn upvote_patch(known_current_count: u64) -> Row {
    let mut patch = Row::new();
    patch.insert("upvotes".into(), Value::from(known_current_count.saturating_add(1)));
    patch
}
