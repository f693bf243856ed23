//! # Wish Wall Infrastructure
//!
//! Concrete implementations of the ports defined in `wishwall-core`.

pub mod store;

pub use store::{InMemoryStore, InMemoryStoreConfig};
