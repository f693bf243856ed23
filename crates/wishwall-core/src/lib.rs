//! # Wish Wall Core
//!
//! The domain layer of the wish wall.
//! Entities, the remote store port, the repositories built on it, the view
//! state synchronizer and the submission forms. Concrete backends live in
//! `wishwall-infra`.

pub mod domain;
pub mod error;
pub mod forms;
pub mod ports;
pub mod repository;
pub mod view;

pub use error::{StoreError, ValidationError, WallError};
