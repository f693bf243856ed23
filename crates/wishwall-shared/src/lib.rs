//! # Wish Wall Shared
//!
//! Wire types exchanged between the wall server and its clients.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
