//! Domain entities - the core business objects.

mod age;
mod comment;
pub mod limits;
mod post;

pub use age::relative_age;
pub use comment::{Comment, NewComment};
pub use post::{NewPost, Post};
