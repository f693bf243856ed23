//! Derived views. Pure functions of the current state, recomputed on every
//! render and never cached.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Comment, Post};

/// Display order of the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Creation time, newest first.
    #[default]
    Newest,
    /// Most upvotes first.
    Top,
    /// Longest comment thread first.
    Comments,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Newest => "newest",
            SortMode::Top => "top",
            SortMode::Comments => "comments",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sort mode: {0}")]
pub struct UnknownSortMode(pub String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortMode::Newest),
            "top" => Ok(SortMode::Top),
            "comments" => Ok(SortMode::Comments),
            other => Err(UnknownSortMode(other.to_string())),
        }
    }
}

/// Length of a post's comment thread; zero when it has no entry.
pub fn comment_count(comments: &HashMap<Uuid, Vec<Comment>>, post_id: Uuid) -> usize {
    comments.get(&post_id).map_or(0, Vec::len)
}

/// Order posts for display. The sort is stable, so equal keys keep the
/// order the store returned them in.
pub fn sort_posts<'a>(
    posts: &'a [Post],
    comments: &HashMap<Uuid, Vec<Comment>>,
    mode: SortMode,
) -> Vec<&'a Post> {
    let mut sorted: Vec<&Post> = posts.iter().collect();
    match mode {
        SortMode::Newest => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Top => sorted.sort_by(|a, b| b.upvotes.cmp(&a.upvotes)),
        SortMode::Comments => sorted.sort_by(|a, b| {
            comment_count(comments, b.id).cmp(&comment_count(comments, a.id))
        }),
    }
    sorted
}

/// Keep only posts addressed to `recipient` (case-insensitive exact match).
/// With no filter every post passes.
pub fn filter_by_recipient<'a>(posts: Vec<&'a Post>, recipient: Option<&str>) -> Vec<&'a Post> {
    match recipient {
        None => posts,
        Some(name) => posts
            .into_iter()
            .filter(|post| post.is_addressed_to(name))
            .collect(),
    }
}
