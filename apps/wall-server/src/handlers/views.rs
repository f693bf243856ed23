//! Domain → wire conversions.

use chrono::{DateTime, Utc};
use wishwall_core::domain::{Comment, Post, relative_age};
use wishwall_core::view::{UpvoteTarget, ViewState, projection};
use wishwall_shared::dto::{CommentView, PostView};

/// A post as it sits in the current view, with its thread.
pub fn post_view(view: &ViewState, post: &Post, now: DateTime<Utc>) -> PostView {
    let comments: Vec<CommentView> = view
        .comments_for(post.id)
        .iter()
        .map(|comment| comment_view(view, comment, now))
        .collect();

    PostView {
        upvoting: view.is_upvoting(UpvoteTarget::Post(post.id)),
        comment_count: projection::comment_count(view.comments(), post.id),
        comments,
        ..new_post(post, now)
    }
}

pub fn comment_view(view: &ViewState, comment: &Comment, now: DateTime<Utc>) -> CommentView {
    CommentView {
        upvoting: view.is_upvoting(UpvoteTarget::Comment {
            post_id: comment.post_id,
            comment_id: comment.id,
        }),
        ..new_comment(comment, now)
    }
}

/// A freshly created post: no thread, nothing in flight.
pub fn new_post(post: &Post, now: DateTime<Utc>) -> PostView {
    PostView {
        id: post.id,
        content: post.content.clone(),
        recipient: post.recipient.clone(),
        upvotes: post.upvotes,
        created_at: post.created_at,
        age: relative_age(post.created_at, now),
        upvoting: false,
        comment_count: 0,
        comments: Vec::new(),
    }
}

pub fn new_comment(comment: &Comment, now: DateTime<Utc>) -> CommentView {
    CommentView {
        id: comment.id,
        post_id: comment.post_id,
        content: comment.content.clone(),
        upvotes: comment.upvotes,
        created_at: comment.created_at,
        age: relative_age(comment.created_at, now),
        upvoting: false,
    }
}
