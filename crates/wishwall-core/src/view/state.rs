use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::projection::{self, SortMode};
use crate::domain::{Comment, Post};

/// Whether the wall has been loaded yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// The entity an upvote is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpvoteTarget {
    Post(Uuid),
    Comment { post_id: Uuid, comment_id: Uuid },
}

/// Why an upvote could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpvoteRejected {
    /// An upvote for the same entity is still outstanding.
    InFlight,
    /// The entity is not in the current view.
    Unknown,
}

/// A count confirmed by the store for a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalPatch {
    pub target: UpvoteTarget,
    pub upvotes: u64,
}

/// Process-local view of the wall.
///
/// Collections are only ever replaced wholesale by
/// [`reconcile_from_remote`](Self::reconcile_from_remote) or patched one
/// count at a time by [`apply_local_patch`](Self::apply_local_patch). A
/// reconcile always wins: it overwrites any earlier patch.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    posts: Vec<Post>,
    comments: HashMap<Uuid, Vec<Comment>>,
    upvoting_posts: HashSet<Uuid>,
    upvoting_comments: HashSet<Uuid>,
    recipient_filter: Option<String>,
    sort: SortMode,
    status: LoadStatus,
}

impl ViewState {
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn comments(&self) -> &HashMap<Uuid, Vec<Comment>> {
        &self.comments
    }

    /// Comment thread of a post, oldest first.
    pub fn comments_for(&self, post_id: Uuid) -> &[Comment] {
        self.comments.get(&post_id).map_or(&[], Vec::as_slice)
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn recipient_filter(&self) -> Option<&str> {
        self.recipient_filter.as_deref()
    }

    pub fn is_upvoting(&self, target: UpvoteTarget) -> bool {
        match target {
            UpvoteTarget::Post(id) => self.upvoting_posts.contains(&id),
            UpvoteTarget::Comment { comment_id, .. } => {
                self.upvoting_comments.contains(&comment_id)
            }
        }
    }

    /// Replace posts and comment threads with a fresh remote snapshot.
    ///
    /// In-flight guards survive; they belong to requests that are still
    /// outstanding.
    pub fn reconcile_from_remote(
        self,
        posts: Vec<Post>,
        comments: HashMap<Uuid, Vec<Comment>>,
    ) -> Self {
        Self {
            posts,
            comments,
            status: LoadStatus::Ready,
            ..self
        }
    }

    /// Replace one post's comment thread.
    pub fn replace_comments(mut self, post_id: Uuid, comments: Vec<Comment>) -> Self {
        self.comments.insert(post_id, comments);
        self
    }

    /// Record a failed load. The previous collections stay visible.
    pub fn load_failed(self, message: impl Into<String>) -> Self {
        Self {
            status: LoadStatus::Failed(message.into()),
            ..self
        }
    }

    /// Overwrite a single entity's count. Entities no longer in view are
    /// ignored.
    pub fn apply_local_patch(mut self, patch: LocalPatch) -> Self {
        match patch.target {
            UpvoteTarget::Post(id) => {
                if let Some(post) = self.posts.iter_mut().find(|p| p.id == id) {
                    post.upvotes = patch.upvotes;
                }
            }
            UpvoteTarget::Comment {
                post_id,
                comment_id,
            } => {
                if let Some(comment) = self
                    .comments
                    .get_mut(&post_id)
                    .and_then(|thread| thread.iter_mut().find(|c| c.id == comment_id))
                {
                    comment.upvotes = patch.upvotes;
                }
            }
        }
        self
    }

    /// idle → in flight. Returns the count currently held for the entity.
    pub fn begin_upvote(&mut self, target: UpvoteTarget) -> Result<u64, UpvoteRejected> {
        if self.is_upvoting(target) {
            return Err(UpvoteRejected::InFlight);
        }
        let known = self.known_upvotes(target).ok_or(UpvoteRejected::Unknown)?;
        match target {
            UpvoteTarget::Post(id) => self.upvoting_posts.insert(id),
            UpvoteTarget::Comment { comment_id, .. } => self.upvoting_comments.insert(comment_id),
        };
        Ok(known)
    }

    /// in flight → idle, whatever the outcome.
    pub fn finish_upvote(&mut self, target: UpvoteTarget) {
        match target {
            UpvoteTarget::Post(id) => self.upvoting_posts.remove(&id),
            UpvoteTarget::Comment { comment_id, .. } => self.upvoting_comments.remove(&comment_id),
        };
    }

    fn known_upvotes(&self, target: UpvoteTarget) -> Option<u64> {
        match target {
            UpvoteTarget::Post(id) => self.posts.iter().find(|p| p.id == id).map(|p| p.upvotes),
            UpvoteTarget::Comment {
                post_id,
                comment_id,
            } => self
                .comments_for(post_id)
                .iter()
                .find(|c| c.id == comment_id)
                .map(|c| c.upvotes),
        }
    }

    pub fn with_sort(self, sort: SortMode) -> Self {
        Self { sort, ..self }
    }

    /// Set the recipient filter from raw input. Blank input clears it.
    pub fn with_recipient_filter(self, input: &str) -> Self {
        let trimmed = input.trim();
        Self {
            recipient_filter: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            ..self
        }
    }

    pub fn without_recipient_filter(self) -> Self {
        Self {
            recipient_filter: None,
            ..self
        }
    }

    /// Posts as currently displayed: active sort, then active filter.
    pub fn displayed_posts(&self) -> Vec<&Post> {
        self.project(self.sort, self.recipient_filter())
    }

    /// Posts under an explicit sort and filter, ignoring the active ones.
    pub fn project(&self, sort: SortMode, recipient: Option<&str>) -> Vec<&Post> {
        let sorted = projection::sort_posts(&self.posts, &self.comments, sort);
        projection::filter_by_recipient(sorted, recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(upvotes: u64) -> Post {
        Post {
            id: Uuid::new_v4(),
            content: "wish".into(),
            recipient: None,
            upvotes,
            created_at: Utc::now(),
        }
    }

    fn comment(post_id: Uuid, upvotes: u64) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            post_id,
            content: "reply".into(),
            upvotes,
            created_at: Utc::now(),
        }
    }

    fn loaded(posts: Vec<Post>, comments: HashMap<Uuid, Vec<Comment>>) -> ViewState {
        ViewState::default().reconcile_from_remote(posts, comments)
    }

    #[test]
    fn starts_loading() {
        let state = ViewState::default();
        assert_eq!(state.status(), &LoadStatus::Loading);
        assert!(state.posts().is_empty());
        assert_eq!(state.sort(), SortMode::Newest);
    }

    #[test]
    fn guard_blocks_second_upvote_until_finished() {
        let p = post(4);
        let target = UpvoteTarget::Post(p.id);
        let mut state = loaded(vec![p], HashMap::new());

        assert_eq!(state.begin_upvote(target), Ok(4));
        assert!(state.is_upvoting(target));
        assert_eq!(state.begin_upvote(target), Err(UpvoteRejected::InFlight));

        state.finish_upvote(target);
        assert!(!state.is_upvoting(target));
        assert_eq!(state.begin_upvote(target), Ok(4));
    }

    #[test]
    fn unknown_entity_is_rejected_without_guarding() {
        let mut state = ViewState::default();
        let target = UpvoteTarget::Post(Uuid::new_v4());
        assert_eq!(state.begin_upvote(target), Err(UpvoteRejected::Unknown));
        assert!(!state.is_upvoting(target));
    }

    #[test]
    fn comment_guard_is_separate_from_post_guard() {
        let p = post(0);
        let c = comment(p.id, 2);
        let post_target = UpvoteTarget::Post(p.id);
        let comment_target = UpvoteTarget::Comment {
            post_id: p.id,
            comment_id: c.id,
        };
        let mut state = loaded(vec![p.clone()], HashMap::from([(p.id, vec![c])]));

        assert_eq!(state.begin_upvote(post_target), Ok(0));
        assert_eq!(state.begin_upvote(comment_target), Ok(2));
        assert_eq!(
            state.begin_upvote(comment_target),
            Err(UpvoteRejected::InFlight)
        );
    }

    #[test]
    fn patch_touches_only_its_target() {
        let a = post(1);
        let b = post(1);
        let state = loaded(vec![a.clone(), b.clone()], HashMap::new()).apply_local_patch(
            LocalPatch {
                target: UpvoteTarget::Post(a.id),
                upvotes: 2,
            },
        );
        assert_eq!(state.posts()[0].upvotes, 2);
        assert_eq!(state.posts()[1].upvotes, 1);
    }

    #[test]
    fn patch_on_comment() {
        let p = post(0);
        let c = comment(p.id, 0);
        let state = loaded(vec![p.clone()], HashMap::from([(p.id, vec![c.clone()])]))
            .apply_local_patch(LocalPatch {
                target: UpvoteTarget::Comment {
                    post_id: p.id,
                    comment_id: c.id,
                },
                upvotes: 1,
            });
        assert_eq!(state.comments_for(p.id)[0].upvotes, 1);
    }

    #[test]
    fn reconcile_overwrites_local_patch() {
        let p = post(0);
        let stale = p.clone();
        let state = loaded(vec![p.clone()], HashMap::new())
            .apply_local_patch(LocalPatch {
                target: UpvoteTarget::Post(p.id),
                upvotes: 1,
            })
            .reconcile_from_remote(vec![stale], HashMap::new());
        assert_eq!(state.posts()[0].upvotes, 0);
    }

    #[test]
    fn reconcile_keeps_guards() {
        let p = post(0);
        let target = UpvoteTarget::Post(p.id);
        let mut state = loaded(vec![p.clone()], HashMap::new());
        state.begin_upvote(target).unwrap();

        let state = state.reconcile_from_remote(vec![p], HashMap::new());
        assert!(state.is_upvoting(target));
    }

    #[test]
    fn failed_load_keeps_previous_posts() {
        let state = loaded(vec![post(0)], HashMap::new()).load_failed("boom");
        assert_eq!(state.status(), &LoadStatus::Failed("boom".into()));
        assert_eq!(state.posts().len(), 1);
    }

    #[test]
    fn blank_filter_input_clears_filter() {
        let state = ViewState::default().with_recipient_filter("  Amina ");
        assert_eq!(state.recipient_filter(), Some("Amina"));
        let state = state.with_recipient_filter("   ");
        assert_eq!(state.recipient_filter(), None);
        let state = state
            .with_recipient_filter("Zara")
            .without_recipient_filter();
        assert_eq!(state.recipient_filter(), None);
    }

    #[test]
    fn displayed_posts_apply_sort_and_filter() {
        let mut amina = post(1);
        amina.recipient = Some("Amina".into());
        let mut popular = post(9);
        popular.recipient = Some("amina".into());
        let other = post(5);

        let state = loaded(vec![amina.clone(), popular.clone(), other], HashMap::new())
            .with_sort(SortMode::Top)
            .with_recipient_filter("AMINA");

        let shown: Vec<Uuid> = state.displayed_posts().iter().map(|p| p.id).collect();
        assert_eq!(shown, vec![popular.id, amina.id]);
    }
}
