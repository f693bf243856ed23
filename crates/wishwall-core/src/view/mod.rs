//! View state synchronization.
//!
//! [`ViewState`] is the process-local copy of the wall; it is never
//! authoritative. [`Synchronizer`] keeps it in line with the remote store and
//! [`projection`] derives what gets rendered from it.

pub mod projection;
mod state;
mod sync;

pub use projection::{SortMode, UnknownSortMode};
pub use state::{LoadStatus, LocalPatch, UpvoteRejected, UpvoteTarget, ViewState};
pub use sync::{Invalidation, LOAD_FAILED_MESSAGE, Synchronizer, UpvoteOutcome};
