//! Remote fork discovery and classification
//!
//! Forks are listed from the history service, enriched with their parent's
//! state, and classified against a [`Filter`].

mod classify;
mod enumerate;
mod model;

pub use classify::{classify, classify_all, Classification, ExclusionReason, Filter, DEFAULT_SINCE};
pub use enumerate::{find_all_forks, EnumerateOptions};
pub use model::{ParentGone, RemoteRepository};
