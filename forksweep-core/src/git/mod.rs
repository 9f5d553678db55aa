//! Git operations for forksweep
//!
//! This module opens checkouts, enumerates local branches and trusted
//! remotes, and maps remote URLs to repositories on the history service.

mod branch;
mod remote_url;
mod repo;

pub use branch::LocalBranch;
pub use remote_url::{RepoSlug, DEFAULT_HOST};
pub use repo::{GitRepo, RemoteInfo, TRUSTED_REMOTES};
