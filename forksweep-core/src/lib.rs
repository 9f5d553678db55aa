//! forksweep core - merge-safety classification of forks and local checkouts
//!
//! Decides which GitHub forks and which local git working copies can be
//! deleted without losing work. The remote side enumerates an account's forks
//! and classifies each one; the local side scans checkouts with bounded
//! concurrency and resolves every branch against trusted remotes. Both feed
//! the same selection and execution stage.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod git;
pub mod local;
pub mod pool;
pub mod remote;
pub mod secrets;
pub mod selection;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{CliOverrides, Config, GitHubConfig, ScanConfig};
pub use coordinator::Coordinator;
pub use error::{Error, Result};
pub use executor::{execute, Action};
pub use local::{BranchMergeOutcome, LocalCheckout};
pub use pool::WorkerPool;
pub use remote::{
    classify, classify_all, find_all_forks, Classification, EnumerateOptions, ExclusionReason,
    Filter, ParentGone, RemoteRepository,
};
pub use secrets::github_token;
pub use selection::{select_local, select_remote, split_by_selection, Candidate, Target};
pub use service::{
    ensure_rate_budget, CommitPresence, Comparison, HistoryService, IssueRecord, ParentLink,
    PullRef, RateBudget, RepoRecord, ServiceError, ServiceResult,
};
