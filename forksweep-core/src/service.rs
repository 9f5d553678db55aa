//! Capability interface for the remote history service
//!
//! The classification engine only talks to the remote service through
//! [`HistoryService`]. The GitHub implementation lives in `forksweep-github`;
//! tests use an in-memory fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Errors reported by a history service implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service answered with an HTTP error status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a usable answer
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ServiceError {
    /// HTTP status of the failure, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            ServiceError::Transport(_) => None,
        }
    }

    /// Whether the service answered 404
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type for history service calls
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Parent linkage of a fork
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub owner: String,
    pub name: String,
    pub default_branch: String,
}

impl ParentLink {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Repository record as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub owner: String,
    pub name: String,
    pub html_url: Option<String>,
    pub private: bool,
    pub fork: bool,
    pub archived: bool,
    pub forks_count: u64,
    pub stargazers_count: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub default_branch: String,
    /// Only populated by single-repository lookups
    pub parent: Option<ParentLink>,
}

impl RepoRecord {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Issue (or pull request, which the service reports as an issue)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: u64,
    pub is_pull_request: bool,
}

/// Result of comparing two refs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// Commits on head that are not on base
    pub ahead_by: u64,
    /// Commits on base that are not on head
    pub behind_by: u64,
}

/// Reference to a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRef {
    pub number: u64,
    pub title: String,
    pub html_url: Option<String>,
    pub merged: bool,
}

/// Answer to "which closed pull requests contain this commit?"
///
/// `Absent` means the remote does not know the commit at all, which is a
/// different answer from `Present` with no pull requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitPresence {
    Absent,
    Present(Vec<PullRef>),
}

/// Core request quota of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    pub limit: u64,
    pub remaining: u64,
    pub reset: DateTime<Utc>,
}

/// Remote history service operations consumed by the engine
#[async_trait]
pub trait HistoryService: Send + Sync {
    /// Login of the account the credentials belong to
    async fn authenticated_login(&self) -> ServiceResult<String>;

    /// All repositories owned by `login`, every page, in listing order
    async fn list_owned_repositories(&self, login: &str) -> ServiceResult<Vec<RepoRecord>>;

    /// Single repository lookup, including parent linkage for forks
    async fn get_repository(&self, owner: &str, name: &str) -> ServiceResult<RepoRecord>;

    /// Open issues and pull requests in `owner/name` created by `creator`
    async fn list_open_issues_by_creator(
        &self,
        owner: &str,
        name: &str,
        creator: &str,
    ) -> ServiceResult<Vec<IssueRecord>>;

    /// Compare `base...head` in `owner/name`
    async fn compare_commits(
        &self,
        owner: &str,
        name: &str,
        base: &str,
        head: &str,
    ) -> ServiceResult<Comparison>;

    /// Closed pull requests associated with commit `sha` in `owner/name`
    async fn closed_pulls_for_commit(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> ServiceResult<CommitPresence>;

    async fn delete_repository(&self, owner: &str, name: &str) -> ServiceResult<()>;

    async fn archive_repository(&self, owner: &str, name: &str) -> ServiceResult<()>;

    async fn rate_limit(&self) -> ServiceResult<RateBudget>;
}

/// Fetch the request budget and refuse to start when it is spent
pub async fn ensure_rate_budget(service: &dyn HistoryService) -> Result<RateBudget> {
    let budget = service.rate_limit().await?;
    debug!(
        limit = budget.limit,
        remaining = budget.remaining,
        reset = %budget.reset,
        "Rate budget"
    );
    if budget.remaining < 1 {
        warn!(reset = %budget.reset, "Rate limit exhausted");
        return Err(Error::RateLimited {
            reset: budget.reset.to_rfc3339(),
        });
    }
    Ok(budget)
}
