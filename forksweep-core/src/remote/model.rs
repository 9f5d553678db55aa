//! Remote fork snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::service::{Comparison, IssueRecord, ParentLink, RepoRecord};

/// Why a parent repository could not be queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentGone {
    /// Lookup answered 404, or the fork has no parent linkage left
    Missing,
    /// Lookup answered 451 Unavailable For Legal Reasons
    LegallyUnavailable,
}

impl ParentGone {
    /// Map a detail lookup status to a parent state, if it denotes one
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            404 => Some(ParentGone::Missing),
            451 => Some(ParentGone::LegallyUnavailable),
            _ => None,
        }
    }
}

/// A fork with everything the classifier needs to decide on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub owner: String,
    pub name: String,
    pub html_url: Option<String>,
    pub private: bool,
    pub fork: bool,
    pub archived: bool,
    pub parent: Option<ParentLink>,
    pub forks: u64,
    pub stars: u64,
    /// Open pull requests the owner created against the parent
    pub open_pull_requests: u64,
    pub commits_ahead: u64,
    pub last_update: Option<DateTime<Utc>>,
    parent_gone: Option<ParentGone>,
}

impl RemoteRepository {
    /// Merge a detail lookup with the issue listing and comparison against the parent
    pub fn from_parts(
        detail: RepoRecord,
        issues: &[IssueRecord],
        comparison: Option<Comparison>,
    ) -> Self {
        let open_pull_requests = issues.iter().filter(|i| i.is_pull_request).count() as u64;
        let parent_gone = detail.parent.is_none().then_some(ParentGone::Missing);
        let mut repo = Self::base(detail, parent_gone);
        if parent_gone.is_none() {
            repo.open_pull_requests = open_pull_requests;
            repo.commits_ahead = comparison.map(|c| c.ahead_by).unwrap_or(0);
        }
        repo
    }

    /// Build a snapshot for a fork whose parent cannot be queried
    pub fn with_parent_gone(summary: RepoRecord, gone: ParentGone) -> Self {
        Self::base(summary, Some(gone))
    }

    fn base(record: RepoRecord, parent_gone: Option<ParentGone>) -> Self {
        Self {
            owner: record.owner,
            name: record.name,
            html_url: record.html_url,
            private: record.private,
            fork: record.fork,
            archived: record.archived,
            parent: record.parent,
            forks: record.forks_count,
            stars: record.stargazers_count,
            open_pull_requests: 0,
            commits_ahead: 0,
            last_update: record.updated_at,
            parent_gone,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn parent_name(&self) -> Option<String> {
        self.parent.as_ref().map(ParentLink::full_name)
    }

    pub fn parent_gone(&self) -> Option<ParentGone> {
        self.parent_gone
    }

    pub fn parent_missing(&self) -> bool {
        self.parent_gone == Some(ParentGone::Missing)
    }

    pub fn parent_legally_unavailable(&self) -> bool {
        self.parent_gone == Some(ParentGone::LegallyUnavailable)
    }
}
