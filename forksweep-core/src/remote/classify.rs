//! Deletion eligibility rules for forks

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{ParentGone, RemoteRepository};

/// Default minimum inactivity window (30 days)
pub const DEFAULT_SINCE: Duration = Duration::from_secs(30 * 24 * 3600);

/// Options controlling which forks are kept
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Filter {
    /// Repository names (`name` or `owner/name`) that are always kept
    pub blacklist: BTreeSet<String>,
    pub include_private: bool,
    pub include_starred: bool,
    pub include_forked: bool,
    pub exclude_commits_ahead: bool,
    /// Forks updated more recently than this are kept
    #[serde(with = "humantime_serde")]
    pub since: Duration,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            blacklist: BTreeSet::new(),
            include_private: false,
            include_starred: false,
            include_forked: false,
            exclude_commits_ahead: false,
            since: DEFAULT_SINCE,
        }
    }
}

impl Filter {
    fn is_blacklisted(&self, repo: &RemoteRepository) -> bool {
        self.blacklist.contains(&repo.name) || self.blacklist.contains(&repo.full_name())
    }
}

/// Why a fork is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Blacklisted,
    Private,
    HasForks,
    HasStars,
    RecentlyActive,
    HasOpenPullRequest,
    CommitsAhead,
}

impl ExclusionReason {
    pub fn description(&self) -> &'static str {
        match self {
            ExclusionReason::Blacklisted => "blacklisted",
            ExclusionReason::Private => "is private",
            ExclusionReason::HasForks => "has forks",
            ExclusionReason::HasStars => "has stars",
            ExclusionReason::RecentlyActive => "recently updated",
            ExclusionReason::HasOpenPullRequest => "has open pull requests to upstream",
            ExclusionReason::CommitsAhead => "has commits ahead of upstream",
        }
    }
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Outcome of classifying one fork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Safe to delete; `note` is set when the parent is gone
    Eligible { note: Option<ParentGone> },
    Excluded(ExclusionReason),
}

impl Classification {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Classification::Eligible { .. })
    }

    pub fn reason(&self) -> Option<ExclusionReason> {
        match self {
            Classification::Excluded(reason) => Some(*reason),
            Classification::Eligible { .. } => None,
        }
    }
}

/// Classify a fork. Rules are evaluated in order and the first match wins.
pub fn classify(repo: &RemoteRepository, filter: &Filter, now: DateTime<Utc>) -> Classification {
    if filter.is_blacklisted(repo) {
        return Classification::Excluded(ExclusionReason::Blacklisted);
    }

    if let Some(gone) = repo.parent_gone() {
        return Classification::Eligible { note: Some(gone) };
    }

    let reason = if repo.private && !filter.include_private {
        Some(ExclusionReason::Private)
    } else if repo.forks > 0 && !filter.include_forked {
        Some(ExclusionReason::HasForks)
    } else if repo.stars > 0 && !filter.include_starred {
        Some(ExclusionReason::HasStars)
    } else if recently_active(repo.last_update, filter.since, now) {
        Some(ExclusionReason::RecentlyActive)
    } else if repo.open_pull_requests > 0 {
        Some(ExclusionReason::HasOpenPullRequest)
    } else if filter.exclude_commits_ahead && repo.commits_ahead > 0 {
        Some(ExclusionReason::CommitsAhead)
    } else {
        None
    };

    match reason {
        Some(reason) => Classification::Excluded(reason),
        None => Classification::Eligible { note: None },
    }
}

/// Classify a batch, keeping input order
pub fn classify_all(
    repos: Vec<RemoteRepository>,
    filter: &Filter,
    now: DateTime<Utc>,
) -> Vec<(RemoteRepository, Classification)> {
    repos
        .into_iter()
        .map(|repo| {
            let classification = classify(&repo, filter, now);
            (repo, classification)
        })
        .collect()
}

fn recently_active(
    last_update: Option<DateTime<Utc>>,
    since: Duration,
    now: DateTime<Utc>,
) -> bool {
    // A window too large for chrono keeps everything.
    let Ok(window) = chrono::Duration::from_std(since) else {
        return true;
    };
    match last_update {
        Some(updated) => now - window < updated,
        // Unknown activity keeps the fork.
        None => true,
    }
}
