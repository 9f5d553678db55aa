//! Branch merge-state resolution against trusted remotes

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::checkout::BranchMergeOutcome;
use crate::git::{LocalBranch, RemoteInfo, RepoSlug, TRUSTED_REMOTES};
use crate::service::{CommitPresence, HistoryService};
use crate::Result;

/// Outcomes for every branch of a checkout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedBranches {
    pub outcomes: BTreeMap<String, BranchMergeOutcome>,
    /// Distinct trusted-remote URLs consulted, in first-seen order
    pub remotes_checked: Vec<String>,
}

/// Resolve every branch against the trusted subset of `remotes`
///
/// Remotes not named in [`TRUSTED_REMOTES`] are ignored even when they
/// contain the commit.
pub async fn resolve_branches(
    service: &dyn HistoryService,
    branches: &[LocalBranch],
    remotes: &[RemoteInfo],
    host: &str,
) -> Result<ResolvedBranches> {
    let trusted: Vec<&RemoteInfo> = TRUSTED_REMOTES
        .iter()
        .filter_map(|name| remotes.iter().find(|r| r.name == *name))
        .collect();

    let mut resolved = ResolvedBranches::default();
    for branch in branches {
        let outcome =
            resolve_branch(service, branch, &trusted, host, &mut resolved.remotes_checked).await?;
        debug!(branch = %branch.name, ?outcome, "Resolved branch");
        resolved.outcomes.insert(branch.name.clone(), outcome);
    }

    Ok(resolved)
}

async fn resolve_branch(
    service: &dyn HistoryService,
    branch: &LocalBranch,
    trusted: &[&RemoteInfo],
    host: &str,
    remotes_checked: &mut Vec<String>,
) -> Result<BranchMergeOutcome> {
    for remote in trusted {
        if !remotes_checked.contains(&remote.url) {
            remotes_checked.push(remote.url.clone());
        }

        let slug = match RepoSlug::parse(&remote.url, host) {
            Ok(slug) => slug,
            Err(e) => {
                warn!(remote = %remote.name, url = %remote.url, error = %e, "Skipping remote");
                continue;
            }
        };

        match service
            .closed_pulls_for_commit(&slug.owner, &slug.name, &branch.head)
            .await
        {
            Ok(CommitPresence::Present(pulls)) => {
                return Ok(match pulls.into_iter().next() {
                    Some(pull) => BranchMergeOutcome::MergedViaPullRequest {
                        remote: remote.name.clone(),
                        pull,
                    },
                    None => BranchMergeOutcome::MergedDirect {
                        remote: remote.name.clone(),
                    },
                });
            }
            Ok(CommitPresence::Absent) => {
                debug!(branch = %branch.name, remote = %remote.name, "Commit not found on remote");
            }
            Err(e) if e.is_not_found() => {
                debug!(branch = %branch.name, remote = %remote.name, "Remote repository not found");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(BranchMergeOutcome::Unmerged)
}
