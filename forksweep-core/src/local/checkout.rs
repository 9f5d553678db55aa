//! Local checkout snapshot

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::service::PullRef;

/// Where a local branch's head commit was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchMergeOutcome {
    /// Found on a trusted remote through a closed pull request
    MergedViaPullRequest { remote: String, pull: PullRef },
    /// Known to a trusted remote without an associated pull request
    MergedDirect { remote: String },
    /// Not found on any trusted remote
    Unmerged,
}

impl BranchMergeOutcome {
    pub fn is_unmerged(&self) -> bool {
        matches!(self, BranchMergeOutcome::Unmerged)
    }

    /// Remote the branch was found on, if any
    pub fn remote(&self) -> Option<&str> {
        match self {
            BranchMergeOutcome::MergedViaPullRequest { remote, .. }
            | BranchMergeOutcome::MergedDirect { remote } => Some(remote),
            BranchMergeOutcome::Unmerged => None,
        }
    }
}

/// State of one working copy after a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCheckout {
    pub path: PathBuf,
    /// Sum of file sizes under `path`
    pub size: u64,
    pub status_clean: bool,
    pub stash_clean: bool,
    pub branches: BTreeMap<String, BranchMergeOutcome>,
    /// Distinct trusted-remote URLs consulted, in first-seen order
    pub remotes_checked: Vec<String>,
}

impl LocalCheckout {
    /// Names of branches not found on any trusted remote
    pub fn unmerged_branches(&self) -> impl Iterator<Item = &str> {
        self.branches
            .iter()
            .filter(|(_, outcome)| outcome.is_unmerged())
            .map(|(name, _)| name.as_str())
    }

    /// Safe to delete: every branch merged, clean tree and empty stash
    pub fn is_clean(&self) -> bool {
        self.unmerged_branches().next().is_none() && self.status_clean && self.stash_clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::pull;

    fn checkout(
        outcomes: &[(&str, BranchMergeOutcome)],
        status: bool,
        stash: bool,
    ) -> LocalCheckout {
        LocalCheckout {
            path: PathBuf::from("/src/foo"),
            size: 0,
            status_clean: status,
            stash_clean: stash,
            branches: outcomes
                .iter()
                .map(|(n, o)| (n.to_string(), o.clone()))
                .collect(),
            remotes_checked: Vec::new(),
        }
    }

    #[test]
    fn test_clean_requires_all_three_inputs() {
        let merged = [
            (
                "feature-x",
                BranchMergeOutcome::MergedViaPullRequest {
                    remote: "origin".to_string(),
                    pull: pull(12),
                },
            ),
            (
                "main",
                BranchMergeOutcome::MergedDirect {
                    remote: "upstream".to_string(),
                },
            ),
        ];

        assert!(checkout(&merged, true, true).is_clean());
        assert!(!checkout(&merged, false, true).is_clean());
        assert!(!checkout(&merged, true, false).is_clean());

        let mut with_unmerged = merged.to_vec();
        with_unmerged.push(("wip", BranchMergeOutcome::Unmerged));
        let dirty = checkout(&with_unmerged, true, true);
        assert!(!dirty.is_clean());
        assert_eq!(dirty.unmerged_branches().collect::<Vec<_>>(), vec!["wip"]);

        // Re-evaluating the same snapshot gives the same answer.
        assert_eq!(dirty.is_clean(), dirty.clone().is_clean());
    }

    #[test]
    fn test_empty_checkout_is_clean_when_tree_and_stash_are() {
        assert!(checkout(&[], true, true).is_clean());
    }

    #[test]
    fn test_outcome_remote() {
        assert_eq!(BranchMergeOutcome::Unmerged.remote(), None);
        assert_eq!(
            BranchMergeOutcome::MergedDirect {
                remote: "origin".to_string()
            }
            .remote(),
            Some("origin")
        );
    }
}
