//! Local branch enumeration

use git2::BranchType;

use super::repo::GitRepo;
use crate::{Error, Result};

/// A local branch and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBranch {
    /// Short branch name (e.g., "main")
    pub name: String,
    /// Head commit SHA
    pub head: String,
}

impl GitRepo {
    /// List all local branches with their head commits
    pub fn list_local_branches(&self) -> Result<Vec<LocalBranch>> {
        let mut branches = Vec::new();

        for branch in self
            .inner()
            .branches(Some(BranchType::Local))
            .map_err(|e| Error::Git(format!("Failed to list branches: {}", e.message())))?
        {
            let (branch, _) =
                branch.map_err(|e| Error::Git(format!("Failed to read branch: {}", e.message())))?;

            let Some(name) = branch.name().ok().flatten().map(str::to_string) else {
                tracing::warn!(
                    root = %self.root().display(),
                    "Skipping branch with non UTF-8 name"
                );
                continue;
            };

            let commit = branch.get().peel_to_commit().map_err(|e| {
                Error::Git(format!("Failed to resolve branch '{}': {}", name, e.message()))
            })?;

            branches.push(LocalBranch {
                name,
                head: commit.id().to_string(),
            });
        }

        Ok(branches)
    }
}
