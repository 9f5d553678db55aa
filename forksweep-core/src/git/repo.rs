//! Git repository access for checkout scans

use std::path::{Path, PathBuf};

use git2::Repository;

use crate::{Error, Result};

/// Remotes consulted for merge safety, in lookup order
pub const TRUSTED_REMOTES: [&str; 2] = ["origin", "upstream"];

/// Information about a git remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    /// Name of the remote (e.g., "origin")
    pub name: String,
    /// First configured URL of the remote
    pub url: String,
}

/// A git working copy opened for inspection
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the repository root
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the git repository rooted exactly at `path`
    ///
    /// Unlike discovery, this does not search parent directories: a checkout
    /// is identified by its own `.git` entry.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!("Not a git repository: {}", path.display()))
            } else {
                Error::Git(format!("Failed to open {}: {}", path.display(), e.message()))
            }
        })?;

        Ok(Self {
            repo,
            root: path.to_path_buf(),
        })
    }

    /// Get the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check whether `path` directly contains a `.git` entry
    pub fn is_checkout(path: impl AsRef<Path>) -> bool {
        path.as_ref().join(".git").exists()
    }

    /// Look up a remote by name; `None` if it is not configured or has no URL
    pub fn find_remote(&self, name: &str) -> Result<Option<RemoteInfo>> {
        let remote = match self.repo.find_remote(name) {
            Ok(remote) => remote,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Git(format!(
                    "Failed to read remote '{}': {}",
                    name,
                    e.message()
                )))
            }
        };

        Ok(remote.url().map(|url| RemoteInfo {
            name: name.to_string(),
            url: url.to_string(),
        }))
    }

    /// Configured trusted remotes, in [`TRUSTED_REMOTES`] order
    pub fn trusted_remotes(&self) -> Result<Vec<RemoteInfo>> {
        let mut remotes = Vec::new();
        for name in TRUSTED_REMOTES {
            if let Some(remote) = self.find_remote(name)? {
                remotes.push(remote);
            }
        }
        Ok(remotes)
    }

    /// Get access to the underlying git2 repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }
}
