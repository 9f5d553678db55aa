//! Checkout discovery and per-checkout scanning

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::checkout::LocalCheckout;
use super::resolve::resolve_branches;
use crate::git::{GitRepo, LocalBranch, RemoteInfo};
use crate::service::HistoryService;
use crate::{Error, Result};

/// What a scan root turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    /// The root is itself a checkout
    Single(PathBuf),
    /// The root contains checkouts as immediate subdirectories
    Container(Vec<PathBuf>),
}

/// Classify `root` and list the checkouts to scan
pub fn discover(root: &Path) -> Result<ScanTarget> {
    if !root.is_dir() {
        return Err(Error::Config(format!(
            "Scan root is not a directory: {}",
            root.display()
        )));
    }

    if GitRepo::is_checkout(root) {
        return Ok(ScanTarget::Single(root.to_path_buf()));
    }

    let mut checkouts = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() && GitRepo::is_checkout(&path) {
            checkouts.push(path);
        } else {
            debug!(path = %path.display(), "Not a checkout, skipping");
        }
    }

    Ok(ScanTarget::Container(checkouts))
}

/// Sum of file sizes under `path`; directories themselves are not counted
pub fn disk_usage(path: &Path) -> Result<u64> {
    let mut size = 0;
    for entry in WalkDir::new(path) {
        let entry = entry
            .map_err(|e| Error::Other(format!("Failed to walk {}: {}", path.display(), e)))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let metadata = entry.metadata().map_err(|e| {
            Error::Other(format!("Failed to stat {}: {}", entry.path().display(), e))
        })?;
        size += metadata.len();
    }
    Ok(size)
}

/// Whether `git <args>` succeeds in `dir` with empty output
///
/// A failing or unlaunchable git counts as not clean.
async fn git_output_is_empty(dir: &Path, args: &[&str]) -> bool {
    let output = match Command::new("git").args(args).current_dir(dir).output().await {
        Ok(output) => output,
        Err(e) => {
            warn!(path = %dir.display(), ?args, error = %e, "Failed to run git");
            return false;
        }
    };

    if !output.status.success() {
        warn!(
            path = %dir.display(),
            ?args,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "git query failed, treating as dirty"
        );
        return false;
    }

    output.stdout.iter().all(u8::is_ascii_whitespace)
}

/// No uncommitted or untracked changes
pub async fn status_is_clean(dir: &Path) -> bool {
    git_output_is_empty(dir, &["status", "--porcelain"]).await
}

/// No stash entries
pub async fn stash_is_clean(dir: &Path) -> bool {
    git_output_is_empty(dir, &["stash", "list"]).await
}

/// Filesystem and git state read before any network call
struct Snapshot {
    size: u64,
    branches: Vec<LocalBranch>,
    remotes: Vec<RemoteInfo>,
}

fn take_snapshot(path: &Path) -> Result<Snapshot> {
    let size = disk_usage(path)?;
    let repo = GitRepo::open(path)?;
    Ok(Snapshot {
        size,
        branches: repo.list_local_branches()?,
        remotes: repo.trusted_remotes()?,
    })
}

/// Scan one checkout: disk usage, tree/stash cleanliness and branch outcomes
pub async fn scan_checkout(
    service: &dyn HistoryService,
    path: &Path,
    host: &str,
) -> Result<LocalCheckout> {
    let owned = path.to_path_buf();
    let snapshot = tokio::task::spawn_blocking(move || take_snapshot(&owned))
        .await
        .map_err(Error::from)
        .and_then(|r| r)
        .map_err(|e| e.in_checkout(path))?;

    let status_clean = status_is_clean(path).await;
    let stash_clean = stash_is_clean(path).await;

    let resolved = resolve_branches(service, &snapshot.branches, &snapshot.remotes, host)
        .await
        .map_err(|e| e.in_checkout(path))?;

    let checkout = LocalCheckout {
        path: path.to_path_buf(),
        size: snapshot.size,
        status_clean,
        stash_clean,
        branches: resolved.outcomes,
        remotes_checked: resolved.remotes_checked,
    };

    info!(
        path = %path.display(),
        size = checkout.size,
        clean = checkout.is_clean(),
        "Scanned checkout"
    );
    Ok(checkout)
}
