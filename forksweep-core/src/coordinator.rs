//! Local scan coordination
//!
//! A scan root that is itself a checkout is scanned directly. A container
//! directory has its checkouts fanned out over a [`WorkerPool`]; the first
//! failing checkout stops the rest and fails the whole scan.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::local::{discover, scan_checkout, LocalCheckout, ScanTarget};
use crate::pool::WorkerPool;
use crate::service::HistoryService;
use crate::{Error, Result};

/// Scans checkouts under a root with bounded concurrency
pub struct Coordinator {
    service: Arc<dyn HistoryService>,
    pool: WorkerPool,
    task_timeout: Option<Duration>,
    host: String,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("workers", &self.pool.workers())
            .field("task_timeout", &self.task_timeout)
            .field("host", &self.host)
            .finish()
    }
}

impl Coordinator {
    pub fn new(service: Arc<dyn HistoryService>, workers: usize, host: impl Into<String>) -> Self {
        Self {
            service,
            pool: WorkerPool::new(workers),
            task_timeout: None,
            host: host.into(),
        }
    }

    /// Build from the `[scan]` and `[github]` config sections
    pub fn from_config(service: Arc<dyn HistoryService>, config: &Config) -> Self {
        Self::new(service, config.scan.workers, config.github.host.clone())
            .with_task_timeout(config.scan.effective_timeout())
    }

    /// Bound each checkout scan; `None` disables the bound
    pub fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Scan every checkout at or directly under `root`
    pub async fn scan(&self, root: &Path) -> Result<Vec<LocalCheckout>> {
        match discover(root)? {
            ScanTarget::Single(path) => {
                info!(path = %path.display(), "Scanning single checkout");
                let checkout =
                    scan_bounded(self.service.as_ref(), &path, &self.host, self.task_timeout)
                        .await?;
                Ok(vec![checkout])
            }
            ScanTarget::Container(paths) => {
                if paths.is_empty() {
                    warn!(root = %root.display(), "No checkouts found");
                    return Ok(Vec::new());
                }
                info!(
                    root = %root.display(),
                    checkouts = paths.len(),
                    workers = self.pool.workers(),
                    "Scanning checkouts"
                );

                let service = Arc::clone(&self.service);
                let host = self.host.clone();
                let timeout = self.task_timeout;
                self.pool
                    .run(paths, move |path: PathBuf| {
                        let service = Arc::clone(&service);
                        let host = host.clone();
                        async move { scan_bounded(service.as_ref(), &path, &host, timeout).await }
                    })
                    .await
            }
        }
    }
}

async fn scan_bounded(
    service: &dyn HistoryService,
    path: &Path,
    host: &str,
    timeout: Option<Duration>,
) -> Result<LocalCheckout> {
    let scan = scan_checkout(service, path, host);
    match timeout {
        None => scan.await,
        Some(after) => tokio::time::timeout(after, scan)
            .await
            .map_err(|_| Error::Timeout {
                path: path.to_path_buf(),
                after,
            })?,
    }
}
