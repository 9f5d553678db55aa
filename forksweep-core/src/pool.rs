//! Bounded worker pool
//!
//! A fixed queue of work items is drained by a fixed number of long-lived
//! workers. Results and errors are funneled through one channel, and a single
//! cancellation token stops workers from taking new items once any item has
//! failed. Items already running are allowed to finish; their results are
//! dropped.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{Error, Result};

/// Default number of simultaneously active workers
pub const DEFAULT_WORKERS: usize = 10;

/// Runs work items with at most `workers` of them active at once
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl WorkerPool {
    /// Create a pool; a bound of zero is raised to one
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `work` over every item
    ///
    /// Returns every result, in completion order, or the first error. No
    /// partial results are returned on failure.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, work: F) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let worker_count = self.workers.min(items.len());
        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let work = Arc::new(work);
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel::<Result<R>>(worker_count);

        let mut workers = JoinSet::new();
        for worker in 0..worker_count {
            let queue = Arc::clone(&queue);
            let work = Arc::clone(&work);
            let cancel = cancel.clone();
            let tx = tx.clone();

            workers.spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        debug!(worker, "Cancellation observed, stopping");
                        break;
                    }
                    let Some(item) = next_item(&queue) else {
                        break;
                    };

                    let outcome = (*work)(item).await;
                    if outcome.is_err() {
                        cancel.cancel();
                    }
                    if tx.send(outcome).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut results = Vec::new();
        let mut first_error: Option<Error> = None;
        while let Some(outcome) = rx.recv().await {
            match outcome {
                Ok(result) if first_error.is_none() => results.push(result),
                Ok(_) => debug!("Discarding result finished after cancellation"),
                Err(e) if first_error.is_none() => {
                    cancel.cancel();
                    first_error = Some(e);
                }
                Err(e) => debug!(error = %e, "Discarding error after cancellation"),
            }
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                cancel.cancel();
                first_error.get_or_insert(Error::from(e));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}

fn next_item<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue.lock().ok().and_then(|mut q| q.pop_front())
}
