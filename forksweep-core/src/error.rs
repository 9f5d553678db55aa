//! Error types for forksweep

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::remote::RemoteRepository;
use crate::service::ServiceError;

/// Result type alias for forksweep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for forksweep operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Local git error
    #[error("Git error: {0}")]
    Git(String),

    /// History service error outside of any per-item context
    #[error("History service error: {0}")]
    Service(#[from] ServiceError),

    /// Fork discovery failed; aborts the whole enumeration
    #[error("Failed to enumerate {repo} ({} fork(s) found before it): {source}", found.len())]
    Enumeration {
        /// Full name of the repository being inspected
        repo: String,
        source: ServiceError,
        /// Forks fully inspected before the failure, in listing order
        found: Vec<RemoteRepository>,
    },

    /// Remote URL that cannot be mapped to an owner/name pair
    #[error("Unsupported remote URL: {0}")]
    UnsupportedRemote(String),

    /// Resolving a checkout failed; aborts that checkout and the run
    #[error("Failed to scan {}: {source}", path.display())]
    Checkout {
        path: PathBuf,
        source: Box<Error>,
    },

    /// A checkout scan exceeded the configured task timeout
    #[error("Scanning {} timed out after {}s", path.display(), after.as_secs())]
    Timeout { path: PathBuf, after: Duration },

    /// Deleting or archiving a selected entry failed
    #[error("Failed to process {target} ({completed} already processed): {source}")]
    Execution {
        target: String,
        /// Entries processed before the failure
        completed: usize,
        source: Box<Error>,
    },

    /// The history service's request budget is exhausted
    #[error("Rate limit exceeded, resets at {reset}")]
    RateLimited { reset: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<git2::Error> for Error {
    fn from(err: git2::Error) -> Self {
        Error::Git(err.message().to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Other(format!("Task failed: {}", err))
    }
}

impl Error {
    /// Attach a checkout path to an error raised while scanning it
    pub(crate) fn in_checkout(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Error::Checkout { .. } | Error::Timeout { .. } => self,
            other => Error::Checkout {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}
