//! Error types for GitHub operations

use forksweep_core::ServiceError;
use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<Error> for ServiceError {
    fn from(err: Error) -> Self {
        match err {
            Error::Api(e) => api_error(e),
            other => ServiceError::Transport(other.to_string()),
        }
    }
}

/// Convert an octocrab failure into the engine's service error
///
/// Only answers that carry a GitHub error body keep their HTTP status.
pub(crate) fn api_error(err: octocrab::Error) -> ServiceError {
    match err {
        octocrab::Error::GitHub { source, .. } => ServiceError::Status {
            status: source.status_code.as_u16(),
            message: source.message,
        },
        other => ServiceError::Transport(other.to_string()),
    }
}
