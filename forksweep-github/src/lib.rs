//! forksweep GitHub - GitHub implementation of the history service
//!
//! [`GitHubClient`] answers the engine's repository, issue, comparison and
//! commit lookups through octocrab and performs the delete/archive actions.

mod client;
mod error;
mod models;
mod service;

pub use client::GitHubClient;
pub use error::{Error, Result};
