//! GitHub API client using octocrab

use std::sync::OnceLock;

use octocrab::Octocrab;
use tracing::info;

use crate::{Error, Result};

/// Page size for list endpoints
pub(crate) const PER_PAGE: u8 = 100;

/// GitHub API client implementing the history service
pub struct GitHubClient {
    client: Octocrab,
    api_url: Option<String>,
    /// Token owner, resolved on first use
    login: OnceLock<String>,
}

impl GitHubClient {
    /// Create a client authenticated with `token`
    ///
    /// `api_url` overrides the API base, for GitHub Enterprise.
    pub fn new(token: impl Into<String>, api_url: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.into());
        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(|e| Error::Parse(format!("Invalid API URL {}: {}", url, e)))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(
            api_url = api_url.unwrap_or("https://api.github.com"),
            "Created GitHub client"
        );

        Ok(Self {
            client,
            api_url: api_url.map(str::to_string),
            login: OnceLock::new(),
        })
    }

    /// Create a client with the token from `GITHUB_TOKEN` or `secrets.toml`
    pub fn from_environment(api_url: Option<&str>) -> Result<Self> {
        let token = forksweep_core::github_token().map_err(|e| Error::Auth(e.to_string()))?;
        Self::new(token, api_url)
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    pub(crate) fn cached_login(&self) -> Option<&str> {
        self.login.get().map(String::as_str)
    }

    /// Keep the first login resolved for this token
    pub(crate) fn remember_login(&self, login: String) -> String {
        self.login.get_or_init(|| login).clone()
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("login", &self.login.get())
            .finish_non_exhaustive()
    }
}
