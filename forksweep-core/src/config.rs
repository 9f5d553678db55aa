//! Configuration management for forksweep
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (FORKSWEEP_*)
//! 3. Config file (~/.config/forksweep/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::git::DEFAULT_HOST;
use crate::pool::DEFAULT_WORKERS;
use crate::remote::Filter;
use crate::{Error, Result};

/// Default bound on a single checkout scan (10 minutes)
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Local scan configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum number of checkouts scanned at once
    pub workers: usize,

    /// Bound on each checkout scan; zero disables it
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub task_timeout: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            task_timeout: Some(DEFAULT_TASK_TIMEOUT),
        }
    }
}

impl ScanConfig {
    /// The timeout to apply, if any
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.task_timeout.filter(|t| !t.is_zero())
    }
}

/// GitHub-related configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Host matched when parsing remote URLs
    pub host: String,

    /// API base URL, for GitHub Enterprise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Skip the parent issue and comparison lookups during enumeration
    pub skip_upstream: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_url: None,
            skip_upstream: false,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub filter: Filter,
    pub scan: ScanConfig,
    pub github: GitHubConfig,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub workers: Option<usize>,
    pub task_timeout: Option<Duration>,
    pub api_url: Option<String>,
    pub skip_upstream: bool,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {}", path.display(), e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/forksweep/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("forksweep").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - FORKSWEEP_WORKERS: Scan concurrency bound
    /// - FORKSWEEP_GITHUB_HOST: Host matched in remote URLs
    /// - FORKSWEEP_API_URL: API base URL
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(workers) = lookup("FORKSWEEP_WORKERS") {
            self.scan.workers = workers.trim().parse().map_err(|_| {
                Error::Config(format!("FORKSWEEP_WORKERS is not a number: {}", workers))
            })?;
        }

        if let Some(host) = lookup("FORKSWEEP_GITHUB_HOST") {
            self.github.host = host;
        }

        if let Some(api_url) = lookup("FORKSWEEP_API_URL") {
            self.github.api_url = Some(api_url);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(workers) = overrides.workers {
            self.scan.workers = workers;
        }

        if let Some(timeout) = overrides.task_timeout {
            self.scan.task_timeout = Some(timeout);
        }

        if let Some(api_url) = overrides.api_url {
            self.github.api_url = Some(api_url);
        }

        if overrides.skip_upstream {
            self.github.skip_upstream = true;
        }

        self
    }

    /// Reject values that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.scan.workers == 0 {
            return Err(Error::Config("scan.workers must be at least 1".to_string()));
        }

        if self.github.host.trim().is_empty() {
            return Err(Error::Config("github.host must not be empty".to_string()));
        }

        if let Some(api_url) = &self.github.api_url {
            Url::parse(api_url)
                .map_err(|e| Error::Config(format!("Invalid api_url {}: {}", api_url, e)))?;
        }

        Ok(())
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: CliOverrides) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(overrides);
        config.validate()?;
        Ok(config)
    }
}
