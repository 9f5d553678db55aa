//! Remote URL to owner/name mapping

use crate::{Error, Result};

/// Host used when none is configured
pub const DEFAULT_HOST: &str = "github.com";

/// Owner and name of a repository on the history service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Parse a remote URL pointing at `host`
    ///
    /// Supports:
    /// - `git@HOST:owner/name.git`
    /// - `https://HOST/owner/name.git`
    /// - `http://HOST/owner/name`
    /// - `git://HOST/owner/name.git`
    pub fn parse(url: &str, host: &str) -> Result<Self> {
        let trimmed = url.strip_suffix(".git").unwrap_or(url);

        let prefixes = [
            format!("git@{}:", host),
            format!("https://{}/", host),
            format!("http://{}/", host),
            format!("git://{}/", host),
        ];
        let path = prefixes
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix.as_str()))
            .unwrap_or(trimmed);

        match path.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(Error::UnsupportedRemote(url.to_string())),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}
