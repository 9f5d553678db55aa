//! GitHub token lookup
//!
//! `GITHUB_TOKEN` wins. Otherwise the token comes from `secrets.toml` beside
//! the config file, under `[github] token`. That file must be private to its
//! owner on Unix.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{Config, Error, Result};

/// Environment variable consulted before the token file
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Deserialize)]
struct TokenFile {
    github: Option<TokenSection>,
}

#[derive(Deserialize)]
struct TokenSection {
    token: Option<String>,
}

/// `secrets.toml` in the forksweep config directory
pub fn token_file_path() -> Option<PathBuf> {
    Config::default_config_path().map(|p| p.with_file_name("secrets.toml"))
}

/// The GitHub token from the environment or the token file
pub fn github_token() -> Result<String> {
    resolve_token(std::env::var(TOKEN_ENV).ok(), token_file_path().as_deref())
}

fn resolve_token(env: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(token) = env.as_deref().and_then(non_blank) {
        debug!(source = TOKEN_ENV, "Using GitHub token");
        return Ok(token.to_string());
    }

    if let Some(path) = file.filter(|p| p.exists()) {
        if let Some(token) = read_token_file(path)? {
            debug!(source = %path.display(), "Using GitHub token");
            return Ok(token);
        }
    }

    let location = file
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "secrets.toml".to_string());
    Err(Error::Config(format!(
        "{} is not set and {} has no [github] token",
        TOKEN_ENV, location
    )))
}

/// Read the token stored in `path`, if any
///
/// Refuses a file that group or others can access.
pub fn read_token_file(path: &Path) -> Result<Option<String>> {
    ensure_private(path)?;

    let text = std::fs::read_to_string(path)?;
    let parsed: TokenFile = toml::from_str(&text)
        .map_err(|e| Error::Config(format!("Invalid token file {}: {}", path.display(), e)))?;

    Ok(parsed
        .github
        .and_then(|section| section.token)
        .as_deref()
        .and_then(non_blank)
        .map(str::to_string))
}

#[cfg(unix)]
fn ensure_private(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
    if mode & 0o077 == 0 {
        return Ok(());
    }
    Err(Error::Config(format!(
        "Token file {} is accessible to other users (mode {:o}); chmod 600 it",
        path.display(),
        mode
    )))
}

#[cfg(not(unix))]
fn ensure_private(_path: &Path) -> Result<()> {
    Ok(())
}

fn non_blank(token: &str) -> Option<&str> {
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token_file(dir: &TempDir, contents: &str, mode: u32) -> PathBuf {
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, contents).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        }
        #[cfg(not(unix))]
        let _ = mode;
        path
    }

    #[test]
    fn test_environment_wins_without_reading_file() {
        let dir = TempDir::new().unwrap();
        // Unreadable as TOML; never opened because the variable is set.
        let path = token_file(&dir, "not toml", 0o644);

        let token = resolve_token(Some(" ghp_env \n".to_string()), Some(&path)).unwrap();
        assert_eq!(token, "ghp_env");
    }

    #[test]
    fn test_blank_environment_falls_back_to_file() {
        let dir = TempDir::new().unwrap();
        let path = token_file(&dir, "[github]\ntoken = \"  ghp_file \"\n", 0o600);

        let token = resolve_token(Some("   ".to_string()), Some(&path)).unwrap();
        assert_eq!(token, "ghp_file");
    }

    #[test]
    fn test_no_token_anywhere_names_both_sources() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("secrets.toml");

        let err = resolve_token(None, Some(&missing)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(TOKEN_ENV));
        assert!(message.contains("secrets.toml"));

        let empty = token_file(&dir, "[other]\nkey = 1\n", 0o600);
        assert!(read_token_file(&empty).unwrap().is_none());
        assert!(resolve_token(None, Some(&empty)).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_shared_token_file_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = token_file(&dir, "[github]\ntoken = \"ghp_file\"\n", 0o640);

        let err = read_token_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("mode 640"));
    }

    #[test]
    fn test_token_file_sits_beside_config() {
        let (Some(secrets), Some(config)) = (token_file_path(), Config::default_config_path())
        else {
            return;
        };
        assert_eq!(secrets.parent(), config.parent());
        assert!(secrets.ends_with("forksweep/secrets.toml"));
    }
}
