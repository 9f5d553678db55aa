//! CLI command implementations

pub mod local;
pub mod remote;

pub use local::LocalArgs;
pub use remote::RemoteArgs;

use std::time::Duration;

/// Parse a human duration such as `30d` or `10m`
pub(crate) fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}
