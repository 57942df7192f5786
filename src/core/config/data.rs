use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::url::validate_base_url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable that overrides the configured server URL.
pub const BASE_URL_ENV: &str = "LUMON_BASE_URL";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root URL of the Lumon server (e.g., "http://127.0.0.1:5000")
    pub base_url: Option<String>,
    /// Seconds to wait for a reply before giving up on a request
    pub timeout_secs: Option<u64>,
    /// Replaces the built-in greeting shown at the top of each conversation
    pub welcome_message: Option<String>,
}

impl Config {
    /// Server URL with precedence: explicit override, then `LUMON_BASE_URL`,
    /// then the config file, then [`DEFAULT_BASE_URL`]. The winner must be an
    /// http(s) URL with a host.
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> Result<String, String> {
        let env_value = std::env::var(BASE_URL_ENV).ok();
        resolve_base_url_from(cli_override, env_value.as_deref(), self.base_url.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1))
    }
}

pub(crate) fn resolve_base_url_from(
    cli_override: Option<&str>,
    env_value: Option<&str>,
    configured: Option<&str>,
) -> Result<String, String> {
    let chosen = [cli_override, env_value, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(DEFAULT_BASE_URL);
    validate_base_url(chosen)
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
