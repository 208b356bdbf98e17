//! Client configuration read from the environment (and `.env`).

use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got `{value}`")]
    InvalidSeconds { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix every route path is appended to, e.g. `http://host/api`.
    pub base_url: String,
    /// Per-request timeout; `None` waits for as long as the server takes.
    pub timeout: Option<Duration>,
    /// Age after which cached reads refetch without an invalidation.
    pub stale_after: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            stale_after: None,
        }
    }
}

impl ClientConfig {
    /// Load `.env` if present, then read `POSTS_API_URL`,
    /// `POSTS_API_TIMEOUT_SECS` and `POSTS_CACHE_STALE_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("POSTS_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            base_url,
            // A zero timeout would fail every request; read it as "no timeout".
            timeout: seconds(&lookup, "POSTS_API_TIMEOUT_SECS")?.filter(|t| !t.is_zero()),
            stale_after: seconds(&lookup, "POSTS_CACHE_STALE_SECS")?,
        })
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| ConfigError::InvalidSeconds { var, value }),
    }
}
