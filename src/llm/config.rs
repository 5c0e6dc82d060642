//! Assistant proxy configuration parsed from environment variables.

use std::time::Duration;

use super::types::AssistantError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const ENDPOINT_PATH: &str = "/api/gemini";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Scheme + host (+ optional prefix) of the proxy, without trailing slash.
    /// Empty means same-origin relative paths, which only a browser can resolve.
    pub base_url: String,
    /// `None` waits for the proxy indefinitely.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl AssistantConfig {
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `ASSISTANT_BASE_URL`: default `http://localhost:3001`
    /// - `ASSISTANT_REQUEST_TIMEOUT_SECS`: unset or `0` disables the timeout
    /// - `ASSISTANT_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::ConfigParse`] when a timeout is not an integer.
    pub fn from_env() -> Result<Self, AssistantError> {
        let base_url = std::env::var("ASSISTANT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let request_secs = env_secs("ASSISTANT_REQUEST_TIMEOUT_SECS")?;
        let connect_secs = env_secs("ASSISTANT_CONNECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);

        Ok(Self {
            request_timeout: request_secs.filter(|s| *s > 0).map(Duration::from_secs),
            connect_timeout: Duration::from_secs(connect_secs),
            ..Self::with_base_url(&base_url)
        })
    }

    /// Full URL of the completion endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}{ENDPOINT_PATH}", self.base_url)
    }
}

fn env_secs(key: &str) -> Result<Option<u64>, AssistantError> {
    std::env::var(key).ok().map(|v| {
        v.trim()
            .parse::<u64>()
            .map_err(|_| AssistantError::ConfigParse(format!("{key} must be a whole number of seconds, got '{v}'")))
    })
    .transpose()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
