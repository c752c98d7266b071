//! API client configuration.
//!
//! Explicit configuration constructed at application start, with an
//! environment-first loader that falls back to defaults.
//!
//! ## Environment Variables
//! - `TRANSLATECLOUD_API_BASE_URL`: backend base URL
//! - `TRANSLATECLOUD_API_TIMEOUT_SECS`: per-request wall-clock timeout
//! - `TRANSLATECLOUD_API_MAX_ATTEMPTS`: total tries (initial + retries)
//! - `TRANSLATECLOUD_API_RETRY_DELAY_MS`: linear backoff base delay

use std::time::Duration;

use tracing::warn;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.translatecloud.io/prod";

/// Configuration for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the API, without a trailing slash.
    pub base_url: String,
    /// Wall-clock timeout for a single attempt.
    pub timeout: Duration,
    /// Total number of tries (initial request + retries).
    pub max_attempts: usize,
    /// Base delay for linear backoff; attempt `n` waits `n * base`.
    pub retry_base_delay: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

impl ApiClientConfig {
    /// Create a configuration for the given base URL with default
    /// timeout and retry settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: normalize_base_url(base_url.into()), ..Self::default() }
    }

    /// Load configuration from `TRANSLATECLOUD_*` environment variables,
    /// falling back to defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("TRANSLATECLOUD_API_BASE_URL")
            .map(normalize_base_url)
            .unwrap_or(defaults.base_url);

        let timeout = parse_var(
            "TRANSLATECLOUD_API_TIMEOUT_SECS",
            std::env::var("TRANSLATECLOUD_API_TIMEOUT_SECS").ok(),
        )
        .map_or(defaults.timeout, Duration::from_secs);

        let max_attempts = parse_var(
            "TRANSLATECLOUD_API_MAX_ATTEMPTS",
            std::env::var("TRANSLATECLOUD_API_MAX_ATTEMPTS").ok(),
        )
        .unwrap_or(defaults.max_attempts);

        let retry_base_delay = parse_var(
            "TRANSLATECLOUD_API_RETRY_DELAY_MS",
            std::env::var("TRANSLATECLOUD_API_RETRY_DELAY_MS").ok(),
        )
        .map_or(defaults.retry_base_delay, Duration::from_millis);

        Self { base_url, timeout, max_attempts, retry_base_delay }
    }
}

fn normalize_base_url(raw: String) -> String {
    raw.trim_end_matches('/').to_string()
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = %name, value = %raw, "unparseable value, using default");
            None
        }
    }
}
