//! Status list engine configuration.
//!
//! Defaults let the engine run without any environment; override via
//! environment variables or explicit construction.

use credstatus_core::{StatusListId, MIN_TOTAL_ENTRIES};
use url::Url;

/// Base URL used when `STATUS_LIST_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Configuration of the status list engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusConfig {
    /// Public origin status list credentials are served from, without a
    /// trailing slash.
    base_url: String,
    /// Capacity of lazily created lists.
    pub default_total_entries: u64,
    /// TTL in milliseconds applied to lazily created lists.
    pub default_ttl_ms: Option<i64>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_total_entries: MIN_TOTAL_ENTRIES,
            default_ttl_ms: None,
        }
    }
}

impl StatusConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `STATUS_LIST_BASE_URL` (default: `http://localhost:3000`)
    /// - `STATUS_LIST_TOTAL_ENTRIES` (default: 131072)
    /// - `STATUS_LIST_TTL_MS` (default: unset, lists never expire)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_url("STATUS_LIST_BASE_URL", DEFAULT_BASE_URL)?;
        Ok(Self {
            base_url: trim_base(&base_url),
            default_total_entries: env_number("STATUS_LIST_TOTAL_ENTRIES")?
                .unwrap_or(MIN_TOTAL_ENTRIES),
            default_ttl_ms: env_number("STATUS_LIST_TTL_MS")?,
        })
    }

    /// Replace the base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl("base_url".to_string(), e.to_string()))?;
        self.base_url = trim_base(&url);
        Ok(self)
    }

    /// Capacity for lazily created lists.
    pub fn with_default_total_entries(mut self, total_entries: u64) -> Self {
        self.default_total_entries = total_entries;
        self
    }

    /// TTL for lazily created lists.
    pub fn with_default_ttl_ms(mut self, ttl_ms: Option<i64>) -> Self {
        self.default_ttl_ms = ttl_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL the status list credential of `id` is published at.
    pub fn status_list_url(&self, id: StatusListId) -> String {
        format!("{}/status-lists/{id}", self.base_url)
    }
}

fn trim_base(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn env_number<T: std::str::FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber(var.to_string(), raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Variable name and parse error.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    /// Variable name and rejected value.
    #[error("invalid number for {0}: {1:?}")]
    InvalidNumber(String, String),
}
