//! Client configuration
//!
//! Resolution order for the API origin:
//! 1. `NEXT_PUBLIC_API_URL`
//! 2. `NEXT_PUBLIC_API_BASE`
//! 3. [`DEFAULT_API_BASE`]
//!
//! Configuration can also be loaded from a TOML file with the same field
//! names as [`ClientConfig`].

use crate::dataset::DatasetKind;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Production API origin used when no override is present
pub const DEFAULT_API_BASE: &str = "https://api.ghostquant.io";

/// Primary API origin variable
pub const API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";
/// Fallback API origin variable
pub const API_BASE_ENV: &str = "NEXT_PUBLIC_API_BASE";
/// Poll interval override, seconds
pub const POLL_INTERVAL_ENV: &str = "GQ_POLL_INTERVAL_SECS";
/// Request timeout, seconds
pub const REQUEST_TIMEOUT_ENV: &str = "GQ_REQUEST_TIMEOUT_SECS";
/// Whether to synthesize data on failure (`true`/`false`)
pub const SYNTHETIC_FALLBACK_ENV: &str = "GQ_SYNTHETIC_FALLBACK";
/// Directory for saved investigations
pub const STORAGE_DIR_ENV: &str = "GQ_STORAGE_DIR";

/// Shortest accepted poll interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Longest accepted poll interval
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Dashboard data client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API origin, without trailing slash
    pub api_base: String,
    /// Poll interval override; `None` uses each dataset's default
    pub poll_interval_secs: Option<u64>,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Synthesize placeholder data when the backend fails
    pub synthetic_fallback: bool,
    /// Number of records per synthetic snapshot
    pub synthetic_count: usize,
    /// Directory backing saved investigations
    pub storage_dir: PathBuf,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from process environment
    ///
    /// # Errors
    /// Returns `ConfigError` if a variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using a custom variable lookup
    ///
    /// # Errors
    /// Returns `ConfigError` if a variable is set but unparseable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base) = non_empty(API_URL_ENV).or_else(|| non_empty(API_BASE_ENV)) {
            config.api_base = base.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = non_empty(POLL_INTERVAL_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::invalid_value(POLL_INTERVAL_ENV, &raw))?;
            config.poll_interval_secs = Some(secs);
        }
        if let Some(raw) = non_empty(REQUEST_TIMEOUT_ENV) {
            config.request_timeout_secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::invalid_value(REQUEST_TIMEOUT_ENV, &raw))?;
        }
        if let Some(raw) = non_empty(SYNTHETIC_FALLBACK_ENV) {
            config.synthetic_fallback = parse_bool(&raw)
                .ok_or_else(|| ConfigError::invalid_value(SYNTHETIC_FALLBACK_ENV, &raw))?;
        }
        if let Some(dir) = non_empty(STORAGE_DIR_ENV) {
            config.storage_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on malformed TOML or a validation error.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text)?;
        config.api_base = config.api_base.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check invariants
    ///
    /// # Errors
    /// Returns `ConfigError` for an unusable base URL or zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base.trim();
        if base.is_empty() || !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.api_base.clone()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// With API base
    #[inline]
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// With poll interval override
    #[inline]
    #[must_use]
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = Some(secs);
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With synthetic fallback toggle
    #[inline]
    #[must_use]
    pub fn with_synthetic_fallback(mut self, enabled: bool) -> Self {
        self.synthetic_fallback = enabled;
        self
    }

    /// With storage directory
    #[inline]
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Poll interval for a dataset, clamped to 10s..=60s
    #[must_use]
    pub fn poll_interval_for(&self, kind: DatasetKind) -> Duration {
        self.poll_interval_secs
            .map_or_else(|| kind.default_poll_interval(), Duration::from_secs)
            .clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Absolute URL for an endpoint path
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval_secs: None,
            request_timeout_secs: 8,
            synthetic_fallback: true,
            synthetic_count: 12,
            storage_dir: PathBuf::from(".ghostquant"),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
