//! Error types for GhostQuant core
//!
//! Configuration loading and dataset lookup failures.

use std::path::PathBuf;

/// Unrecognized dataset name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dataset: '{0}'")]
pub struct UnknownDatasetError(pub String);

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A value could not be parsed
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    /// Base URL is empty or not http(s)
    #[error("invalid API base URL: '{0}'")]
    InvalidBaseUrl(String),

    /// Request timeout must be positive
    #[error("request timeout must be at least 1s")]
    ZeroTimeout,

    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create invalid-value error
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}
