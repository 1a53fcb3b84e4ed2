//! Storage errors

use std::path::PathBuf;

/// Errors raised by storage backends and the repository
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Key contains characters a backend cannot map to a location
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Filesystem failure
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored value is not a recognized layout
    #[error("stored value under {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored envelope was written by a newer client
    #[error("{key} has envelope version {version}, newest supported is {supported}")]
    UnsupportedVersion {
        key: String,
        version: u32,
        supported: u32,
    },

    /// Value could not be serialized
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Record rejected before writing
    #[error("invalid investigation: {0}")]
    InvalidRecord(String),
}

impl StoreError {
    /// Wrap an I/O error with its path
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
