//! Export errors

use std::path::PathBuf;

/// Errors raised while rendering or writing an export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Format name not recognized
    #[error("unknown export format: {0} (expected json, csv, markdown or html)")]
    UnknownFormat(String),

    /// Snapshot could not be serialized
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Output could not be written
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
