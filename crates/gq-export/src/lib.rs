//! GhostQuant Exporter
//!
//! Renders in-memory dashboard snapshots to downloadable files:
//! - JSON: the whole snapshot, metrics included
//! - CSV, Markdown, HTML: one table row per record
//!
//! # Example
//!
//! ```rust,ignore
//! use gq_export::{write_export, ExportFormat};
//!
//! let path = write_export("exports", DatasetKind::Threats, &snapshot, ExportFormat::Csv)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod format;
pub mod render;
pub mod tabular;

pub use error::ExportError;
pub use format::ExportFormat;
pub use render::{export_filename, render, to_csv, to_html, to_markdown, write_export};
pub use tabular::Tabular;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
