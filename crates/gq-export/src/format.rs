//! Export formats

use crate::error::ExportError;
use std::fmt;
use std::str::FromStr;

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Whole snapshot, pretty-printed
    Json,
    /// RFC 4180 table
    Csv,
    /// Pipe table with a heading
    Markdown,
    /// Standalone HTML document
    Html,
}

impl ExportFormat {
    /// All formats
    pub const ALL: [ExportFormat; 4] = [Self::Json, Self::Csv, Self::Markdown, Self::Html];

    /// File extension, without the dot
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }

    /// MIME type
    #[inline]
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Markdown => "text/markdown",
            Self::Html => "text/html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "md" | "markdown" => Ok(Self::Markdown),
            "html" | "htm" => Ok(Self::Html),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}
