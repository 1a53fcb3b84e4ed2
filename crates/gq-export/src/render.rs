//! Rendering snapshots to text
//!
//! Tabular formats carry only the records; the JSON export is the whole
//! snapshot including metrics, timestamp and source.

use crate::error::ExportError;
use crate::format::ExportFormat;
use crate::tabular::Tabular;
use chrono::{DateTime, Utc};
use gq_core::{DatasetKind, Snapshot};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// Render `snapshot` in `format`
///
/// # Errors
/// Returns `ExportError::Serialize` if JSON serialization fails.
pub fn render<R, M>(
    kind: DatasetKind,
    snapshot: &Snapshot<R, M>,
    format: ExportFormat,
) -> Result<String, ExportError>
where
    R: Tabular + Serialize,
    M: Serialize,
{
    Ok(match format {
        ExportFormat::Json => serde_json::to_string_pretty(snapshot)?,
        ExportFormat::Csv => to_csv(&snapshot.records),
        ExportFormat::Markdown => to_markdown(kind, snapshot),
        ExportFormat::Html => to_html(kind, snapshot),
    })
}

/// CSV: header line, then one line per record
#[must_use]
pub fn to_csv<R: Tabular>(records: &[R]) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, R::headers().iter().map(|h| (*h).to_string()));
    for record in records {
        push_csv_line(&mut out, record.row());
    }
    out
}

fn push_csv_line(out: &mut String, cells: impl IntoIterator<Item = String>) {
    let line: Vec<String> = cells.into_iter().map(|c| csv_escape(&c)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// Quote a CSV cell if it contains a delimiter, quote or line break
#[must_use]
pub fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Markdown document: heading, provenance line, pipe table
#[must_use]
pub fn to_markdown<R: Tabular, M>(kind: DatasetKind, snapshot: &Snapshot<R, M>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# GhostQuant {kind} export\n");
    let _ = writeln!(
        out,
        "Generated {} from {} data, {} records.\n",
        snapshot.timestamp.to_rfc3339(),
        snapshot.source.as_str(),
        snapshot.len()
    );

    let headers = R::headers();
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = writeln!(out, "|{}", " --- |".repeat(headers.len()));
    for record in &snapshot.records {
        let cells: Vec<String> = record.row().iter().map(|c| markdown_escape(c)).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    out
}

/// Escape pipes and flatten line breaks inside a table cell
#[must_use]
pub fn markdown_escape(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Standalone HTML document with one table
#[must_use]
pub fn to_html<R: Tabular, M>(kind: DatasetKind, snapshot: &Snapshot<R, M>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>GhostQuant {kind} export</title>");
    out.push_str("</head>\n<body>\n");
    let _ = writeln!(out, "<h1>GhostQuant {kind} export</h1>");
    let _ = writeln!(
        out,
        "<p>Generated {} from {} data, {} records.</p>",
        snapshot.timestamp.to_rfc3339(),
        snapshot.source.as_str(),
        snapshot.len()
    );

    out.push_str("<table>\n<thead>\n<tr>");
    for header in R::headers() {
        let _ = write!(out, "<th>{}</th>", html_escape(header));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for record in &snapshot.records {
        out.push_str("<tr>");
        for cell in record.row() {
            let _ = write!(out, "<td>{}</td>", html_escape(&cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

/// Escape `& < > " '`
#[must_use]
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `ghostquant-<kind>-<YYYYMMDD-HHMMSS>.<ext>`
#[must_use]
pub fn export_filename(kind: DatasetKind, format: ExportFormat, timestamp: DateTime<Utc>) -> String {
    format!(
        "ghostquant-{}-{}.{}",
        kind.as_str(),
        timestamp.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

/// Render and write an export into `dir`, returning the file path
///
/// # Errors
/// Serialization failure, or the directory or file cannot be written.
pub fn write_export<R, M>(
    dir: impl AsRef<Path>,
    kind: DatasetKind,
    snapshot: &Snapshot<R, M>,
    format: ExportFormat,
) -> Result<PathBuf, ExportError>
where
    R: Tabular + Serialize,
    M: Serialize,
{
    let dir = dir.as_ref();
    let body = render(kind, snapshot, format)?;

    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(export_filename(kind, format, snapshot.timestamp));
    std::fs::write(&path, body).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), %kind, %format, records = snapshot.len(), "export written");
    Ok(path)
}
