//! Output formatters for duplicate scan results.
//!
//! - [`text`]: one line per duplicate group, for humans and `cut`/`awk`
//! - [`json`]: a single document for automation
//!
//! Both formats report only groups with two or more members, in a stable
//! order: paths sorted within each group, groups sorted by their first path.
//!
//! # Path rendering
//!
//! Bytes that are not valid UTF-8 are written as `\xNN`, so distinct names
//! never print the same. Text output also escapes `\` as `\\` (unix only)
//! and tab, newline and carriage return as `\t`, `\n` and `\r`, keeping
//! one group per line. JSON escapes those characters itself.
//!
//! # Example
//!
//! ```no_run
//! use finddupes::duplicates::DuplicateFinder;
//! use finddupes::output::text::TextOutput;
//! use std::path::{Path, PathBuf};
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, _summary) = finder
//!     .find_duplicates_in_paths(&[PathBuf::from(".")])
//!     .unwrap();
//!
//! TextOutput::new(&groups).write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod text;

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::duplicates::{DuplicateGroups, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::Fingerprint;

pub use json::JsonOutput;
pub use text::TextOutput;

/// Errors that can occur while writing a report.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// A duplicate group in report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportGroup {
    /// Shared fingerprint
    pub fingerprint: Fingerprint,
    /// Member paths, sorted
    pub files: Vec<PathBuf>,
}

/// Duplicate groups (two or more members) in stable report order.
#[must_use]
pub fn report_groups(groups: &DuplicateGroups) -> Vec<ReportGroup> {
    let mut report: Vec<ReportGroup> = groups
        .duplicates()
        .map(|(fingerprint, paths)| {
            let mut files = paths.clone();
            files.sort();
            ReportGroup {
                fingerprint: *fingerprint,
                files,
            }
        })
        .collect();
    report.sort_by(|a, b| a.files.cmp(&b.files));
    report
}

/// Render `path` for a text report.
#[must_use]
pub fn text_path(path: &Path) -> String {
    render_path(path, true)
}

/// Render `path` for a JSON report.
#[must_use]
pub fn json_path(path: &Path) -> String {
    render_path(path, false)
}

#[cfg(unix)]
fn render_path(path: &Path, escape_text: bool) -> String {
    use std::os::unix::ffi::OsStrExt;

    let mut out = String::new();
    for chunk in path.as_os_str().as_bytes().utf8_chunks() {
        if escape_text {
            push_escaped(&mut out, chunk.valid(), true);
        } else {
            out.push_str(chunk.valid());
        }
        for byte in chunk.invalid() {
            out.push_str(&format!("\\x{byte:02x}"));
        }
    }
    out
}

#[cfg(not(unix))]
fn render_path(path: &Path, escape_text: bool) -> String {
    let lossy = path.to_string_lossy();
    if !escape_text {
        return lossy.into_owned();
    }
    // Backslash is the separator here and stays as is.
    let mut out = String::with_capacity(lossy.len());
    push_escaped(&mut out, &lossy, false);
    out
}

fn push_escaped(out: &mut String, text: &str, escape_backslash: bool) {
    for c in text.chars() {
        match c {
            '\\' if escape_backslash => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
}

/// Write the report for a completed scan in `format`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_report<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    groups: &DuplicateGroups,
    summary: &ScanSummary,
    exit_code: ExitCode,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Text => TextOutput::new(groups).write_to(writer),
        OutputFormat::Json => JsonOutput::new(groups, summary, exit_code).write_to(writer, true),
    }
}
