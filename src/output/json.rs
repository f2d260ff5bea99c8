//! JSON output formatter for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "fingerprint": "af63dc4c8601ec8c",
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "roots": 1,
//!     "total_files": 100,
//!     "unique_files": 90,
//!     "duplicate_groups": 4,
//!     "duplicate_files": 6,
//!     "workers": 8,
//!     "algorithm": "fnv1a",
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "FD000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use super::{json_path, report_groups, OutputError, ReportGroup};
use crate::duplicates::{DuplicateGroups, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::FingerprintAlgorithm;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Fingerprint as 16 hexadecimal digits
    pub fingerprint: String,
    /// Paths of every file in the group, sorted
    pub files: Vec<String>,
}

impl From<&ReportGroup> for JsonDuplicateGroup {
    fn from(group: &ReportGroup) -> Self {
        Self {
            fingerprint: group.fingerprint.to_string(),
            files: group.files.iter().map(|p| json_path(p)).collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Root directories scanned
    pub roots: usize,
    /// Files discovered and hashed
    pub total_files: usize,
    /// Files whose content appears only once
    pub unique_files: usize,
    /// Groups of identical files
    pub duplicate_groups: usize,
    /// Copies beyond the first in every group
    pub duplicate_files: usize,
    /// Hashing workers used
    pub workers: usize,
    /// Fingerprint algorithm
    pub algorithm: FingerprintAlgorithm,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "FD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a [`ScanSummary`] and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            roots: summary.roots,
            total_files: summary.total_files,
            unique_files: summary.unique_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            workers: summary.workers,
            algorithm: summary.algorithm,
            scan_duration_ms: (summary.elapsed_secs * 1000.0).round() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups in report order
    pub groups: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create the JSON report for a completed scan.
    #[must_use]
    pub fn new(groups: &DuplicateGroups, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            groups: report_groups(groups)
                .iter()
                .map(JsonDuplicateGroup::from)
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), OutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
