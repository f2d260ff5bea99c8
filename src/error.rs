//! Exit codes and structured error reporting for the command line.

use serde::Serialize;

/// Process exit codes.
///
/// - 0: Scan completed and at least one duplicate group was found
/// - 1: The scan failed
/// - 2: Scan completed but every file is unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: duplicates were found.
    Success = 0,
    /// General error: the scan could not complete.
    GeneralError = 1,
    /// No duplicates: the scan completed without finding any.
    NoDuplicates = 2,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FD000",
            Self::GeneralError => "FD001",
            Self::NoDuplicates => "FD002",
        }
    }

    /// Exit code for a completed scan with `duplicate_groups` groups.
    #[must_use]
    pub fn for_duplicate_groups(duplicate_groups: usize) -> Self {
        if duplicate_groups > 0 {
            Self::Success
        } else {
            Self::NoDuplicates
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "FD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
