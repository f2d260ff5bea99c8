//! Command-line interface definitions for finddupes.
//!
//! This module defines all CLI arguments using the clap derive API. Every
//! option that also exists in the configuration file is optional here, so
//! an absent flag leaves the configured value alone.
//!
//! # Example
//!
//! ```bash
//! # Print duplicate groups under two trees
//! finddupes ~/Pictures /mnt/backup/Pictures
//!
//! # JSON output, 8 workers, XXH3 fingerprints
//! finddupes -j 8 --algorithm xxh3 --output json ~/Downloads
//!
//! # Verbose mode for debugging
//! finddupes -v ~/Downloads
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::scanner::FingerprintAlgorithm;

/// Find duplicate files by content.
///
/// finddupes walks every directory given, fingerprints each file's content
/// on a bounded pool of workers, and prints one line per set of identical
/// files.
#[derive(Debug, Parser)]
#[command(name = "finddupes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to scan (one or more)
    #[arg(value_name = "DIR", required = true, num_args = 1..)]
    pub directories: Vec<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE", env = "FINDDUPES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of hashing workers (default: number of CPUs)
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub workers: Option<u64>,

    /// Read buffer size per worker (e.g., 4096, 64KiB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_buffer_size)]
    pub buffer_size: Option<usize>,

    /// Fingerprint algorithm
    #[arg(long, value_enum, value_name = "ALGORITHM")]
    pub algorithm: Option<FingerprintAlgorithm>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Honor the .gitignore at the top of each directory
    #[arg(long)]
    pub respect_gitignore: bool,

    /// Glob patterns to ignore (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Hash files one at a time on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Print errors as JSON objects on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for scan results.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per duplicate group
    #[default]
    Text,
    /// JSON document with groups and a summary
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use finddupes::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a read buffer size; must be at least one byte.
///
/// # Errors
///
/// Returns an error for malformed sizes, zero, or sizes that do not fit in
/// memory addresses on this platform.
pub fn parse_buffer_size(s: &str) -> Result<usize, String> {
    let bytes = parse_size(s)?;
    if bytes == 0 {
        return Err("Buffer size must be at least 1 byte".to_string());
    }
    usize::try_from(bytes).map_err(|_| format!("Buffer size too large: {bytes}"))
}
