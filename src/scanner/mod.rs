//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Breadth-first discovery of every file beneath a set of root directories
//! - Streaming 64-bit content fingerprints
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Streaming file fingerprinting
//!
//! # Example
//!
//! ```no_run
//! use finddupes::scanner::{find_files, Hasher};
//! use std::path::Path;
//!
//! let files = find_files(&[Path::new(".")]).unwrap();
//! let hasher = Hasher::new();
//! for path in &files {
//!     println!("{} {}", hasher.hash(path).unwrap(), path.display());
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use hasher::{Fingerprint, FingerprintAlgorithm, Hasher, DEFAULT_BUFFER_SIZE};
pub use walker::{find_files, validate_roots, Walker};

/// Configuration for directory walking.
///
/// Every filter is off by default, so a walk reports every file.
/// Filters never apply to the roots themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Load the `.gitignore` found at the top of each root.
    pub respect_gitignore: bool,

    /// Glob patterns to ignore (gitignore-style).
    pub ignore_patterns: Vec<String>,
}

impl WalkerConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `skip_hidden` - Whether to skip hidden entries
    /// * `respect_gitignore` - Whether to honor each root's `.gitignore`
    /// * `ignore_patterns` - Glob patterns to ignore
    #[must_use]
    pub fn new(skip_hidden: bool, respect_gitignore: bool, ignore_patterns: Vec<String>) -> Self {
        Self {
            skip_hidden,
            respect_gitignore,
            ignore_patterns,
        }
    }
}

/// Errors that can occur during root validation and directory traversal.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// No root directories were supplied.
    #[error("Expected one or more directories")]
    NoRoots,

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A directory could not be opened.
    #[error("Cannot open directory {path}: {source}")]
    Open {
        /// Directory that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A directory's entries could not be listed.
    #[error("Cannot list directory {path}: {source}")]
    List {
        /// Directory being listed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file could not be opened.
    #[error("Cannot open file {path}: {source}")]
    Open {
        /// File that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading failed before end of file.
    #[error("Cannot read file {path}: {source}")]
    Read {
        /// File being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } => path,
        }
    }
}
