//! finddupes - Concurrent duplicate file finder
//!
//! Walks one or more directory trees, fingerprints every file's content on a
//! bounded pool of worker threads, and groups files whose fingerprints match.
//!
//! # Library use
//!
//! ```no_run
//! use finddupes::duplicates::find_duplicates_concurrently;
//! use finddupes::scanner::find_files;
//! use std::path::Path;
//!
//! let files = find_files(&[Path::new("/srv/media")]).unwrap();
//! let groups = find_duplicates_concurrently(&files).unwrap();
//! for (fingerprint, paths) in groups.duplicates() {
//!     println!("{fingerprint}: {paths:?}");
//! }
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::{Config, ConfigOverrides};
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::progress::Progress;

/// Run a scan for the parsed command line and print the report to stdout.
///
/// Logging must already be initialised.
///
/// # Errors
///
/// Returns an error if a root is invalid, the configuration cannot be
/// loaded, any directory or file cannot be read, or the report cannot be
/// written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    scanner::validate_roots(&cli.directories)?;

    let overrides = ConfigOverrides::from(&cli);
    let config = Config::load(cli.config.as_deref(), &overrides)?;
    log::debug!("Effective configuration: {:?}", config);

    let mut finder_config = config.finder_config();
    if !cli.quiet && config.output == OutputFormat::Text {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder
        .find_duplicates_in_paths(&cli.directories)
        .context("Scan failed")?;

    let exit_code = ExitCode::for_duplicate_groups(summary.duplicate_groups);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::write_report(&mut out, config.output, &groups, &summary, exit_code)?;

    Ok(exit_code)
}
