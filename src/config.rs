//! Application configuration management.
//!
//! Settings are layered with figment, lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: the `--config` path, or `config.toml` in the platform
//!    configuration directory when it exists
//! 3. `FINDDUPES_*` environment variables (e.g. `FINDDUPES_WORKERS=8`)
//! 4. Command-line flags ([`ConfigOverrides`])
//!
//! # Example file
//!
//! ```toml
//! workers = 8
//! buffer_size = 65536
//! algorithm = "xxh3"
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "node_modules"]
//! output = "json"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};
use crate::duplicates::{default_workers, FinderConfig};
use crate::scanner::{FingerprintAlgorithm, WalkerConfig, DEFAULT_BUFFER_SIZE};

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "FINDDUPES_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of hashing workers.
    pub workers: usize,
    /// Read buffer size per worker, in bytes.
    pub buffer_size: usize,
    /// Fingerprint algorithm.
    pub algorithm: FingerprintAlgorithm,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Honor `.gitignore` at the top of each root.
    pub respect_gitignore: bool,
    /// Glob patterns to exclude.
    pub ignore_patterns: Vec<String>,
    /// Result format.
    pub output: OutputFormat,
    /// Hash on a single thread.
    pub sequential: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            algorithm: FingerprintAlgorithm::default(),
            skip_hidden: false,
            respect_gitignore: false,
            ignore_patterns: Vec::new(),
            output: OutputFormat::default(),
            sequential: false,
        }
    }
}

/// Values given on the command line. Absent values leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<FingerprintAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respect_gitignore: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_patterns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequential: Option<bool>,
}

impl From<&Cli> for ConfigOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            workers: cli
                .workers
                .map(|w| usize::try_from(w).unwrap_or(usize::MAX)),
            buffer_size: cli.buffer_size,
            algorithm: cli.algorithm,
            // Boolean flags can only switch a setting on.
            skip_hidden: cli.skip_hidden.then_some(true),
            respect_gitignore: cli.respect_gitignore.then_some(true),
            ignore_patterns: cli.ignore_patterns.clone(),
            output: cli.output,
            sequential: cli.sequential.then_some(true),
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// An explicit `path` must exist; the default path is used only if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing, a layer cannot be
    /// parsed, or the merged values fail [`Config::validate`].
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::config_path().filter(|p| p.is_file()),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = &file {
            log::debug!("Loading config from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        let figment = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides));

        Self::extract(&figment)
    }

    /// Load defaults overlaid with a single TOML file, ignoring the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or fails validation.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Self::default())).merge(Toml::file(path));
        Self::extract(&figment)
    }

    fn extract(figment: &Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "finddupes", "finddupes")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Reject values the scanner cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error for zero workers or a zero-byte buffer.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.buffer_size == 0 {
            bail!("buffer_size must be at least 1 byte");
        }
        Ok(())
    }

    /// Traversal filters from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.skip_hidden,
            self.respect_gitignore,
            self.ignore_patterns.clone(),
        )
    }

    /// Finder settings from this configuration, without a progress callback.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_workers(self.workers)
            .with_algorithm(self.algorithm)
            .with_buffer_size(self.buffer_size)
            .with_walker_config(self.walker_config())
            .with_sequential(self.sequential)
    }
}
