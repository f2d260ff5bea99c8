//! Breadth-first directory walker.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for discovering every file
//! beneath one or more root directories. Traversal is driven by an explicit
//! work list that grows while it is drained: each directory is listed once,
//! its subdirectories are appended to the back of the list and its files are
//! appended to the output.
//!
//! # Failure policy
//!
//! The first directory that cannot be opened or listed aborts the whole walk
//! and the files collected so far are discarded.
//!
//! # Example
//!
//! ```no_run
//! use finddupes::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let config = WalkerConfig {
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")], config);
//! let files = walker.walk().unwrap();
//! println!("Found {} files", files.len());
//! ```

use std::collections::{HashSet, VecDeque};
use std::fs::{self, FileType};
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use super::{ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root directories to walk
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
}

/// Roots of one walk after repeats are dropped.
struct RootSet {
    /// Distinct roots in the form the caller supplied, in order
    roots: Vec<PathBuf>,
    /// Canonical paths of roots lying inside another root
    nested: HashSet<PathBuf>,
}

impl RootSet {
    /// Whether `dir`, reached while walking some root, is itself a nested
    /// root and will be walked on its own.
    fn is_nested_root(&self, dir: &Path) -> bool {
        !self.nested.is_empty()
            && fs::canonicalize(dir).is_ok_and(|canonical| self.nested.contains(&canonical))
    }
}

/// Per-root filtering state.
struct RootFilter<'a> {
    root: &'a Path,
    gitignore: Option<Gitignore>,
}

impl Walker {
    /// Create a new walker over `roots`.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self { roots, config }
    }

    /// Build gitignore matcher from config patterns and the root's .gitignore.
    fn build_gitignore(&self, root: &Path) -> Option<Gitignore> {
        if !self.config.respect_gitignore && self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(root);

        if self.config.respect_gitignore {
            let gitignore_path = root.join(".gitignore");
            if gitignore_path.is_file() {
                if let Some(e) = builder.add(&gitignore_path) {
                    log::warn!(
                        "Failed to load .gitignore from {}: {}",
                        gitignore_path.display(),
                        e
                    );
                } else {
                    log::debug!("Loaded .gitignore from {}", gitignore_path.display());
                }
            }
        }

        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if gitignore.is_empty() => None,
            Ok(gitignore) => Some(gitignore),
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check whether an entry is excluded by the configured filters.
    fn is_filtered(&self, filter: &RootFilter<'_>, path: &Path, is_dir: bool) -> bool {
        if self.config.skip_hidden
            && path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with('.'))
        {
            return true;
        }

        if let Some(gi) = &filter.gitignore {
            let relative = path.strip_prefix(filter.root).unwrap_or(path);
            return gi.matched(relative, is_dir).is_ignore();
        }

        false
    }

    /// Walk every root and return the files found beneath them.
    ///
    /// Within a directory, entries are visited in file-name order, so an
    /// unchanged tree always yields the same sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Open`] when a root or subdirectory cannot be
    /// opened and [`ScanError::List`] when its entries cannot be read.
    pub fn walk(&self) -> Result<Vec<PathBuf>, ScanError> {
        let root_set = resolve_roots(&self.roots)?;
        let roots = &root_set.roots;
        let filters: Vec<RootFilter<'_>> = roots
            .iter()
            .map(|root| RootFilter {
                root,
                gitignore: self.build_gitignore(root),
            })
            .collect();

        log::info!("Walking {} root(s)", roots.len());

        // The list grows while it is drained; every directory is pushed once,
        // either as a root or by the parent that listed it.
        let mut pending: VecDeque<(PathBuf, usize)> = roots
            .iter()
            .enumerate()
            .map(|(idx, root)| (root.clone(), idx))
            .collect();
        let mut files = Vec::new();
        let mut directories = 0usize;

        while let Some((dir, root_idx)) = pending.pop_front() {
            directories += 1;
            log::trace!("Listing {}", dir.display());

            let filter = &filters[root_idx];
            for (path, file_type) in list_directory(&dir)? {
                match classify(&path, file_type) {
                    EntryKind::Directory => {
                        if root_set.is_nested_root(&path) {
                            log::debug!("{} is walked as its own root", path.display());
                        } else if self.is_filtered(filter, &path, true) {
                            log::trace!("Ignoring directory: {}", path.display());
                        } else {
                            pending.push_back((path, root_idx));
                        }
                    }
                    EntryKind::File => {
                        if self.is_filtered(filter, &path, false) {
                            log::trace!("Ignoring file: {}", path.display());
                        } else {
                            files.push(path);
                        }
                    }
                    EntryKind::Skip => {
                        log::trace!("Skipping non-regular entry: {}", path.display());
                    }
                }
            }
        }

        log::info!(
            "Walk complete: {} files in {} directories",
            files.len(),
            directories
        );
        Ok(files)
    }
}

/// Find every file beneath `roots` with no filtering.
///
/// # Errors
///
/// Fails on the first directory that cannot be opened or listed.
pub fn find_files<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<PathBuf>, ScanError> {
    let roots = roots.iter().map(|r| r.as_ref().to_path_buf()).collect();
    Walker::new(roots, WalkerConfig::default()).walk()
}

/// Check that at least one root was given and that every root is an
/// existing directory.
///
/// # Errors
///
/// Returns [`ScanError::NoRoots`], [`ScanError::NotFound`],
/// [`ScanError::NotADirectory`], or [`ScanError::Open`] when the root's
/// metadata cannot be read for another reason.
pub fn validate_roots<P: AsRef<Path>>(roots: &[P]) -> Result<(), ScanError> {
    if roots.is_empty() {
        return Err(ScanError::NoRoots);
    }

    for root in roots {
        let root = root.as_ref();
        let metadata = fs::metadata(root).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ScanError::NotFound(root.to_path_buf())
            } else {
                ScanError::Open {
                    path: root.to_path_buf(),
                    source,
                }
            }
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
    }

    Ok(())
}

/// List the immediate entries of `dir`, sorted by file name.
fn list_directory(dir: &Path) -> Result<Vec<(PathBuf, FileType)>, ScanError> {
    let read_dir = fs::read_dir(dir).map_err(|source| ScanError::Open {
        path: dir.to_path_buf(),
        source,
    })?;

    let list_error = |source| ScanError::List {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(list_error)?;
        let file_type = entry.file_type().map_err(list_error)?;
        entries.push((entry.path(), file_type));
    }
    entries.sort_by(|(a, _), (b, _)| a.file_name().cmp(&b.file_name()));

    Ok(entries)
}

/// Drop repeated roots and note which of the rest lie inside another root.
///
/// Comparison uses canonical paths; the surviving roots keep the form the
/// caller supplied and their original order. A nested root stays a root of
/// its own, so the filters of its enclosing root never hide it, and the
/// enclosing walk does not descend into it.
fn resolve_roots(roots: &[PathBuf]) -> Result<RootSet, ScanError> {
    let mut kept: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(roots.len());
    for root in roots {
        let canonical = fs::canonicalize(root).map_err(|source| ScanError::Open {
            path: root.clone(),
            source,
        })?;
        if kept.iter().any(|(_, seen)| *seen == canonical) {
            log::debug!("Skipping repeated root {}", root.display());
            continue;
        }
        kept.push((root.clone(), canonical));
    }

    let nested = kept
        .iter()
        .filter(|(_, canonical)| {
            kept.iter()
                .any(|(_, other)| other != canonical && canonical.starts_with(other))
        })
        .map(|(_, canonical)| canonical.clone())
        .collect();

    Ok(RootSet {
        roots: kept.into_iter().map(|(root, _)| root).collect(),
        nested,
    })
}

/// What the walker does with one directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
    Skip,
}

/// Classify an entry by its own type, without following symlinks into
/// directories.
///
/// A symlink counts as a file unless its target is a directory or a special
/// file. Dangling links are kept so that hashing reports them.
fn classify(path: &Path, file_type: FileType) -> EntryKind {
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_symlink() {
        match fs::metadata(path) {
            Ok(target) if target.is_dir() || is_special(&target.file_type()) => EntryKind::Skip,
            _ => EntryKind::File,
        }
    } else if is_special(&file_type) {
        EntryKind::Skip
    } else {
        EntryKind::File
    }
}

/// FIFOs, sockets and device nodes are never hashed.
#[cfg(unix)]
fn is_special(file_type: &FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;
    file_type.is_fifo()
        || file_type.is_socket()
        || file_type.is_block_device()
        || file_type.is_char_device()
}

#[cfg(not(unix))]
fn is_special(_file_type: &FileType) -> bool {
    false
}
