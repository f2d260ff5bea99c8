//! Hash results and their aggregation into duplicate groups.
//!
//! # Overview
//!
//! Every hashed file produces one [`HashResult`]. The [`Aggregator`] folds
//! results, one at a time and in whatever order they arrive, into
//! [`DuplicateGroups`]: a map from [`Fingerprint`] to the paths that share
//! it. The aggregator is single-threaded and owns the map outright; workers
//! never touch it.
//!
//! Groups with a single member are kept. Filtering them out is the job of
//! whoever reports the result, via [`DuplicateGroups::duplicates`].
//!
//! # Example
//!
//! ```
//! use finddupes::duplicates::{aggregate, HashResult};
//! use finddupes::scanner::Fingerprint;
//! use std::path::PathBuf;
//!
//! let results = vec![
//!     HashResult::new(PathBuf::from("/a"), Ok(Fingerprint(1))),
//!     HashResult::new(PathBuf::from("/b"), Ok(Fingerprint(1))),
//!     HashResult::new(PathBuf::from("/c"), Ok(Fingerprint(2))),
//! ];
//!
//! let groups = aggregate(results).unwrap();
//! assert_eq!(groups.file_count(), 3);
//! assert_eq!(groups.duplicates().count(), 1);
//! ```

use std::collections::hash_map::{self, HashMap};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::scanner::{Fingerprint, HashError};

/// Outcome of hashing one file.
#[derive(Debug)]
pub struct HashResult {
    /// File that was hashed
    pub path: PathBuf,
    /// Fingerprint, or the error that stopped hashing
    pub outcome: Result<Fingerprint, HashError>,
}

impl HashResult {
    /// Create a new result.
    #[must_use]
    pub fn new(path: PathBuf, outcome: Result<Fingerprint, HashError>) -> Self {
        Self { path, outcome }
    }
}

/// Paths grouped by content fingerprint.
///
/// Within a group, paths keep the order in which they were aggregated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateGroups {
    groups: HashMap<Fingerprint, Vec<PathBuf>>,
    files: usize,
}

impl DuplicateGroups {
    /// Create an empty grouping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty grouping sized for `files` entries.
    #[must_use]
    pub fn with_capacity(files: usize) -> Self {
        Self {
            groups: HashMap::with_capacity(files),
            files: 0,
        }
    }

    /// Append `path` to the group for `fingerprint`, creating it if absent.
    pub fn insert(&mut self, fingerprint: Fingerprint, path: PathBuf) {
        self.groups.entry(fingerprint).or_default().push(path);
        self.files += 1;
    }

    /// Paths sharing `fingerprint`.
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&[PathBuf]> {
        self.groups.get(fingerprint).map(Vec::as_slice)
    }

    /// Iterate over every group, including single-member ones.
    pub fn iter(&self) -> hash_map::Iter<'_, Fingerprint, Vec<PathBuf>> {
        self.groups.iter()
    }

    /// Iterate over groups with two or more members.
    pub fn duplicates(&self) -> impl Iterator<Item = (&Fingerprint, &Vec<PathBuf>)> + '_ {
        self.groups.iter().filter(|(_, paths)| paths.len() > 1)
    }

    /// Fingerprint of the group containing `path`, if it was aggregated.
    #[must_use]
    pub fn fingerprint_of(&self, path: &Path) -> Option<Fingerprint> {
        self.groups
            .iter()
            .find(|(_, paths)| paths.iter().any(|p| p == path))
            .map(|(fingerprint, _)| *fingerprint)
    }

    /// Number of distinct fingerprints.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of groups with two or more members.
    #[must_use]
    pub fn duplicate_group_count(&self) -> usize {
        self.duplicates().count()
    }

    /// Number of files whose content appears nowhere else.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.groups.values().filter(|paths| paths.len() == 1).count()
    }

    /// Copies beyond the first in every duplicate group.
    #[must_use]
    pub fn redundant_count(&self) -> usize {
        self.duplicates().map(|(_, paths)| paths.len() - 1).sum()
    }

    /// Total number of aggregated files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// `true` when nothing was aggregated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group membership with ordering removed, for order-independent
    /// comparison of two scans.
    #[must_use]
    pub fn membership(&self) -> BTreeSet<BTreeSet<PathBuf>> {
        self.groups
            .values()
            .map(|paths| paths.iter().cloned().collect())
            .collect()
    }
}

impl<'a> IntoIterator for &'a DuplicateGroups {
    type Item = (&'a Fingerprint, &'a Vec<PathBuf>);
    type IntoIter = hash_map::Iter<'a, Fingerprint, Vec<PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Incremental, fail-fast result aggregation.
#[derive(Debug, Default)]
pub struct Aggregator {
    groups: DuplicateGroups,
}

impl Aggregator {
    /// Create an aggregator expecting roughly `files` results.
    #[must_use]
    pub fn with_capacity(files: usize) -> Self {
        Self {
            groups: DuplicateGroups::with_capacity(files),
        }
    }

    /// Fold one result into the grouping.
    ///
    /// # Errors
    ///
    /// Returns the result's [`HashError`] if hashing failed. The caller is
    /// expected to stop feeding results after the first error.
    pub fn record(&mut self, result: HashResult) -> Result<(), HashError> {
        let fingerprint = result.outcome?;
        self.groups.insert(fingerprint, result.path);
        Ok(())
    }

    /// Number of results recorded so far.
    #[must_use]
    pub fn recorded(&self) -> usize {
        self.groups.file_count()
    }

    /// Finish aggregation.
    #[must_use]
    pub fn finish(self) -> DuplicateGroups {
        self.groups
    }
}

/// Group `results` by fingerprint, stopping at the first failure.
///
/// `results` is consumed lazily; nothing after the first failing result is
/// pulled from the iterator.
///
/// # Errors
///
/// Returns the first [`HashError`] carried by a result.
pub fn aggregate<I>(results: I) -> Result<DuplicateGroups, HashError>
where
    I: IntoIterator<Item = HashResult>,
{
    let results = results.into_iter();
    let mut aggregator = Aggregator::with_capacity(results.size_hint().0);
    for result in results {
        aggregator.record(result)?;
    }
    Ok(aggregator.finish())
}
