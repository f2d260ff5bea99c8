//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Hashing discovered files on a bounded worker pool
//! - Fail-fast aggregation of hash results into fingerprint groups
//! - Orchestrating a full scan with a summary

pub mod finder;
pub mod groups;

pub use finder::{
    default_workers, find_duplicates, find_duplicates_concurrently, DuplicateFinder,
    FinderConfig, FinderError, ScanSummary, WorkerPool,
};
pub use groups::{aggregate, Aggregator, DuplicateGroups, HashResult};
