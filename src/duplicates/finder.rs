//! Duplicate finder: bounded worker pool and scan orchestration.
//!
//! # Overview
//!
//! This module drives a scan end to end:
//! 1. **Walk**: collect every file beneath the roots (see [`crate::scanner::walker`])
//! 2. **Hash**: fingerprint each file on a bounded pool of workers
//! 3. **Aggregate**: group paths by fingerprint on a single thread
//!    (see [`crate::duplicates::groups`])
//!
//! # Worker pool
//!
//! [`WorkerPool`] runs `N` workers on a dedicated rayon pool of exactly `N`
//! threads, so at most `N` files are open at any instant. Every path is
//! queued, and the queue closed, before the first worker starts; a worker
//! therefore only ever waits for a path that exists or learns that the queue
//! is exhausted. Each worker sends one [`HashResult`] per path.
//!
//! The calling thread aggregates while the workers run. It counts results
//! down from the number of submitted paths and stops when the count reaches
//! zero. On the first failed result it raises a cancellation flag and drops
//! the result receiver, and the pool scope joins every worker before the
//! error is returned.
//!
//! # Example
//!
//! ```no_run
//! use finddupes::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
//! let (groups, summary) = finder
//!     .find_duplicates_in_paths(&[PathBuf::from("/home/user/Downloads")])
//!     .unwrap();
//!
//! for (fingerprint, paths) in groups.duplicates() {
//!     println!("{fingerprint}: {} copies", paths.len());
//! }
//! println!("{} duplicate groups", summary.duplicate_groups);
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;

use super::groups::{aggregate, Aggregator, DuplicateGroups, HashResult};
use crate::progress::{ProgressCallback, PHASE_HASH, PHASE_WALK};
use crate::scanner::{FingerprintAlgorithm, HashError, Hasher, ScanError, Walker, WalkerConfig};

/// Errors that can abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// Root validation or directory traversal failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A file could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The worker threads could not be started.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The work queue rejected a path while it was being filled.
    #[error("Work queue closed before all paths were submitted")]
    QueueClosed,

    /// Workers stopped before every submitted path produced a result.
    #[error("Hashing ended after {received} of {expected} results")]
    Incomplete {
        /// Paths submitted to the pool
        expected: usize,
        /// Results received before the channel closed
        received: usize,
    },
}

/// Default worker count: one per available CPU.
#[must_use]
pub fn default_workers() -> usize {
    rayon::current_num_threads().max(1)
}

/// Configuration for a full scan.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing workers (upper bound on concurrently open files).
    pub workers: usize,
    /// Hasher shared by every worker.
    pub hasher: Hasher,
    /// Traversal filters.
    pub walker_config: WalkerConfig,
    /// Hash on the calling thread instead of the worker pool.
    pub sequential: bool,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("hasher", &self.hasher)
            .field("walker_config", &self.walker_config)
            .field("sequential", &self.sequential)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            hasher: Hasher::new(),
            walker_config: WalkerConfig::default(),
            sequential: false,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the worker count. Zero is raised to one.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the fingerprint algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: FingerprintAlgorithm) -> Self {
        self.hasher = self.hasher.with_algorithm(algorithm);
        self
    }

    /// Set the read buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.hasher = self.hasher.with_buffer_size(buffer_size);
        self
    }

    /// Set the traversal filters.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Hash sequentially on the calling thread.
    #[must_use]
    pub fn with_sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary of a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    /// Root directories scanned
    pub roots: usize,
    /// Files discovered and hashed
    pub total_files: usize,
    /// Files whose content appears only once
    pub unique_files: usize,
    /// Groups of two or more identical files
    pub duplicate_groups: usize,
    /// Copies beyond the first in every duplicate group
    pub duplicate_files: usize,
    /// Workers used for hashing (1 when sequential)
    pub workers: usize,
    /// Fingerprint algorithm
    pub algorithm: FingerprintAlgorithm,
    /// Wall-clock duration of the scan in seconds
    pub elapsed_secs: f64,
}

/// Bounded pool of hashing workers.
pub struct WorkerPool {
    workers: usize,
    hasher: Hasher,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl WorkerPool {
    /// Create a pool of `workers` threads (at least one).
    #[must_use]
    pub fn new(workers: usize, hasher: Hasher) -> Self {
        Self {
            workers: workers.max(1),
            hasher,
            progress: None,
        }
    }

    /// Report each aggregated result to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Worker count actually used for `files` paths.
    #[must_use]
    pub fn effective_workers(&self, files: usize) -> usize {
        self.workers.min(files).max(1)
    }

    /// Hash every path and group the results by fingerprint.
    ///
    /// # Errors
    ///
    /// Returns the first hashing failure the aggregator sees, or a pool
    /// error if the workers could not be started or vanished early.
    pub fn hash_all(&self, paths: &[PathBuf]) -> Result<DuplicateGroups, FinderError> {
        let submitted = paths.len();
        if submitted == 0 {
            log::debug!("Worker pool: no files to hash");
            return Ok(DuplicateGroups::new());
        }
        let workers = self.effective_workers(submitted);

        // Fill and close the queue before any worker starts.
        let (work_tx, work_rx) = crossbeam_channel::bounded::<PathBuf>(submitted);
        for path in paths {
            work_tx
                .send(path.clone())
                .map_err(|_| FinderError::QueueClosed)?;
        }
        drop(work_tx);

        let (result_tx, result_rx) = crossbeam_channel::unbounded::<HashResult>();
        let cancelled = AtomicBool::new(false);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("finddupes-hash-{idx}"))
            .build()?;

        log::info!("Hashing {} files with {} workers", submitted, workers);

        let hasher = self.hasher;
        let progress = self.progress.as_deref();

        pool.in_place_scope(|scope| {
            for worker_id in 0..workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let cancelled = &cancelled;
                scope.spawn(move |_| {
                    hash_worker(worker_id, hasher, &work_rx, &result_tx, cancelled);
                });
            }

            // Workers now hold the only senders.
            drop(result_tx);

            let outcome = collect_results(&result_rx, submitted, progress);
            if let Err(e) = &outcome {
                log::debug!("Worker pool: aborting scan: {}", e);
                cancelled.store(true, Ordering::SeqCst);
            }
            drop(result_rx);
            outcome
        })
    }
}

/// Pull paths until the queue is exhausted, sending one result per path.
fn hash_worker(
    worker_id: usize,
    hasher: Hasher,
    work_rx: &Receiver<PathBuf>,
    result_tx: &Sender<HashResult>,
    cancelled: &AtomicBool,
) {
    let mut buffer = hasher.new_buffer();
    let mut hashed = 0usize;

    for path in work_rx.iter() {
        if cancelled.load(Ordering::SeqCst) {
            log::debug!("Worker {}: scan cancelled", worker_id);
            break;
        }

        let outcome = hasher.hash_with_buffer(&path, &mut buffer);
        if let Err(e) = &outcome {
            log::debug!("Worker {}: {}", worker_id, e);
        }
        hashed += 1;

        if result_tx.send(HashResult::new(path, outcome)).is_err() {
            log::debug!("Worker {}: result channel closed", worker_id);
            break;
        }
    }

    log::debug!("Worker {} finished after {} files", worker_id, hashed);
}

/// Aggregate exactly `submitted` results, failing fast.
fn collect_results(
    result_rx: &Receiver<HashResult>,
    submitted: usize,
    progress: Option<&dyn ProgressCallback>,
) -> Result<DuplicateGroups, FinderError> {
    let mut aggregator = Aggregator::with_capacity(submitted);
    let mut pending = submitted;

    while pending > 0 {
        let Ok(result) = result_rx.recv() else {
            return Err(FinderError::Incomplete {
                expected: submitted,
                received: submitted - pending,
            });
        };
        pending -= 1;

        if let Some(callback) = progress {
            callback.on_progress(submitted - pending, &result.path.to_string_lossy());
        }
        aggregator.record(result)?;
    }

    Ok(aggregator.finish())
}

/// Hash `paths` one after another on the calling thread.
fn hash_sequential(
    hasher: Hasher,
    paths: &[PathBuf],
    progress: Option<&dyn ProgressCallback>,
) -> Result<DuplicateGroups, FinderError> {
    log::info!("Hashing {} files sequentially", paths.len());

    let mut buffer = hasher.new_buffer();
    let results = paths.iter().enumerate().map(|(idx, path)| {
        let outcome = hasher.hash_with_buffer(path, &mut buffer);
        if let Some(callback) = progress {
            callback.on_progress(idx + 1, &path.to_string_lossy());
        }
        HashResult::new(path.clone(), outcome)
    });

    Ok(aggregate(results)?)
}

/// Group `paths` by content, hashing on the calling thread.
///
/// # Errors
///
/// Returns the first file that cannot be hashed.
pub fn find_duplicates(paths: &[PathBuf]) -> Result<DuplicateGroups, FinderError> {
    hash_sequential(Hasher::new(), paths, None)
}

/// Group `paths` by content, hashing on one worker per CPU.
///
/// Produces the same grouping as [`find_duplicates`].
///
/// # Errors
///
/// Returns the first hashing failure observed, or a pool error.
pub fn find_duplicates_concurrently(paths: &[PathBuf]) -> Result<DuplicateGroups, FinderError> {
    WorkerPool::new(default_workers(), Hasher::new()).hash_all(paths)
}

/// Orchestrates walk, hash and aggregation for a set of roots.
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    fn progress(&self) -> Option<&dyn ProgressCallback> {
        self.config.progress_callback.as_deref()
    }

    /// Hash already-discovered files with the configured strategy.
    ///
    /// # Errors
    ///
    /// Returns the first hashing failure, or a pool error.
    pub fn hash_files(&self, files: &[PathBuf]) -> Result<DuplicateGroups, FinderError> {
        if let Some(callback) = self.progress() {
            callback.on_phase_start(PHASE_HASH, files.len());
        }

        let outcome = if self.config.sequential {
            hash_sequential(self.config.hasher, files, self.progress())
        } else {
            let mut pool = WorkerPool::new(self.config.workers, self.config.hasher);
            if let Some(callback) = &self.config.progress_callback {
                pool = pool.with_progress_callback(Arc::clone(callback));
            }
            pool.hash_all(files)
        };

        if let Some(callback) = self.progress() {
            callback.on_phase_end(PHASE_HASH);
        }
        outcome
    }

    /// Find duplicate files beneath `roots`.
    ///
    /// # Errors
    ///
    /// Fails on the first directory that cannot be walked or the first file
    /// that cannot be hashed. No partial result is returned.
    pub fn find_duplicates_in_paths(
        &self,
        roots: &[PathBuf],
    ) -> Result<(DuplicateGroups, ScanSummary), FinderError> {
        let start = Instant::now();
        log::info!("Starting duplicate scan of {} path(s)", roots.len());

        if let Some(callback) = self.progress() {
            callback.on_phase_start(PHASE_WALK, 0);
        }
        let walked = Walker::new(roots.to_vec(), self.config.walker_config.clone()).walk();
        if let Some(callback) = self.progress() {
            if let Ok(files) = &walked {
                callback.on_message(&format!("Found {} files", files.len()));
            }
            callback.on_phase_end(PHASE_WALK);
        }
        let files = walked?;

        let groups = self.hash_files(&files)?;

        let workers = if self.config.sequential || files.is_empty() {
            1
        } else {
            self.config.workers.min(files.len())
        };
        let summary = ScanSummary {
            roots: roots.len(),
            total_files: groups.file_count(),
            unique_files: groups.unique_count(),
            duplicate_groups: groups.duplicate_group_count(),
            duplicate_files: groups.redundant_count(),
            workers,
            algorithm: self.config.hasher.algorithm(),
            elapsed_secs: start.elapsed().as_secs_f64(),
        };

        log::info!(
            "Scan complete: {} files, {} duplicate groups, {} redundant copies",
            summary.total_files,
            summary.duplicate_groups,
            summary.duplicate_files
        );

        Ok((groups, summary))
    }
}
