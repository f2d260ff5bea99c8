//! Streaming file hasher producing 64-bit content fingerprints.
//!
//! # Overview
//!
//! The [`Hasher`] opens a file, feeds it through a fixed-size buffer into a
//! streaming checksum and returns a [`Fingerprint`]. Files never have to fit
//! in memory and the file handle is dropped before the call returns, on the
//! success path as well as on every error path.
//!
//! # Example
//!
//! ```no_run
//! use finddupes::scanner::{FingerprintAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new().with_algorithm(FingerprintAlgorithm::Xxh3);
//! let fingerprint = hasher.hash(Path::new("Cargo.toml")).unwrap();
//! println!("{fingerprint}");
//! ```

use std::fmt;
use std::fs::File;
use std::hash::Hasher as _;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::HashError;

/// Default read buffer size, one common filesystem block.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// 64-bit digest summarizing a file's full byte content.
///
/// Equal content always yields equal fingerprints. Different content yields
/// different fingerprints with high probability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Raw digest value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for Fingerprint {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Checksum used to fingerprint file content.
///
/// The algorithm is fixed for the duration of a scan; fingerprints from
/// different algorithms are not comparable.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintAlgorithm {
    /// 64-bit FNV-1a
    #[default]
    #[value(name = "fnv1a")]
    Fnv1a,
    /// 64-bit XXH3
    Xxh3,
    /// BLAKE3 truncated to its first 8 bytes
    Blake3,
}

impl fmt::Display for FingerprintAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fnv1a => write!(f, "fnv1a"),
            Self::Xxh3 => write!(f, "xxh3"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Running checksum state for one file.
enum Accumulator {
    Fnv1a(fnv::FnvHasher),
    Xxh3(Box<xxhash_rust::xxh3::Xxh3>),
    Blake3(Box<blake3::Hasher>),
}

impl Accumulator {
    fn new(algorithm: FingerprintAlgorithm) -> Self {
        match algorithm {
            FingerprintAlgorithm::Fnv1a => Self::Fnv1a(fnv::FnvHasher::default()),
            FingerprintAlgorithm::Xxh3 => Self::Xxh3(Box::new(xxhash_rust::xxh3::Xxh3::new())),
            FingerprintAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Fnv1a(state) => state.write(chunk),
            Self::Xxh3(state) => state.update(chunk),
            Self::Blake3(state) => {
                state.update(chunk);
            }
        }
    }

    fn finish(self) -> Fingerprint {
        match self {
            Self::Fnv1a(state) => Fingerprint(state.finish()),
            Self::Xxh3(state) => Fingerprint(state.digest()),
            Self::Blake3(state) => {
                let digest = state.finalize();
                let mut head = [0u8; 8];
                head.copy_from_slice(&digest.as_bytes()[..8]);
                Fingerprint(u64::from_le_bytes(head))
            }
        }
    }
}

/// Streaming content hasher.
///
/// `Hasher` is plain configuration and is `Copy`, so every worker can hold
/// its own and reuse a private buffer through [`Hasher::hash_with_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hasher {
    algorithm: FingerprintAlgorithm,
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher using FNV-1a and a 4 KiB buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            algorithm: FingerprintAlgorithm::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the checksum algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: FingerprintAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the read buffer size. Zero is raised to one byte.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> FingerprintAlgorithm {
        self.algorithm
    }

    /// The configured buffer size in bytes.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Allocate a read buffer of the configured size.
    #[must_use]
    pub fn new_buffer(&self) -> Vec<u8> {
        vec![0u8; self.buffer_size]
    }

    /// Fingerprint the full content of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Open`] if the file cannot be opened and
    /// [`HashError::Read`] if reading fails before end of file.
    pub fn hash(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let mut buffer = self.new_buffer();
        self.hash_with_buffer(path, &mut buffer)
    }

    /// Fingerprint a file, reading through a caller-owned buffer.
    ///
    /// An empty `buffer` is grown to the configured size.
    ///
    /// # Errors
    ///
    /// Same as [`Hasher::hash`].
    pub fn hash_with_buffer(
        &self,
        path: &Path,
        buffer: &mut Vec<u8>,
    ) -> Result<Fingerprint, HashError> {
        let file = File::open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        if buffer.is_empty() {
            buffer.resize(self.buffer_size, 0);
        }

        let fingerprint = self
            .hash_reader(file, buffer)
            .map_err(|source| HashError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        log::trace!("Hashed {} -> {}", path.display(), fingerprint);
        Ok(fingerprint)
    }

    /// Fingerprint everything `reader` yields until end of stream.
    ///
    /// # Errors
    ///
    /// Propagates any read error other than [`ErrorKind::Interrupted`],
    /// which is retried.
    pub fn hash_reader<R: Read>(
        &self,
        mut reader: R,
        buffer: &mut [u8],
    ) -> std::io::Result<Fingerprint> {
        let mut accumulator = Accumulator::new(self.algorithm);
        loop {
            match reader.read(buffer) {
                Ok(0) => break,
                Ok(n) => accumulator.update(&buffer[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(accumulator.finish())
    }

    /// Fingerprint an in-memory byte slice.
    #[must_use]
    pub fn hash_bytes(&self, bytes: &[u8]) -> Fingerprint {
        let mut accumulator = Accumulator::new(self.algorithm);
        accumulator.update(bytes);
        accumulator.finish()
    }
}
