//! Configuration for ROM verification runs.

use std::path::PathBuf;

/// Archive verified when no path is given.
pub const DEFAULT_ARCHIVE_PATH: &str = "emu/roms/daggorath.zip";

/// Manifest consulted when no path is given.
pub const DEFAULT_MANIFEST_PATH: &str = "/usr/share/games/mame/hash/coco_cart.xml";

/// Scratch directory archives are extracted into.
pub const DEFAULT_SCRATCH_DIR: &str = "temp";

/// Read size used when hashing files.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Settings for a single verification run.
///
/// The scratch directory is created on demand and never cleaned up.
/// Running two verifications against the same scratch directory at the same
/// time is not supported: extracted files overwrite each other.
///
/// # Examples
///
/// ```
/// use daggym_core::VerifyConfig;
///
/// let config = VerifyConfig::default()
///     .with_scratch_dir("/tmp/daggym-scratch")
///     .with_hash_all_files(true);
/// assert!(config.hash_all_files);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyConfig {
    /// Directory the archive is extracted into.
    pub scratch_dir: PathBuf,

    /// Chunk size for incremental hashing. `0` means [`DEFAULT_CHUNK_SIZE`].
    pub chunk_size: usize,

    /// Hash every extracted file, even without a size-matching entry.
    pub hash_all_files: bool,
}

impl Default for VerifyConfig {
    /// Default values:
    /// - `scratch_dir`: `temp`
    /// - `chunk_size`: 8 KiB
    /// - `hash_all_files`: `false`
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            chunk_size: DEFAULT_CHUNK_SIZE,
            hash_all_files: false,
        }
    }
}

impl VerifyConfig {
    /// Creates a new `VerifyConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scratch directory.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Sets the hashing chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets whether every extracted file is hashed.
    #[must_use]
    pub fn with_hash_all_files(mut self, hash_all: bool) -> Self {
        self.hash_all_files = hash_all;
        self
    }

    /// Chunk size with `0` resolved to the default.
    #[must_use]
    pub fn effective_chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }
}
