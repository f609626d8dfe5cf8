//! Verification reporting.

use std::path::Path;
use std::path::PathBuf;

use crate::checksum::Checksums;

/// Outcome of a verification run that completed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    /// At least one extracted file matched a manifest entry on both digests.
    Verified,
    /// Extraction succeeded but no file fully matched any entry.
    ChecksumMismatch,
    /// The manifest selected no `<rom>` entries; nothing was extracted.
    NoManifestEntries,
}

impl VerificationStatus {
    /// Returns `true` only for [`VerificationStatus::Verified`].
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verified => write!(f, "verified"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::NoManifestEntries => write!(f, "no manifest entries"),
        }
    }
}

/// One extracted file compared against one same-size manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Name of the manifest entry.
    pub entry_name: String,

    /// CRC-32 the manifest expects.
    pub expected_crc32: String,

    /// SHA-1 the manifest expects.
    pub expected_sha1: String,

    /// Whether the file's CRC-32 equals the expected value.
    pub crc_match: bool,

    /// Whether the file's SHA-1 equals the expected value.
    pub sha1_match: bool,
}

impl Comparison {
    /// Both digests agree.
    #[must_use]
    pub const fn is_full_match(&self) -> bool {
        self.crc_match && self.sha1_match
    }
}

/// Everything learned about one extracted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Path relative to the scratch directory.
    pub path: PathBuf,

    /// Size in bytes.
    pub size: u64,

    /// Actual digests. `None` when no manifest entry had this size and
    /// hashing of unmatched files was not requested.
    pub checksums: Option<Checksums>,

    /// One comparison per manifest entry of the same size.
    pub comparisons: Vec<Comparison>,
}

impl FileReport {
    /// Returns `true` if any comparison for this file is a full match.
    #[must_use]
    pub fn has_full_match(&self) -> bool {
        self.comparisons.iter().any(Comparison::is_full_match)
    }
}

/// Result of verifying one archive against one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Overall outcome.
    pub status: VerificationStatus,

    /// Member names in archive order. Empty when nothing was extracted.
    pub archive_members: Vec<String>,

    /// Every regular file found in the scratch directory, sorted by path.
    pub files: Vec<FileReport>,

    /// Number of `<rom>` entries in the manifest.
    pub manifest_entries: usize,
}

impl VerificationReport {
    /// Report for a manifest with no entries.
    #[must_use]
    pub const fn no_entries() -> Self {
        Self {
            status: VerificationStatus::NoManifestEntries,
            archive_members: Vec::new(),
            files: Vec::new(),
            manifest_entries: 0,
        }
    }

    /// The overall boolean verdict.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.status.is_match()
    }

    /// Iterates over every (file, comparison) pair that fully matched.
    pub fn full_matches(&self) -> impl Iterator<Item = (&FileReport, &Comparison)> {
        self.files.iter().flat_map(|file| {
            file.comparisons
                .iter()
                .filter(|c| c.is_full_match())
                .map(move |c| (file, c))
        })
    }

    /// Files whose size matched no manifest entry.
    pub fn unmatched_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.comparisons.is_empty())
    }
}

/// Callback trait for progress reporting while hashing extracted files.
///
/// The trait requires `Send` so a callback can be driven from a worker
/// thread.
///
/// # Examples
///
/// ```
/// use daggym_core::ProgressCallback;
/// use std::path::Path;
///
/// struct Counter(u64);
///
/// impl ProgressCallback for Counter {
///     fn on_file_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("[{current}/{total}] {}", path.display());
///     }
///
///     fn on_bytes_hashed(&mut self, bytes: u64) {
///         self.0 += bytes;
///     }
///
///     fn on_file_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {}
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before a file is examined.
    ///
    /// # Arguments
    ///
    /// * `path` - Path relative to the scratch directory
    /// * `total` - Number of files in the scratch directory
    /// * `current` - Current file number (1-indexed)
    fn on_file_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called for each chunk fed to the digests.
    fn on_bytes_hashed(&mut self, bytes: u64);

    /// Called when a file has been examined.
    fn on_file_complete(&mut self, path: &Path);

    /// Called once after the last file.
    fn on_complete(&mut self);
}

/// Progress callback that ignores every update.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_file_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_hashed(&mut self, _bytes: u64) {}

    fn on_file_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(name: &str, crc_match: bool, sha1_match: bool) -> Comparison {
        Comparison {
            entry_name: name.to_string(),
            expected_crc32: "8bb98613".to_string(),
            expected_sha1: "a02a05b025b928c039cf1ae7e8ee04e7c190c0db".to_string(),
            crc_match,
            sha1_match,
        }
    }

    #[test]
    fn test_full_match_needs_both_digests() {
        assert!(comparison("f", true, true).is_full_match());
        assert!(!comparison("f", true, false).is_full_match());
        assert!(!comparison("f", false, true).is_full_match());
    }

    #[test]
    fn test_no_entries_report() {
        let report = VerificationReport::no_entries();
        assert!(!report.is_match());
        assert_eq!(report.full_matches().count(), 0);
        assert_eq!(report.status.to_string(), "no manifest entries");
    }

    #[test]
    fn test_full_matches_lists_every_pair() {
        let report = VerificationReport {
            status: VerificationStatus::Verified,
            archive_members: vec!["a.rom".into(), "b.txt".into()],
            files: vec![
                FileReport {
                    path: PathBuf::from("a.rom"),
                    size: 4,
                    checksums: None,
                    comparisons: vec![comparison("f", true, true), comparison("g", false, false)],
                },
                FileReport {
                    path: PathBuf::from("b.txt"),
                    size: 9,
                    checksums: None,
                    comparisons: Vec::new(),
                },
            ],
            manifest_entries: 2,
        };

        let matches: Vec<_> = report
            .full_matches()
            .map(|(file, c)| (file.path.clone(), c.entry_name.clone()))
            .collect();
        assert_eq!(matches, vec![(PathBuf::from("a.rom"), "f".to_string())]);
        assert!(report.files[0].has_full_match());
        assert_eq!(report.unmatched_files().count(), 1);
    }
}
