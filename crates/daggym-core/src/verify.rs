//! Matching extracted files against manifest entries.
//!
//! Candidates are selected by size alone. Digests are only computed for
//! files that have at least one same-size entry (or for every file when
//! [`VerifyConfig::hash_all_files`] is set), and at most once per file.

use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::Result;
use crate::VerifyConfig;
use crate::VerifyError;
use crate::archive::extract_archive;
use crate::checksum::Checksums;
use crate::checksum::checksum_reader_with_progress;
use crate::manifest::Manifest;
use crate::report::Comparison;
use crate::report::FileReport;
use crate::report::ProgressCallback;
use crate::report::VerificationReport;
use crate::report::VerificationStatus;

/// Extracts `archive_path` and checks its contents against `manifest`.
///
/// An empty manifest short-circuits to
/// [`VerificationStatus::NoManifestEntries`] before anything is extracted.
///
/// # Errors
///
/// Returns [`VerifyError::Archive`] if extraction fails and
/// [`VerifyError::Io`] if the scratch directory cannot be walked or an
/// extracted file cannot be read back.
pub fn verify_archive(
    archive_path: &Path,
    manifest: &Manifest,
    config: &VerifyConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<VerificationReport> {
    if manifest.is_empty() {
        tracing::warn!("no ROM information found in the manifest");
        progress.on_complete();
        return Ok(VerificationReport::no_entries());
    }

    let extraction = extract_archive(archive_path, &config.scratch_dir)?;
    let mut report = verify_extracted(&config.scratch_dir, manifest, config, progress)?;
    report.archive_members = extraction.members;
    Ok(report)
}

/// Checks every regular file under `scratch_dir` against `manifest`.
///
/// Files left over from earlier runs are examined too; the scratch directory
/// is never cleaned.
///
/// # Errors
///
/// Returns [`VerifyError::Io`] if the directory cannot be walked or a file
/// cannot be read.
pub fn verify_extracted(
    scratch_dir: &Path,
    manifest: &Manifest,
    config: &VerifyConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<VerificationReport> {
    let files = collect_files(scratch_dir)?;
    let total = files.len();
    let chunk_size = config.effective_chunk_size();
    let mut reports = Vec::with_capacity(total);

    for (index, relative) in files.into_iter().enumerate() {
        progress.on_file_start(&relative, total, index + 1);
        let full_path = scratch_dir.join(&relative);
        let size = std::fs::metadata(&full_path)?.len();

        let mut checksums: Option<Checksums> = None;
        let mut comparisons = Vec::new();

        for entry in manifest.entries_with_size(size) {
            if checksums.is_none() {
                checksums = Some(hash_file(&full_path, chunk_size, progress)?);
            }
            let Some(actual) = checksums.as_ref() else {
                continue;
            };

            let comparison = Comparison {
                entry_name: entry.name.clone(),
                expected_crc32: entry.expected_crc32.clone(),
                expected_sha1: entry.expected_sha1.clone(),
                crc_match: actual.crc32 == entry.expected_crc32,
                sha1_match: actual.sha1 == entry.expected_sha1,
            };

            tracing::info!(
                file = %relative.display(),
                entry = %comparison.entry_name,
                expected_crc = %comparison.expected_crc32,
                actual_crc = %actual.crc32,
                crc_match = comparison.crc_match,
                expected_sha1 = %comparison.expected_sha1,
                actual_sha1 = %actual.sha1,
                sha1_match = comparison.sha1_match,
                "{}",
                if comparison.is_full_match() { "SUCCESS" } else { "MISMATCH" }
            );
            comparisons.push(comparison);
        }

        if comparisons.is_empty() {
            tracing::warn!(
                file = %relative.display(),
                size,
                "no ROM entry in the manifest matches this file's size"
            );
            if config.hash_all_files {
                checksums = Some(hash_file(&full_path, chunk_size, progress)?);
            }
        }

        progress.on_file_complete(&relative);
        reports.push(FileReport {
            path: relative,
            size,
            checksums,
            comparisons,
        });
    }

    progress.on_complete();

    let matched = reports.iter().any(FileReport::has_full_match);
    Ok(VerificationReport {
        status: if matched {
            VerificationStatus::Verified
        } else {
            VerificationStatus::ChecksumMismatch
        },
        archive_members: Vec::new(),
        files: reports,
        manifest_entries: manifest.len(),
    })
}

fn hash_file(
    path: &Path,
    chunk_size: usize,
    progress: &mut dyn ProgressCallback,
) -> Result<Checksums> {
    let mut file = File::open(path)?;
    Ok(checksum_reader_with_progress(&mut file, chunk_size, |n| {
        progress.on_bytes_hashed(n);
    })?)
}

/// Regular files under `root`, relative to it, in sorted order.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            VerifyError::Io(std::io::Error::other(format!("walkdir error: {e}")))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path())
            .to_path_buf();
        files.push(relative);
    }
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use crate::manifest::ManifestEntry;
    use std::fs;
    use tempfile::TempDir;

    const F_CRC: &str = "8bb98613";
    const F_SHA1: &str = "a02a05b025b928c039cf1ae7e8ee04e7c190c0db";

    fn entry(name: &str, size: u64, crc: &str, sha1: &str) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            expected_size: size,
            expected_crc32: crc.to_string(),
            expected_sha1: sha1.to_string(),
        }
    }

    #[derive(Default)]
    struct Recording {
        started: Vec<PathBuf>,
        bytes: u64,
        completed: bool,
    }

    impl ProgressCallback for Recording {
        fn on_file_start(&mut self, path: &Path, _total: usize, _current: usize) {
            self.started.push(path.to_path_buf());
        }
        fn on_bytes_hashed(&mut self, bytes: u64) {
            self.bytes += bytes;
        }
        fn on_file_complete(&mut self, _path: &Path) {}
        fn on_complete(&mut self) {
            self.completed = true;
        }
    }

    #[test]
    fn test_exact_match_verifies() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.bin"), [0u8, 1, 2, 3]).unwrap();
        let manifest = Manifest::from_entries([entry("f", 4, F_CRC, F_SHA1)]);

        let report = verify_extracted(
            dir.path(),
            &manifest,
            &VerifyConfig::default(),
            &mut NoopProgress,
        )
        .unwrap();

        assert!(report.is_match());
        assert_eq!(report.full_matches().count(), 1);
        assert_eq!(report.manifest_entries, 1);
        assert_eq!(report.files[0].checksums.as_ref().unwrap().crc32, F_CRC);
    }

    #[test]
    fn test_every_same_size_entry_is_compared() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.bin"), [0u8, 1, 2, 3]).unwrap();
        let manifest = Manifest::from_entries([
            entry("a", 4, "00000000", F_SHA1),
            entry("b", 4, F_CRC, F_SHA1),
            entry("c", 5, F_CRC, F_SHA1),
        ]);

        let report = verify_extracted(
            dir.path(),
            &manifest,
            &VerifyConfig::default(),
            &mut NoopProgress,
        )
        .unwrap();

        let comparisons = &report.files[0].comparisons;
        assert_eq!(comparisons.len(), 2);
        assert!(!comparisons[0].crc_match);
        assert!(comparisons[0].sha1_match);
        assert!(comparisons[1].is_full_match());
        assert!(report.is_match());
    }

    #[test]
    fn test_sha1_difference_alone_is_mismatch() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.bin"), [0u8, 1, 2, 3]).unwrap();
        let manifest = Manifest::from_entries([entry("f", 4, F_CRC, &"0".repeat(40))]);

        let report = verify_extracted(
            dir.path(),
            &manifest,
            &VerifyConfig::default(),
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(report.status, VerificationStatus::ChecksumMismatch);
        assert!(report.files[0].comparisons[0].crc_match);
    }

    #[test]
    fn test_size_mismatch_skips_hashing_unless_requested() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("other.bin"), b"hello world").unwrap();
        let manifest = Manifest::from_entries([entry("f", 4, F_CRC, F_SHA1)]);

        let mut progress = Recording::default();
        let report =
            verify_extracted(dir.path(), &manifest, &VerifyConfig::default(), &mut progress)
                .unwrap();
        assert!(!report.is_match());
        assert!(report.files[0].checksums.is_none());
        assert_eq!(progress.bytes, 0);
        assert!(progress.completed);

        let config = VerifyConfig::default().with_hash_all_files(true);
        let report =
            verify_extracted(dir.path(), &manifest, &config, &mut NoopProgress).unwrap();
        assert_eq!(
            report.files[0].checksums.as_ref().unwrap().crc32,
            "0d4a1185"
        );
    }

    #[test]
    fn test_nested_files_sorted_and_hashed_once() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("z.bin"), [9u8; 4]).unwrap();
        fs::write(dir.path().join("sub/f.bin"), [0u8, 1, 2, 3]).unwrap();
        let manifest = Manifest::from_entries([
            entry("f", 4, F_CRC, F_SHA1),
            entry("g", 4, "deadbeef", F_SHA1),
        ]);

        let mut progress = Recording::default();
        let report =
            verify_extracted(dir.path(), &manifest, &VerifyConfig::default(), &mut progress)
                .unwrap();

        assert_eq!(
            progress.started,
            vec![PathBuf::from("sub/f.bin"), PathBuf::from("z.bin")]
        );
        assert_eq!(progress.bytes, 8);
        assert!(report.is_match());
    }

    #[test]
    fn test_empty_manifest_skips_extraction() {
        let dir = TempDir::new().unwrap();
        let scratch = dir.path().join("scratch");
        let config = VerifyConfig::default().with_scratch_dir(&scratch);

        let report = verify_archive(
            Path::new("/nonexistent/daggorath.zip"),
            &Manifest::new(),
            &config,
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(report.status, VerificationStatus::NoManifestEntries);
        assert!(!scratch.exists());
    }
}
