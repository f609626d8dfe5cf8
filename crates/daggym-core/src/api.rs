//! High-level public API for ROM verification.

use std::path::Path;

use crate::InputKind;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::VerificationReport;
use crate::VerifyConfig;
use crate::VerifyError;
use crate::manifest::parse_manifest;
use crate::verify::verify_archive;

/// Verifies a ROM archive against a MAME software-list manifest.
///
/// This is the main entry point. The archive is extracted into
/// `config.scratch_dir` and every extracted file whose size matches a
/// manifest entry is compared on CRC-32 and SHA-1.
///
/// # Arguments
///
/// * `archive_path` - Path to the ROM archive (zip, tar or tar.gz)
/// * `manifest_path` - Path to the software-list XML
/// * `config` - Scratch directory and hashing settings
///
/// # Errors
///
/// Returns an error if:
/// - Either input path is missing or not a regular file (archive checked first)
/// - The manifest is malformed
/// - The archive is corrupt or cannot be extracted
/// - I/O operations fail
///
/// A mismatch is not an error; inspect [`VerificationReport::status`].
///
/// # Examples
///
/// ```no_run
/// use daggym_core::VerifyConfig;
/// use daggym_core::verify_rom;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = verify_rom(
///     "emu/roms/daggorath.zip",
///     "/usr/share/games/mame/hash/coco_cart.xml",
///     &VerifyConfig::default(),
/// )?;
/// println!("matched: {}", report.is_match());
/// # Ok(())
/// # }
/// ```
pub fn verify_rom<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    manifest_path: Q,
    config: &VerifyConfig,
) -> Result<VerificationReport> {
    let mut progress = NoopProgress;
    verify_rom_with_progress(archive_path, manifest_path, config, &mut progress)
}

/// Like [`verify_rom`], reporting hashing progress to `progress`.
///
/// # Errors
///
/// Same as [`verify_rom`].
pub fn verify_rom_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    manifest_path: Q,
    config: &VerifyConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<VerificationReport> {
    let archive_path = archive_path.as_ref();
    let manifest_path = manifest_path.as_ref();

    require_file(archive_path, InputKind::Archive)?;
    require_file(manifest_path, InputKind::Manifest)?;

    tracing::info!(archive = %archive_path.display(), "verifying ROM");
    tracing::info!(manifest = %manifest_path.display(), "using XML file");

    let manifest = parse_manifest(manifest_path)?;

    verify_archive(archive_path, &manifest, config, progress)
}

fn require_file(path: &Path, kind: InputKind) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(VerifyError::InputNotFound {
            kind,
            path: path.to_path_buf(),
        })
    }
}
