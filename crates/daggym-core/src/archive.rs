//! Archive extraction into the scratch directory.
//!
//! ZIP is the format ROM sets ship in; plain and gzip-compressed tar are
//! accepted as well. The format is sniffed from the file's leading bytes,
//! not its extension.

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use flate2::read::GzDecoder;

use crate::Result;
use crate::VerifyError;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;

/// Bytes needed to recognise every supported format (tar magic ends at 262).
const SNIFF_LEN: usize = 262;

/// Archive container formats understood by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// ZIP archive.
    Zip,
    /// Uncompressed tar archive.
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zip => write!(f, "zip"),
            Self::Tar => write!(f, "tar"),
            Self::TarGz => write!(f, "tar.gz"),
        }
    }
}

/// What an extraction wrote to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Detected container format.
    pub format: ArchiveFormat,

    /// Member names in archive order, directories included.
    pub members: Vec<String>,

    /// Number of regular files written.
    pub files_written: usize,

    /// Number of directory members created.
    pub directories_created: usize,

    /// Total bytes written.
    pub bytes_written: u64,
}

impl ExtractionSummary {
    fn new(format: ArchiveFormat) -> Self {
        Self {
            format,
            members: Vec::new(),
            files_written: 0,
            directories_created: 0,
            bytes_written: 0,
        }
    }
}

/// Determines the archive format from the leading bytes of `path`.
///
/// # Errors
///
/// Returns [`VerifyError::Archive`] if the file cannot be read or is not a
/// recognised archive.
pub fn detect_format(path: &Path) -> Result<ArchiveFormat> {
    let mut file = File::open(path).map_err(|e| {
        VerifyError::Archive(format!("cannot open '{}': {e}", path.display()))
    })?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    Read::by_ref(&mut file)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .map_err(|e| VerifyError::Archive(format!("cannot read '{}': {e}", path.display())))?;

    sniff(&head).ok_or_else(|| {
        VerifyError::Archive(format!(
            "'{}' is not a recognised archive (expected zip, tar or tar.gz)",
            path.display()
        ))
    })
}

fn sniff(head: &[u8]) -> Option<ArchiveFormat> {
    const ZIP_MAGICS: [&[u8]; 3] = [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];

    if ZIP_MAGICS.iter().any(|magic| head.starts_with(magic)) {
        Some(ArchiveFormat::Zip)
    } else if head.starts_with(&[0x1f, 0x8b]) {
        Some(ArchiveFormat::TarGz)
    } else if head.get(257..262) == Some(b"ustar".as_slice()) {
        Some(ArchiveFormat::Tar)
    } else {
        None
    }
}

/// Extracts every member of `archive_path` into `scratch_dir`.
///
/// The scratch directory is created if absent. Existing files with the same
/// names are overwritten; nothing else in the directory is touched.
///
/// # Errors
///
/// Returns [`VerifyError::Archive`] if the archive is corrupt or
/// unrecognised, if a member name would escape the scratch directory, or if
/// any member cannot be written.
pub fn extract_archive(archive_path: &Path, scratch_dir: &Path) -> Result<ExtractionSummary> {
    let format = detect_format(archive_path)?;

    create_dir_all(scratch_dir).map_err(|e| {
        VerifyError::Archive(format!(
            "cannot create scratch directory '{}': {e}",
            scratch_dir.display()
        ))
    })?;

    let file = File::open(archive_path).map_err(|e| {
        VerifyError::Archive(format!("cannot open '{}': {e}", archive_path.display()))
    })?;
    let reader = BufReader::new(file);

    let summary = match format {
        ArchiveFormat::Zip => extract_zip(reader, scratch_dir)?,
        ArchiveFormat::Tar => extract_tar(reader, format, scratch_dir)?,
        ArchiveFormat::TarGz => extract_tar(GzDecoder::new(reader), format, scratch_dir)?,
    };

    tracing::info!(
        archive = %archive_path.display(),
        format = %summary.format,
        members = ?summary.members,
        "files in the archive"
    );
    Ok(summary)
}

fn extract_zip<R: Read + Seek>(reader: R, dest: &Path) -> Result<ExtractionSummary> {
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| VerifyError::Archive(format!("invalid zip archive: {e}")))?;
    let mut summary = ExtractionSummary::new(ArchiveFormat::Zip);
    let mut buffer = CopyBuffer::new();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| VerifyError::Archive(format!("cannot read zip member {index}: {e}")))?;
        let name = entry.name().to_string();
        let relative = entry.enclosed_name().ok_or_else(|| escape_error(&name))?;
        let output_path = dest.join(relative);

        if entry.is_dir() {
            create_member_dir(&output_path, &name)?;
            summary.directories_created += 1;
        } else {
            summary.bytes_written += write_member(&mut entry, &output_path, &name, &mut buffer)?;
            summary.files_written += 1;
        }
        summary.members.push(name);
    }

    Ok(summary)
}

fn extract_tar<R: Read>(
    reader: R,
    format: ArchiveFormat,
    dest: &Path,
) -> Result<ExtractionSummary> {
    let mut archive = tar::Archive::new(reader);
    let mut summary = ExtractionSummary::new(format);
    let mut buffer = CopyBuffer::new();

    let entries = archive
        .entries()
        .map_err(|e| VerifyError::Archive(format!("failed to read tar entries: {e}")))?;

    for entry_result in entries {
        let mut entry = entry_result
            .map_err(|e| VerifyError::Archive(format!("failed to read tar entry: {e}")))?;
        let raw_path = entry
            .path()
            .map_err(|e| VerifyError::Archive(format!("invalid member path: {e}")))?
            .into_owned();
        let name = raw_path.to_string_lossy().into_owned();
        let relative = enclosed_path(&raw_path).ok_or_else(|| escape_error(&name))?;
        let entry_type = entry.header().entry_type();

        // `./` names the scratch directory itself.
        if relative.as_os_str().is_empty() {
            if !entry_type.is_dir() {
                return Err(escape_error(&name));
            }
            summary.members.push(name);
            continue;
        }
        let output_path = dest.join(relative);

        match entry_type {
            tar::EntryType::Directory => {
                create_member_dir(&output_path, &name)?;
                summary.directories_created += 1;
            }
            tar::EntryType::Regular | tar::EntryType::Continuous => {
                summary.bytes_written +=
                    write_member(&mut entry, &output_path, &name, &mut buffer)?;
                summary.files_written += 1;
            }
            other => {
                tracing::debug!(member = %name, kind = ?other, "skipping non-regular tar member");
            }
        }
        summary.members.push(name);
    }

    Ok(summary)
}

/// Normalises an archive member path, rejecting absolute paths and `..`.
///
/// A path made only of `.` components normalises to the empty path.
fn enclosed_path(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

fn escape_error(name: &str) -> VerifyError {
    VerifyError::Archive(format!(
        "member '{name}' would be written outside the scratch directory"
    ))
}

fn create_member_dir(path: &Path, name: &str) -> Result<()> {
    create_dir_all(path)
        .map_err(|e| VerifyError::Archive(format!("cannot create directory for '{name}': {e}")))
}

fn write_member<R: Read>(
    reader: &mut R,
    output_path: &Path,
    name: &str,
    buffer: &mut CopyBuffer,
) -> Result<u64> {
    let write_error = |e: std::io::Error| VerifyError::Archive(format!("failed to extract '{name}': {e}"));

    if let Some(parent) = output_path.parent() {
        create_dir_all(parent).map_err(write_error)?;
    }

    let file = File::create(output_path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    let written = copy_with_buffer(reader, &mut writer, buffer).map_err(write_error)?;
    writer.flush().map_err(write_error)?;

    tracing::debug!(member = %name, bytes = written, "extracted member");
    Ok(written)
}
