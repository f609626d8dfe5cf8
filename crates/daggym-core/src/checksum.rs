//! CRC-32 and SHA-1 digests over files and readers.
//!
//! Everything here reads its input incrementally so memory use stays bounded
//! for large ROM images. The digests do not depend on the chunk size.

use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

use flate2::Crc;
use sha1::Digest;
use sha1::Sha1;

use crate::config::DEFAULT_CHUNK_SIZE;

/// CRC-32 and SHA-1 of the same byte stream, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksums {
    /// CRC-32 (IEEE 802.3), exactly 8 hex digits.
    pub crc32: String,
    /// SHA-1, exactly 40 hex digits.
    pub sha1: String,
}

/// Formats a CRC-32 value as 8 zero-padded lowercase hex digits.
#[must_use]
pub fn format_crc32(value: u32) -> String {
    format!("{value:08x}")
}

/// Computes the CRC-32 of everything `reader` yields.
pub fn crc32_reader<R: Read>(reader: &mut R, chunk_size: usize) -> io::Result<String> {
    let mut crc = Crc::new();
    for_each_chunk(reader, chunk_size, |chunk| crc.update(chunk))?;
    Ok(format_crc32(crc.sum()))
}

/// Computes the SHA-1 of everything `reader` yields.
pub fn sha1_reader<R: Read>(reader: &mut R, chunk_size: usize) -> io::Result<String> {
    let mut hasher = Sha1::new();
    for_each_chunk(reader, chunk_size, |chunk| hasher.update(chunk))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Computes both digests in a single pass over `reader`.
pub fn checksum_reader<R: Read>(reader: &mut R, chunk_size: usize) -> io::Result<Checksums> {
    checksum_reader_with_progress(reader, chunk_size, |_| {})
}

/// Like [`checksum_reader`], calling `on_chunk` with each chunk's length.
pub fn checksum_reader_with_progress<R, F>(
    reader: &mut R,
    chunk_size: usize,
    mut on_chunk: F,
) -> io::Result<Checksums>
where
    R: Read,
    F: FnMut(u64),
{
    let mut crc = Crc::new();
    let mut hasher = Sha1::new();
    for_each_chunk(reader, chunk_size, |chunk| {
        crc.update(chunk);
        hasher.update(chunk);
        on_chunk(chunk.len() as u64);
    })?;
    Ok(Checksums {
        crc32: format_crc32(crc.sum()),
        sha1: hex::encode(hasher.finalize()),
    })
}

/// CRC-32 of a file, read in 8 KiB chunks.
pub fn crc32_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    crc32_reader(&mut file, DEFAULT_CHUNK_SIZE)
}

/// SHA-1 of a file, read in 8 KiB chunks.
pub fn sha1_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    sha1_reader(&mut file, DEFAULT_CHUNK_SIZE)
}

/// CRC-32 and SHA-1 of a file in one pass.
pub fn checksum_file(path: &Path, chunk_size: usize) -> io::Result<Checksums> {
    let mut file = File::open(path)?;
    checksum_reader(&mut file, chunk_size)
}

fn for_each_chunk<R, F>(reader: &mut R, chunk_size: usize, mut f: F) -> io::Result<()>
where
    R: Read,
    F: FnMut(&[u8]),
{
    let size = if chunk_size == 0 {
        DEFAULT_CHUNK_SIZE
    } else {
        chunk_size
    };
    let mut buf = vec![0u8; size];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        f(&buf[..n]);
    }
}
