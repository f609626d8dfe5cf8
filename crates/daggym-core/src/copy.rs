//! Buffered copy used when writing extracted members to disk.

use std::io;
use std::io::Read;
use std::io::Write;

/// Buffer size for member extraction (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable heap buffer shared by every member of one extraction.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Vec<u8>,
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `reader` into `writer` through `buffer`, returning bytes copied.
///
/// Interrupted reads are retried. The byte count uses checked arithmetic so a
/// hostile stream cannot wrap it.
pub fn copy_with_buffer<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> io::Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;

        total = total
            .checked_add(bytes_read as u64)
            .ok_or_else(|| io::Error::other("copied byte count overflowed u64"))?;
    }

    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_copy_buffer_size() {
        assert_eq!(CopyBuffer::new().size(), 64 * 1024);
    }

    #[test]
    fn test_copy_empty() {
        let mut buffer = CopyBuffer::new();
        let mut out = Vec::new();
        let n = copy_with_buffer(&mut Cursor::new(Vec::new()), &mut out, &mut buffer).unwrap();
        assert_eq!(n, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_copy_larger_than_buffer_is_byte_exact() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
        let mut buffer = CopyBuffer::new();
        let mut out = Vec::new();
        let n = copy_with_buffer(&mut Cursor::new(data.clone()), &mut out, &mut buffer).unwrap();
        assert_eq!(n, 200_000);
        assert_eq!(out, data);
    }

    #[test]
    fn test_write_error_propagates() {
        struct FullDisk;
        impl Write for FullDisk {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("no space left on device"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut buffer = CopyBuffer::new();
        let err = copy_with_buffer(&mut Cursor::new(vec![1u8; 10]), &mut FullDisk, &mut buffer)
            .unwrap_err();
        assert!(err.to_string().contains("no space"));
    }
}
