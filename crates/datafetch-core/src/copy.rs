//! Buffered copy from an archive member into a file.
//!
//! Read and write failures are told apart here: a failing read means the
//! archive stream is broken (or was cancelled), a failing write means the
//! destination is.

use std::io::Read;
use std::io::Write;
use std::io::{self};
use std::path::Path;

use crate::FetchError;
use crate::ProgressCallback;
use crate::Result;

/// I/O buffer size (64KB), matching typical filesystem block sizes.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable heap buffer shared by every member of one extraction pass.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `reader` into `writer`, reporting each chunk to `progress`.
///
/// `path` is the destination used in `WriteFailure` diagnostics.
///
/// # Errors
///
/// - `FetchError::CorruptArchive` if reading the member fails
/// - `FetchError::WriteFailure` if writing fails
pub fn copy_member<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    path: &Path,
    progress: &mut dyn ProgressCallback,
) -> Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FetchError::corrupt(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(|e| FetchError::write_failure(path, e))?;

        total = total.saturating_add(bytes_read as u64);
        progress.on_bytes_written(bytes_read as u64);
    }

    Ok(total)
}
