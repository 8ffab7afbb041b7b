//! Counting reader for tracking bytes consumed from a stream.

use std::io::Read;

/// Wrapper reader that tracks total bytes read.
///
/// Sits between the network body and the gzip decoder so the report can
/// state how many compressed bytes were downloaded.
///
/// # Examples
///
/// ```
/// use datafetch_core::io::CountingReader;
/// use std::io::Read;
///
/// let mut reader = CountingReader::new(&b"Hello, World!"[..]);
/// let mut out = String::new();
/// reader.read_to_string(&mut out)?;
/// assert_eq!(reader.total_bytes(), 13);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct CountingReader<R> {
    inner: R,
    bytes_read: u64,
}

impl<R> CountingReader<R> {
    /// Creates a new counting reader.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
        }
    }

    /// Returns the total number of bytes successfully read.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_read
    }

    /// Consumes the counting reader and returns the inner reader.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let bytes = self.inner.read(buf)?;
        self.bytes_read += bytes as u64;
        Ok(bytes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_counting_reader_partial_reads() {
        let mut reader = CountingReader::new(Cursor::new(vec![7u8; 100]));
        let mut buf = [0u8; 30];

        assert_eq!(reader.read(&mut buf).unwrap(), 30);
        assert_eq!(reader.total_bytes(), 30);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(reader.total_bytes(), 100);
        assert_eq!(rest.len(), 70);
    }

    #[test]
    fn test_counting_reader_empty() {
        let mut reader = CountingReader::new(std::io::empty());
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(reader.total_bytes(), 0);
    }

    #[test]
    fn test_into_inner() {
        let reader = CountingReader::new(Cursor::new(vec![1u8, 2, 3]));
        let inner = reader.into_inner();
        assert_eq!(inner.get_ref().len(), 3);
    }
}
