//! Cooperative cancellation of a blocking stream.
//!
//! A blocking socket read cannot be interrupted from another thread, so
//! [`CancellableReader`] moves the reads onto a pump thread and waits on
//! its channel with a short timeout, checking the token between waits.

use std::io::Read;
use std::io::{self};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::mpsc::SyncSender;
use std::sync::mpsc::sync_channel;
use std::thread;
use std::time::Duration;

/// How long a read waits for the pump before re-checking the token.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Size of one chunk handed over by the pump.
const CHUNK_SIZE: usize = 64 * 1024;

/// Chunks buffered ahead of the consumer.
const CHANNEL_DEPTH: usize = 4;

/// Shared flag requesting that an in-flight download stop.
///
/// Clones observe the same flag, so one clone can be handed to a signal
/// handler while another guards the stream.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Reader that fails every read after its token is cancelled, including a
/// read already waiting on a stalled source.
///
/// On cancellation the channel is dropped. The pump then drops the inner
/// reader (closing the connection) as soon as its pending read returns.
pub struct CancellableReader {
    chunks: Option<Receiver<io::Result<Vec<u8>>>>,
    pending: Vec<u8>,
    pos: usize,
    token: CancelToken,
}

impl CancellableReader {
    /// Wraps `inner`, observing `token`.
    #[must_use]
    pub fn new<R>(inner: R, token: CancelToken) -> Self
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = sync_channel(CHANNEL_DEPTH);
        thread::spawn(move || pump(inner, &tx));

        Self {
            chunks: Some(rx),
            pending: Vec::new(),
            pos: 0,
            token,
        }
    }
}

fn cancelled() -> io::Error {
    io::Error::other("download cancelled")
}

fn pump<R: Read>(mut inner: R, tx: &SyncSender<io::Result<Vec<u8>>>) {
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        match inner.read(&mut buf) {
            // dropping `tx` is the end-of-stream signal
            Ok(0) => return,
            Ok(n) => {
                if tx.send(Ok(buf[..n].to_vec())).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}

impl Read for CancellableReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.token.is_cancelled() {
                self.chunks = None;
                return Err(cancelled());
            }

            if self.pos < self.pending.len() {
                let n = buf.len().min(self.pending.len() - self.pos);
                buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }

            let Some(chunks) = self.chunks.as_ref() else {
                return Err(cancelled());
            };
            match chunks.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(chunk)) => {
                    self.pending = chunk;
                    self.pos = 0;
                }
                Ok(Err(e)) => return Err(e),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;
    use std::time::Instant;

    /// Blocks on every read until its sender is dropped.
    struct StalledReader(mpsc::Receiver<()>);

    impl Read for StalledReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[test]
    fn test_reads_whole_stream() {
        let data: Vec<u8> = (0..=255u8).cycle().take(CHUNK_SIZE * 2 + 17).collect();
        let mut reader = CancellableReader::new(Cursor::new(data.clone()), CancelToken::new());

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_reads_until_cancelled() {
        let token = CancelToken::new();
        let mut reader = CancellableReader::new(Cursor::new(vec![1u8; 16]), token.clone());

        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 8);

        token.cancel();
        let err = reader.read(&mut buf).unwrap_err();
        assert!(err.to_string().contains("cancelled"));
        assert!(reader.chunks.is_none());
    }

    #[test]
    fn test_cancel_unblocks_stalled_read() {
        let (hold, stall) = mpsc::channel();
        let token = CancelToken::new();
        let mut reader = CancellableReader::new(StalledReader(stall), token.clone());

        let canceller = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            canceller.cancel();
        });

        let started = Instant::now();
        let mut buf = [0u8; 8];
        let err = reader.read(&mut buf).unwrap_err();
        assert!(err.to_string().contains("cancelled"));
        assert!(started.elapsed() < Duration::from_secs(5));

        drop(hold);
    }

    #[test]
    fn test_inner_error_is_forwarded() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }

        let mut reader = CancellableReader::new(Broken, CancelToken::new());
        let err = reader.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }
}
