//! Test utilities: in-memory archives, a one-shot HTTP server and fakes.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::io::BufRead;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::FetchError;
use crate::Result;
use crate::fetch::Download;
use crate::fetch::Fetcher;
use crate::source::VcsClient;

/// Builder for in-memory tar.gz archives.
///
/// Member names are written into the header verbatim, so names a normal
/// archiver would refuse (`../x`, `/etc/passwd`) can be produced.
///
/// # Examples
///
/// ```
/// use datafetch_core::test_utils::TarGzBuilder;
///
/// let data = TarGzBuilder::new()
///     .add_directory("dataset/")
///     .add_file("dataset/file.txt", b"content")
///     .add_raw_name_file("../escape.txt", b"nope")
///     .build();
/// assert!(!data.is_empty());
/// ```
pub struct TarGzBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarGzBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file with mode 0o644.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.append(path, tar::EntryType::Regular, 0o644, data, None)
    }

    /// Adds a regular file with a custom mode.
    #[must_use]
    pub fn add_file_with_mode(self, path: &str, data: &[u8], mode: u32) -> Self {
        self.append(path, tar::EntryType::Regular, mode, data, None)
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.append(path, tar::EntryType::Directory, 0o755, &[], None)
    }

    /// Adds a symlink pointing at `target`.
    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        self.append(path, tar::EntryType::Symlink, 0o777, &[], Some(target))
    }

    /// Adds a hardlink pointing at `target`.
    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        self.append(path, tar::EntryType::Link, 0o644, &[], Some(target))
    }

    /// Adds a regular file whose name may be absolute or contain `..`.
    #[must_use]
    pub fn add_raw_name_file(self, name: &str, data: &[u8]) -> Self {
        self.add_file(name, data)
    }

    /// Returns the uncompressed tar bytes.
    #[must_use]
    pub fn build_tar(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }

    /// Returns the gzip-compressed tar bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let tar = self.build_tar();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar).unwrap();
        encoder.finish().unwrap()
    }

    fn append(
        mut self,
        name: &str,
        entry_type: tar::EntryType,
        mode: u32,
        data: &[u8],
        link: Option<&str>,
    ) -> Self {
        let mut header = tar::Header::new_gnu();
        let raw = name.as_bytes();
        let slot = &mut header.as_old_mut().name;
        assert!(raw.len() < slot.len(), "test member name too long: {name}");
        slot[..raw.len()].copy_from_slice(raw);

        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_entry_type(entry_type);
        if let Some(target) = link {
            header.set_link_name(target).unwrap();
        }
        header.set_cksum();

        self.builder.append(&header, data).unwrap();
        self
    }
}

impl Default for TarGzBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serves one canned HTTP response on a loopback port.
///
/// Returns an `http://127.0.0.1:<port>/archive.tgz` URL. The server
/// thread answers the first request and exits.
#[must_use]
pub fn serve_once(status: u16, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).is_ok_and(|n| n > 0) {
            if line == "\r\n" {
                break;
            }
            line.clear();
        }

        let reason = if status == 200 { "OK" } else { "Test" };
        let mut response = format!("HTTP/1.1 {status} {reason}\r\nConnection: close\r\n");
        if status != 204 {
            response.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        response.push_str("\r\n");

        let mut stream = stream;
        let _ = stream.write_all(response.as_bytes());
        if status != 204 {
            let _ = stream.write_all(&body);
        }
        let _ = stream.flush();
    });

    format!("http://{addr}/archive.tgz")
}

/// Serves a `200` response that announces all of `body` but sends only
/// its first `sent` bytes, then stalls.
///
/// The connection stays open until the client goes away or 30 seconds
/// pass, so a reader without a timeout blocks on it.
#[must_use]
pub fn serve_stalled(body: Vec<u8>, sent: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).is_ok_and(|n| n > 0) {
            if line == "\r\n" {
                break;
            }
            line.clear();
        }

        let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", body.len());
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&body[..sent.min(body.len())]);
        let _ = stream.flush();

        let _ = stream.set_read_timeout(Some(Duration::from_secs(30)));
        let _ = stream.read(&mut [0u8; 1]);
    });

    format!("http://{addr}/archive.tgz")
}

/// In-memory [`Fetcher`] returning a fixed response and counting calls.
pub struct FakeFetcher {
    response: std::result::Result<Vec<u8>, u16>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    /// Answers every request with `200` and `body`.
    #[must_use]
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            response: Ok(body),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers every request with `HttpError { status_code }`.
    #[must_use]
    pub fn status(status_code: u16) -> Self {
        Self {
            response: Err(status_code),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for FakeFetcher {
    type Body = Cursor<Vec<u8>>;

    fn fetch(&self, url: &str) -> Result<Download<Self::Body>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(body) => Ok(Download {
                url: url.to_string(),
                content_length: Some(body.len() as u64),
                body: Cursor::new(body.clone()),
            }),
            Err(status_code) => Err(FetchError::HttpError {
                url: url.to_string(),
                status_code: *status_code,
            }),
        }
    }
}

/// [`VcsClient`] that records clone requests instead of running git.
pub struct RecordingVcs {
    failure: Option<String>,
    clones: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingVcs {
    /// Every clone succeeds.
    #[must_use]
    pub fn succeeding() -> Self {
        Self {
            failure: None,
            clones: Mutex::new(Vec::new()),
        }
    }

    /// Every clone fails with `output`.
    #[must_use]
    pub fn failing(output: &str) -> Self {
        Self {
            failure: Some(output.to_string()),
            clones: Mutex::new(Vec::new()),
        }
    }

    /// Recorded `(source_ref, destination)` pairs.
    #[must_use]
    pub fn clones(&self) -> Vec<(String, PathBuf)> {
        self.clones.lock().unwrap().clone()
    }
}

impl VcsClient for RecordingVcs {
    fn clone_into(&self, source_ref: &str, destination: &Path) -> Result<String> {
        self.clones
            .lock()
            .unwrap()
            .push((source_ref.to_string(), destination.to_path_buf()));

        match &self.failure {
            Some(output) => Err(FetchError::CloneFailed {
                source_ref: source_ref.to_string(),
                output: output.clone(),
            }),
            None => Ok(format!("Cloning into '{}'...", destination.display())),
        }
    }
}
