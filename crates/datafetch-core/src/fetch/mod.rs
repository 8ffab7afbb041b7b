//! Remote retrieval of archive streams.
//!
//! A [`Fetcher`] turns a URL into a readable body. The body is never
//! buffered: it is handed straight to the extractor and consumed once.

mod http;

use std::io::Read;

use tracing::info;

pub use http::HttpFetcher;

use crate::ExtractionReport;
use crate::FetchError;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::ArchiveStreamExtractor;
use crate::io::CancelToken;
use crate::io::CancellableReader;
use crate::types::DestDir;

/// A successful response whose body has not been read yet.
#[derive(Debug)]
pub struct Download<B> {
    /// The URL that was requested.
    pub url: String,
    /// Declared length of the body, when the server sent one.
    pub content_length: Option<u64>,
    /// The unread response body.
    pub body: B,
}

/// Source of archive byte streams.
///
/// Implementations return `Ok` only for a successful response (HTTP 200
/// for [`HttpFetcher`]). Anything else is reported as an error and the
/// connection is released before returning.
pub trait Fetcher {
    /// Readable body type.
    type Body: Read + Send + 'static;

    /// Starts retrieving `url`.
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` if `url` cannot be parsed
    /// - `HttpError` for a non-success status
    /// - `TransportError` if no response was received
    fn fetch(&self, url: &str) -> Result<Download<Self::Body>>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    type Body = F::Body;

    fn fetch(&self, url: &str) -> Result<Download<Self::Body>> {
        (**self).fetch(url)
    }
}

/// Fetches `url` and streams the body into `extractor` below `dest`.
///
/// When a cancel token is given the body is wrapped so a cancellation
/// surfaces as a failed read inside the extractor; such a read failure is
/// reported as `Cancelled`. Other decoding failures name `url`.
pub(crate) fn download_and_extract<F: Fetcher>(
    fetcher: &F,
    extractor: &ArchiveStreamExtractor,
    url: &str,
    dest: &DestDir,
    cancel: Option<&CancelToken>,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let download = fetcher.fetch(url)?;
    info!(
        url = %download.url,
        content_length = ?download.content_length,
        destination = %dest.as_path().display(),
        "downloading and extracting"
    );
    progress.on_download_start(&download.url, download.content_length);

    let result = match cancel {
        Some(token) => extractor.extract(
            CancellableReader::new(download.body, token.clone()),
            dest,
            progress,
        ),
        None => extractor.extract(download.body, dest, progress),
    };

    let cancelled = cancel.is_some_and(CancelToken::is_cancelled);
    result.map_err(|err| attribute_failure(err, &download.url, cancelled))
}

/// Ties a read-side extraction failure to the download that caused it.
///
/// Only `CorruptArchive` is rewritten: a security violation or a failed
/// write is reported as is even when a cancellation raced with it.
fn attribute_failure(err: FetchError, url: &str, cancelled: bool) -> FetchError {
    match err {
        FetchError::CorruptArchive { .. } if cancelled => FetchError::Cancelled {
            url: url.to_string(),
        },
        FetchError::CorruptArchive { reason } => FetchError::CorruptArchive {
            reason: format!("{reason} (downloaded from {url})"),
        },
        other => other,
    }
}
