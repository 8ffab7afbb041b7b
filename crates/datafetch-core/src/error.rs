//! Error types for dataset acquisition and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `FetchError`.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while fetching, extracting or validating artifacts.
///
/// Every variant carries enough context (URL, status code, member name or
/// path) to diagnose the failure without re-running with extra logging.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a status other than 200.
    #[error("error retrieving data from {url}: HTTP status {status_code}")]
    HttpError {
        /// The requested URL.
        url: String,
        /// The HTTP status code returned by the server.
        status_code: u16,
    },

    /// DNS, connection or timeout failure before a response was received.
    #[error("transport error while requesting {url}: {cause}")]
    TransportError {
        /// The requested URL.
        url: String,
        /// Rendered source chain of the underlying failure.
        cause: String,
    },

    /// The URL could not be parsed.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The rejected URL text.
        url: String,
        /// Why parsing failed.
        reason: String,
    },

    /// An archive member would resolve outside the destination directory.
    #[error("unsafe archive member: {member_name}")]
    UnsafeArchiveMember {
        /// Raw member name as stored in the archive.
        member_name: String,
    },

    /// The stream is not a valid gzip/tar container or ended early.
    #[error("corrupt archive: {reason}")]
    CorruptArchive {
        /// Description of the decoding failure.
        reason: String,
    },

    /// The download was cancelled through a `CancelToken`.
    #[error("download of {url} cancelled")]
    Cancelled {
        /// The URL being downloaded.
        url: String,
    },

    /// Writing an extracted member failed.
    #[error("failed to write {path}: {cause}")]
    WriteFailure {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        cause: std::io::Error,
    },

    /// The destination root does not exist or is not a directory.
    #[error("invalid destination {path}: {reason}")]
    InvalidDestination {
        /// The rejected destination.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// The reference is neither a version-control URL nor a tar.gz URL.
    #[error("unsupported source kind: {reference}")]
    UnsupportedSourceKind {
        /// The reference that could not be classified.
        reference: String,
    },

    /// The dataset name is not in the catalog.
    #[error("unknown dataset: {name}")]
    UnknownDataset {
        /// The requested name.
        name: String,
    },

    /// The version-control client reported a failed clone.
    #[error("failed to clone {source_ref}: {output}")]
    CloneFailed {
        /// Repository reference passed to the client.
        source_ref: String,
        /// Captured diagnostic output of the client.
        output: String,
    },

    /// A plugin descriptor is missing attributes or was rejected.
    #[error("invalid plugin {path}: {reason}")]
    InvalidPlugin {
        /// Path of the plugin file.
        path: PathBuf,
        /// Why the plugin is invalid.
        reason: String,
    },
}

impl FetchError {
    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use datafetch_core::FetchError;
    ///
    /// let err = FetchError::UnsafeArchiveMember {
    ///     member_name: "../etc/passwd".into(),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = FetchError::HttpError {
    ///     url: "https://example.com/x.tgz".into(),
    ///     status_code: 404,
    /// };
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::UnsafeArchiveMember { .. })
    }

    /// Returns `true` if the failure happened before any byte was extracted.
    ///
    /// Retrieval failures leave the destination untouched, unlike extraction
    /// failures which may leave earlier members on disk.
    #[must_use]
    pub const fn is_retrieval_failure(&self) -> bool {
        matches!(
            self,
            Self::HttpError { .. } | Self::TransportError { .. } | Self::InvalidUrl { .. }
        )
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::HttpError { .. } => "HTTP_ERROR",
            Self::TransportError { .. } => "TRANSPORT_ERROR",
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::UnsafeArchiveMember { .. } => "UNSAFE_ARCHIVE_MEMBER",
            Self::CorruptArchive { .. } => "CORRUPT_ARCHIVE",
            Self::Cancelled { .. } => "CANCELLED",
            Self::WriteFailure { .. } => "WRITE_FAILURE",
            Self::InvalidDestination { .. } => "INVALID_DESTINATION",
            Self::UnsupportedSourceKind { .. } => "UNSUPPORTED_SOURCE_KIND",
            Self::UnknownDataset { .. } => "UNKNOWN_DATASET",
            Self::CloneFailed { .. } => "CLONE_FAILED",
            Self::InvalidPlugin { .. } => "INVALID_PLUGIN",
        }
    }

    /// Returns the HTTP status code, if this is an HTTP failure.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, cause: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            cause,
        }
    }

    pub(crate) fn corrupt(reason: impl std::fmt::Display) -> Self {
        Self::CorruptArchive {
            reason: reason.to_string(),
        }
    }
}
