//! Error conversion utilities for CLI.
//!
//! Converts datafetch-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use datafetch_core::FetchError;

/// Converts `FetchError` to a user-friendly anyhow error with context.
pub fn convert_fetch_error(err: FetchError) -> anyhow::Error {
    match err {
        FetchError::HttpError { url, status_code } => anyhow!(
            "Error retrieving data from {url}: HTTP status {status_code}\n\
             HINT: Check that the URL is still published; nothing was extracted."
        ),
        FetchError::TransportError { url, cause } => anyhow!(
            "Could not reach {url}: {cause}\n\
             HINT: Check your network connection or raise --connect-timeout."
        ),
        FetchError::UnsafeArchiveMember { member_name } => anyhow!(
            "Security violation: archive member '{member_name}' resolves outside the destination\n\
             HINT: The archive may be malicious. Extraction stopped; members written before it were kept."
        ),
        FetchError::Cancelled { url } => anyhow!(
            "Download of {url} interrupted\n\
             HINT: Files extracted before the interruption were kept; remove them before retrying."
        ),
        FetchError::CorruptArchive { reason } => anyhow!(
            "Invalid archive: {reason}\n\
             HINT: The download may be truncated or the server returned something other than a tar.gz."
        ),
        FetchError::InvalidDestination { path, reason } => anyhow!(
            "Invalid destination '{}': {reason}\n\
             HINT: Create the directory first or set GEOIPS_TESTDATA_DIR to an existing directory.",
            path.display()
        ),
        FetchError::UnsupportedSourceKind { reference } => anyhow!(
            "Cannot handle '{reference}'\n\
             HINT: Supported references: git repositories (*.git, git@…) and .tgz/.tar.gz URLs."
        ),
        FetchError::UnknownDataset { name } => anyhow!(
            "Unknown dataset '{name}'\n\
             HINT: Run `datafetch datasets` to list installable datasets."
        ),
        FetchError::CloneFailed { source_ref, output } => anyhow!(
            "Failed to clone repository {source_ref}:\n{}",
            output.trim_end()
        ),
        err @ (FetchError::InvalidUrl { .. }
        | FetchError::WriteFailure { .. }
        | FetchError::InvalidPlugin { .. }) => anyhow::Error::from(err),
    }
}

/// Converts the error arm of a core result.
pub fn add_fetch_context<T>(result: datafetch_core::Result<T>) -> anyhow::Result<T> {
    result.map_err(convert_fetch_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_convert_http_error() {
        let converted = convert_fetch_error(FetchError::HttpError {
            url: "https://example.com/x.tgz".into(),
            status_code: 404,
        });
        let msg = format!("{converted:?}");
        assert!(msg.contains("https://example.com/x.tgz"));
        assert!(msg.contains("404"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_unsafe_member() {
        let converted = convert_fetch_error(FetchError::UnsafeArchiveMember {
            member_name: "../../etc/passwd".into(),
        });
        let msg = format!("{converted:?}");
        assert!(msg.contains("Security violation"));
        assert!(msg.contains("../../etc/passwd"));
    }

    #[test]
    fn test_convert_cancelled() {
        let converted = convert_fetch_error(FetchError::Cancelled {
            url: "https://example.com/x.tgz".into(),
        });
        let msg = format!("{converted:?}");
        assert!(msg.contains("interrupted"));
        assert!(msg.contains("https://example.com/x.tgz"));
        assert!(!msg.contains("Invalid archive"));
    }

    #[test]
    fn test_write_failure_keeps_source_chain() {
        let converted = convert_fetch_error(FetchError::WriteFailure {
            path: "/data/x".into(),
            cause: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        });
        let msg = format!("{converted:?}");
        assert!(msg.contains("/data/x"));
        assert!(msg.contains("denied"));
    }
}
