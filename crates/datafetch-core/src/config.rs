//! Configuration for fetching and extraction.

use std::time::Duration;

/// Default connection-establishment timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Network settings for [`crate::fetch::HttpFetcher`].
///
/// Only connection establishment is bounded by default: archives can be
/// many gigabytes, so the body read has no deadline unless one is set.
///
/// # Examples
///
/// ```
/// use datafetch_core::FetchConfig;
/// use std::time::Duration;
///
/// let config = FetchConfig::default().with_connect_timeout(Duration::from_secs(5));
/// assert_eq!(config.connect_timeout, Duration::from_secs(5));
/// assert!(config.read_timeout.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Maximum time to establish the TCP/TLS connection.
    pub connect_timeout: Duration,

    /// Maximum time for the whole response, `None` for unbounded.
    pub read_timeout: Option<Duration>,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: None,
            user_agent: concat!("datafetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    /// Sets the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets (or clears) the overall read timeout.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Extraction behaviour for [`crate::extraction::ArchiveStreamExtractor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Replace files that already exist under the destination.
    ///
    /// When `false` an existing file (or symlink) at a member's path
    /// fails the extraction with `WriteFailure`.
    pub overwrite: bool,

    /// Carry read/execute bits over from the archive.
    pub preserve_permissions: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            preserve_permissions: true,
        }
    }
}

impl ExtractConfig {
    /// Sets whether existing files may be replaced.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}
