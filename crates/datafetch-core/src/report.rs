//! Extraction reporting and progress callbacks.

use std::path::Path;
use std::time::Duration;

/// Report of one archive extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directory members created.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Compressed bytes consumed from the source stream.
    pub bytes_downloaded: u64,

    /// Members that were not extracted because of their kind.
    pub members_skipped: usize,

    /// Duration of the extraction pass.
    pub duration: Duration,

    /// Warnings generated during extraction.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Number of members successfully extracted (files plus directories).
    #[must_use]
    pub fn extracted_count(&self) -> usize {
        self.files_extracted + self.directories_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Sink for progress updates during fetch and extraction.
///
/// Passed explicitly into each operation so output stays under the
/// caller's control.
///
/// # Examples
///
/// ```
/// use datafetch_core::ProgressCallback;
/// use std::path::Path;
///
/// struct Printer;
///
/// impl ProgressCallback for Printer {
///     fn on_download_start(&mut self, url: &str, _content_length: Option<u64>) {
///         println!("GET {url}");
///     }
///
///     fn on_entry_start(&mut self, path: &Path, current: usize) {
///         println!("{current}: {}", path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called once the server accepted the request, before any extraction.
    fn on_download_start(&mut self, url: &str, content_length: Option<u64>);

    /// Called when starting to extract a member.
    ///
    /// `current` is the 1-indexed position of the member in the archive.
    fn on_entry_start(&mut self, path: &Path, current: usize);

    /// Called when bytes of a regular file have been written.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when a member has been extracted.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called when the whole archive has been extracted.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_download_start(&mut self, _url: &str, _content_length: Option<u64>) {}

    fn on_entry_start(&mut self, _path: &Path, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report() {
        let report = ExtractionReport::new();
        assert_eq!(report.extracted_count(), 0);
        assert_eq!(report.bytes_written, 0);
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_add_warning() {
        let mut report = ExtractionReport::new();
        report.add_warning("skipped symlink: link");
        assert!(report.has_warnings());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_extracted_count() {
        let report = ExtractionReport {
            files_extracted: 10,
            directories_created: 5,
            members_skipped: 2,
            ..ExtractionReport::default()
        };
        assert_eq!(report.extracted_count(), 15);
    }
}
