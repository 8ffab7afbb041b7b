//! Ad-hoc retrieval from a version-control URL or a tar.gz URL.

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use tracing::info;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::FetchError;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::ArchiveStreamExtractor;
use crate::fetch::Fetcher;
use crate::fetch::download_and_extract;
use crate::io::CancelToken;
use crate::types::DestDir;

/// How a source reference is retrieved, decided once from its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Cloned with a version-control client.
    Git,
    /// Downloaded and extracted as a gzip-compressed tar.
    TarGz,
}

impl SourceKind {
    /// Classifies `reference`, ignoring any query string or fragment.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedSourceKind` for anything that is neither a git
    /// reference nor a `.tgz`/`.tar.gz` URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use datafetch_core::source::SourceKind;
    ///
    /// assert_eq!(
    ///     SourceKind::classify("https://github.com/NRLMMD-GEOIPS/geoips.git")?,
    ///     SourceKind::Git
    /// );
    /// assert_eq!(
    ///     SourceKind::classify("https://example.com/data.tgz?download=1")?,
    ///     SourceKind::TarGz
    /// );
    /// assert!(SourceKind::classify("https://example.com/data.zip").is_err());
    /// # Ok::<(), datafetch_core::FetchError>(())
    /// ```
    pub fn classify(reference: &str) -> Result<Self> {
        let trimmed = reference.trim();
        let location = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or(trimmed)
            .trim_end_matches('/')
            .to_ascii_lowercase();

        if location.starts_with("git@")
            || location.starts_with("git://")
            || location.ends_with(".git")
        {
            Ok(Self::Git)
        } else if location.ends_with(".tgz") || location.ends_with(".tar.gz") {
            Ok(Self::TarGz)
        } else {
            Err(FetchError::UnsupportedSourceKind {
                reference: reference.to_string(),
            })
        }
    }
}

/// Version-control client able to clone a repository.
pub trait VcsClient {
    /// Clones `source_ref` into `destination`, returning captured output.
    ///
    /// # Errors
    ///
    /// Returns `CloneFailed` with the client's diagnostic output.
    fn clone_into(&self, source_ref: &str, destination: &Path) -> Result<String>;
}

impl<V: VcsClient + ?Sized> VcsClient for &V {
    fn clone_into(&self, source_ref: &str, destination: &Path) -> Result<String> {
        (**self).clone_into(source_ref, destination)
    }
}

/// [`VcsClient`] that runs the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
}

impl GitCli {
    /// Uses `git` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Uses a specific executable.
    #[must_use]
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl VcsClient for GitCli {
    fn clone_into(&self, source_ref: &str, destination: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("clone")
            .arg("--")
            .arg(source_ref)
            .arg(destination)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| FetchError::CloneFailed {
                source_ref: source_ref.to_string(),
                output: format!("failed to run {}: {e}", self.program.to_string_lossy()),
            })?;

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(captured)
        } else {
            Err(FetchError::CloneFailed {
                source_ref: source_ref.to_string(),
                output: captured,
            })
        }
    }
}

/// What [`SourceFetcher::fetch_from_source`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The reference was cloned.
    Cloned {
        /// Clone destination.
        destination: PathBuf,
        /// Captured client output.
        output: String,
    },
    /// The reference was downloaded and extracted.
    Extracted {
        /// Canonical extraction root.
        destination: PathBuf,
        /// Extraction report.
        report: ExtractionReport,
    },
}

impl SourceOutcome {
    /// Where the source ended up.
    #[must_use]
    pub fn destination(&self) -> &Path {
        match self {
            Self::Cloned { destination, .. } | Self::Extracted { destination, .. } => destination,
        }
    }
}

/// Dispatches an ad-hoc reference to a clone or a download.
pub struct SourceFetcher<F, V> {
    fetcher: F,
    vcs: V,
    extractor: ArchiveStreamExtractor,
    cancel: Option<CancelToken>,
}

impl<F: Fetcher, V: VcsClient> SourceFetcher<F, V> {
    /// Creates a dispatcher over `fetcher` and `vcs`.
    pub fn new(fetcher: F, vcs: V) -> Self {
        Self {
            fetcher,
            vcs,
            extractor: ArchiveStreamExtractor::default(),
            cancel: None,
        }
    }

    /// Sets the extraction configuration.
    pub fn with_extract_config(mut self, config: ExtractConfig) -> Self {
        self.extractor = ArchiveStreamExtractor::new(config);
        self
    }

    /// Attaches a token that aborts an in-flight download.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Retrieves `reference` into `destination`.
    ///
    /// For tar.gz references `destination` is created if missing.
    ///
    /// # Errors
    ///
    /// - `UnsupportedSourceKind` for unrecognised references
    /// - `CloneFailed` from the version-control client
    /// - `WriteFailure` if the destination cannot be created
    /// - any fetch or extraction error, unchanged
    pub fn fetch_from_source(
        &self,
        reference: &str,
        destination: &Path,
        progress: &mut dyn ProgressCallback,
    ) -> Result<SourceOutcome> {
        match SourceKind::classify(reference)? {
            SourceKind::Git => {
                info!(%reference, destination = %destination.display(), "cloning repository");
                let output = self.vcs.clone_into(reference, destination)?;
                Ok(SourceOutcome::Cloned {
                    destination: destination.to_path_buf(),
                    output,
                })
            }
            SourceKind::TarGz => {
                std::fs::create_dir_all(destination)
                    .map_err(|e| FetchError::write_failure(destination, e))?;
                let dest = DestDir::new(destination)?;
                let report = download_and_extract(
                    &self.fetcher,
                    &self.extractor,
                    reference,
                    &dest,
                    self.cancel.as_ref(),
                    progress,
                )?;
                Ok(SourceOutcome::Extracted {
                    destination: dest.into_path_buf(),
                    report,
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use crate::test_utils::FakeFetcher;
    use crate::test_utils::RecordingVcs;
    use crate::test_utils::TarGzBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_classify() {
        let cases = [
            ("https://github.com/NRLMMD-GEOIPS/geoips.git", SourceKind::Git),
            ("git@github.com:NRLMMD-GEOIPS/geoips", SourceKind::Git),
            ("git://example.com/repo", SourceKind::Git),
            ("ssh://git@example.com/repo.git", SourceKind::Git),
            ("https://example.com/repo.git/", SourceKind::Git),
            ("https://example.com/data.tgz", SourceKind::TarGz),
            ("https://example.com/DATA.TAR.GZ", SourceKind::TarGz),
            ("https://example.com/data.tgz?token=abc#frag", SourceKind::TarGz),
        ];
        for (reference, expected) in cases {
            assert_eq!(SourceKind::classify(reference).unwrap(), expected, "{reference}");
        }
    }

    #[test]
    fn test_classify_unsupported() {
        for reference in [
            "https://example.com/data.zip",
            "https://example.com/data.tar",
            "https://example.com/tgz",
            "https://example.com/?file=x.tgz",
            "",
        ] {
            assert!(
                matches!(
                    SourceKind::classify(reference),
                    Err(FetchError::UnsupportedSourceKind { .. })
                ),
                "{reference}"
            );
        }
    }

    #[test]
    fn test_git_reference_is_cloned() {
        let fetcher = FakeFetcher::ok(Vec::new());
        let vcs = RecordingVcs::succeeding();
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("repo");

        let outcome = SourceFetcher::new(&fetcher, &vcs)
            .fetch_from_source("https://example.com/repo.git", &target, &mut NoopProgress)
            .unwrap();

        assert!(matches!(outcome, SourceOutcome::Cloned { .. }));
        assert_eq!(outcome.destination(), target);
        assert_eq!(
            vcs.clones(),
            vec![("https://example.com/repo.git".to_string(), target)]
        );
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn test_clone_failure_carries_output() {
        let fetcher = FakeFetcher::ok(Vec::new());
        let vcs = RecordingVcs::failing("fatal: repository not found");
        let temp = TempDir::new().unwrap();

        let err = SourceFetcher::new(&fetcher, &vcs)
            .fetch_from_source("git@example.com:x/y.git", temp.path(), &mut NoopProgress)
            .unwrap_err();

        match err {
            FetchError::CloneFailed { source_ref, output } => {
                assert_eq!(source_ref, "git@example.com:x/y.git");
                assert_eq!(output, "fatal: repository not found");
            }
            other => panic!("expected CloneFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_tgz_reference_is_extracted() {
        let archive = TarGzBuilder::new().add_file("readme.txt", b"hi").build();
        let fetcher = FakeFetcher::ok(archive);
        let vcs = RecordingVcs::succeeding();
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("new/dir");

        let outcome = SourceFetcher::new(&fetcher, &vcs)
            .fetch_from_source("https://example.com/data.tgz", &target, &mut NoopProgress)
            .unwrap();

        match outcome {
            SourceOutcome::Extracted { report, .. } => assert_eq!(report.files_extracted, 1),
            other => panic!("expected Extracted, got {other:?}"),
        }
        assert!(target.join("readme.txt").is_file());
        assert!(vcs.clones().is_empty());
    }

    #[test]
    fn test_unsupported_touches_nothing() {
        let fetcher = FakeFetcher::ok(Vec::new());
        let vcs = RecordingVcs::succeeding();
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("never");

        let err = SourceFetcher::new(&fetcher, &vcs)
            .fetch_from_source("https://example.com/data.zip", &target, &mut NoopProgress)
            .unwrap_err();

        assert!(matches!(err, FetchError::UnsupportedSourceKind { .. }));
        assert!(!target.exists());
        assert_eq!(fetcher.calls(), 0);
        assert!(vcs.clones().is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_git_cli_missing_program() {
        let temp = TempDir::new().unwrap();
        let err = VcsClient::clone_into(
            &GitCli::with_program("/nonexistent/git-binary"),
            "https://example.com/repo.git",
            temp.path(),
        )
        .unwrap_err();

        match err {
            FetchError::CloneFailed { output, .. } => assert!(output.contains("failed to run")),
            other => panic!("expected CloneFailed, got {other:?}"),
        }
    }
}
