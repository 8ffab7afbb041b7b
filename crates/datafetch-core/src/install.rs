//! Named dataset installation.

use std::path::Path;
use std::path::PathBuf;

use tracing::info;
use tracing::warn;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::catalog::DatasetCatalog;
use crate::extraction::ArchiveStreamExtractor;
use crate::fetch::Fetcher;
use crate::fetch::download_and_extract;
use crate::io::CancelToken;
use crate::types::DestDir;

/// Result of one [`Installer::install`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    dataset_name: String,
    already_present: bool,
    final_path: PathBuf,
    report: Option<ExtractionReport>,
}

impl InstallOutcome {
    /// The requested dataset name.
    #[must_use]
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    /// `true` if the dataset was already installed and nothing was fetched.
    #[must_use]
    pub const fn already_present(&self) -> bool {
        self.already_present
    }

    /// `<destination_root>/<dataset_name>`.
    #[must_use]
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Extraction report, present only when an archive was extracted.
    #[must_use]
    pub const fn report(&self) -> Option<&ExtractionReport> {
        self.report.as_ref()
    }
}

/// Installs catalog datasets into a destination root.
///
/// An entry named after the dataset directly under the root counts as
/// installed; its contents are not inspected.
pub struct Installer<'c, F> {
    catalog: &'c DatasetCatalog,
    fetcher: F,
    extractor: ArchiveStreamExtractor,
    cancel: Option<CancelToken>,
}

impl<'c, F: Fetcher> Installer<'c, F> {
    /// Creates an installer resolving names through `catalog`.
    pub fn new(catalog: &'c DatasetCatalog, fetcher: F) -> Self {
        Self {
            catalog,
            fetcher,
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

    /// Installs `dataset_name` below `destination_root`.
    ///
    /// The root must already exist; it is never created here.
    ///
    /// # Errors
    ///
    /// - `UnknownDataset` if the name is not in the catalog
    /// - `InvalidDestination` if the root is missing or not a directory
    /// - any fetch or extraction error, unchanged
    pub fn install(
        &self,
        dataset_name: &str,
        destination_root: &Path,
        progress: &mut dyn ProgressCallback,
    ) -> Result<InstallOutcome> {
        let url = self.catalog.lookup(dataset_name)?;
        let dest = DestDir::new(destination_root)?;
        let final_path = dest.as_path().join(dataset_name);

        if dest.contains_entry(dataset_name) {
            info!(
                dataset = dataset_name,
                path = %final_path.display(),
                "dataset already installed"
            );
            return Ok(InstallOutcome {
                dataset_name: dataset_name.to_string(),
                already_present: true,
                final_path,
                report: None,
            });
        }

        info!(dataset = dataset_name, %url, "installing dataset");
        let mut report = download_and_extract(
            &self.fetcher,
            &self.extractor,
            url,
            &dest,
            self.cancel.as_ref(),
            progress,
        )?;

        if !dest.contains_entry(dataset_name) {
            warn!(
                dataset = dataset_name,
                path = %final_path.display(),
                "archive did not create the dataset directory"
            );
            report.add_warning(format!(
                "archive did not create {}",
                final_path.display()
            ));
        }

        Ok(InstallOutcome {
            dataset_name: dataset_name.to_string(),
            already_present: false,
            final_path,
            report: Some(report),
        })
    }
}
