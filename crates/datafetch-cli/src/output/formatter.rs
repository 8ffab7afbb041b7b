//! Output formatter trait for CLI results.

use anyhow::Result;
use datafetch_core::install::InstallOutcome;
use datafetch_core::plugin::PluginDescriptor;
use datafetch_core::source::SourceOutcome;
use serde::Serialize;

/// One catalog entry and, when a destination is known, its install state.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatus {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed: Option<bool>,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of `install`
    fn format_install_result(&self, outcome: &InstallOutcome) -> Result<()>;

    /// Format the result of `fetch`
    fn format_fetch_result(&self, reference: &str, outcome: &SourceOutcome) -> Result<()>;

    /// Format the dataset listing
    fn format_datasets(&self, datasets: &[DatasetStatus]) -> Result<()>;

    /// Format a successful plugin validation
    fn format_validation_result(&self, descriptor: &PluginDescriptor) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);

    /// Whether a progress spinner may be drawn alongside this output
    fn wants_progress(&self) -> bool;
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
