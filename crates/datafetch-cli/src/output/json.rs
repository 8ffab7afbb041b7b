//! JSON output formatter for machine-readable results.

use super::formatter::DatasetStatus;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use datafetch_core::ExtractionReport;
use datafetch_core::install::InstallOutcome;
use datafetch_core::plugin::PluginDescriptor;
use datafetch_core::plugin::PluginKind;
use datafetch_core::source::SourceOutcome;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

#[derive(Serialize)]
struct ExtractionOutput {
    files_extracted: usize,
    directories_created: usize,
    members_skipped: usize,
    bytes_written: u64,
    bytes_downloaded: u64,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl From<&ExtractionReport> for ExtractionOutput {
    fn from(report: &ExtractionReport) -> Self {
        Self {
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            members_skipped: report.members_skipped,
            bytes_written: report.bytes_written,
            bytes_downloaded: report.bytes_downloaded,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_install_result(&self, outcome: &InstallOutcome) -> Result<()> {
        #[derive(Serialize)]
        struct InstallOutput {
            dataset: String,
            already_present: bool,
            path: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            extraction: Option<ExtractionOutput>,
        }

        let data = InstallOutput {
            dataset: outcome.dataset_name().to_string(),
            already_present: outcome.already_present(),
            path: outcome.final_path().display().to_string(),
            extraction: outcome.report().map(ExtractionOutput::from),
        };

        Self::output(&JsonOutput::success("install", data))
    }

    fn format_fetch_result(&self, reference: &str, outcome: &SourceOutcome) -> Result<()> {
        #[derive(Serialize)]
        struct FetchOutput {
            source: String,
            method: &'static str,
            destination: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            extraction: Option<ExtractionOutput>,
        }

        let (method, extraction) = match outcome {
            SourceOutcome::Cloned { .. } => ("git", None),
            SourceOutcome::Extracted { report, .. } => ("tar.gz", Some(report.into())),
        };
        let data = FetchOutput {
            source: reference.to_string(),
            method,
            destination: outcome.destination().display().to_string(),
            extraction,
        };

        Self::output(&JsonOutput::success("fetch", data))
    }

    fn format_datasets(&self, datasets: &[DatasetStatus]) -> Result<()> {
        Self::output(&JsonOutput::success("datasets", datasets))
    }

    fn format_validation_result(&self, descriptor: &PluginDescriptor) -> Result<()> {
        #[derive(Serialize)]
        struct ValidationOutput {
            path: String,
            kind: &'static str,
            interface: String,
            name: String,
            valid: bool,
        }

        let data = ValidationOutput {
            path: descriptor.path.display().to_string(),
            kind: match descriptor.kind {
                PluginKind::Module => "module",
                PluginKind::Yaml => "yaml",
            },
            interface: descriptor.interface.clone(),
            name: descriptor.name.clone(),
            valid: true,
        };

        Self::output(&JsonOutput::success("validate", data))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("unknown", format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData<'a> {
            message: &'a str,
        }

        // stdout carries exactly one document per run
        let output = JsonOutput::success("warning", WarningData { message });
        if let Ok(json) = serde_json::to_string(&output) {
            let _ = writeln!(io::stderr(), "{json}");
        }
    }

    fn wants_progress(&self) -> bool {
        false
    }
}
