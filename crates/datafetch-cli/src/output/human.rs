//! Human-readable output formatter with colors and styling.

use super::formatter::DatasetStatus;
use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use datafetch_core::ExtractionReport;
use datafetch_core::install::InstallOutcome;
use datafetch_core::plugin::PluginDescriptor;
use datafetch_core::source::SourceOutcome;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn success_line(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn write_report(&self, report: &ExtractionReport) {
        let _ = self
            .term
            .write_line(&format!("  Files extracted: {}", report.files_extracted));
        let _ = self
            .term
            .write_line(&format!("  Directories: {}", report.directories_created));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_written)
        ));

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Downloaded: {}",
                Self::format_size(report.bytes_downloaded)
            ));
            let _ = self
                .term
                .write_line(&format!("  Skipped members: {}", report.members_skipped));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        for warning in &report.warnings {
            self.format_warning(warning);
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_install_result(&self, outcome: &InstallOutcome) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let path = outcome.final_path().display();
        if outcome.already_present() {
            let _ = self.term.write_line(&format!(
                "Test dataset '{}' already exists under '{path}'. See that location for the contents of the test dataset.",
                outcome.dataset_name()
            ));
            return Ok(());
        }

        self.success_line(&format!(
            "Test dataset '{}' has been installed under {path}",
            outcome.dataset_name()
        ));
        if let Some(report) = outcome.report() {
            self.write_report(report);
        }

        Ok(())
    }

    fn format_fetch_result(&self, reference: &str, outcome: &SourceOutcome) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        match outcome {
            SourceOutcome::Cloned {
                destination,
                output,
            } => {
                self.success_line(&format!(
                    "Repository {reference} cloned into {}",
                    destination.display()
                ));
                if self.verbose && !output.trim().is_empty() {
                    let _ = self.term.write_line(output.trim_end());
                }
            }
            SourceOutcome::Extracted {
                destination,
                report,
            } => {
                self.success_line(&format!(
                    "Downloaded and extracted {reference} into {}",
                    destination.display()
                ));
                self.write_report(report);
            }
        }

        Ok(())
    }

    fn format_datasets(&self, datasets: &[DatasetStatus]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let width = datasets.iter().map(|d| d.name.len()).max().unwrap_or(0);
        for dataset in datasets {
            let marker = match dataset.installed {
                Some(true) if self.use_colors => format!("{} ", style("installed").green()),
                Some(true) => "installed ".to_string(),
                Some(false) => "          ".to_string(),
                None => String::new(),
            };
            let _ = self.term.write_line(&format!(
                "{marker}{:<width$}  {}",
                dataset.name, dataset.url
            ));
        }

        Ok(())
    }

    fn format_validation_result(&self, descriptor: &PluginDescriptor) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.success_line(&format!(
            "Plugin `{}` found at {} is valid.",
            descriptor.name,
            descriptor.path.display()
        ));
        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Interface: {}", descriptor.interface));
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if console::colors_enabled_stderr() {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }

    fn wants_progress(&self) -> bool {
        !self.quiet
    }
}
