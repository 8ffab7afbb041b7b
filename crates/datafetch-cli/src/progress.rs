//! Spinner for download and extraction progress.

use console::Term;
use datafetch_core::NoopProgress;
use datafetch_core::ProgressCallback;
use indicatif::HumanBytes;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::path::Path;
use std::time::Duration;

/// CLI spinner implementing `ProgressCallback`.
///
/// The archive size is rarely known up front, so this shows a spinner with
/// the current member, member count and bytes written instead of a bar.
/// Cleared on drop.
pub struct CliProgress {
    bar: ProgressBar,
    entries: usize,
}

impl CliProgress {
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed}] {prefix} {bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar, entries: 0 }
    }

    /// Checks if progress should be drawn (stderr is a terminal).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_download_start(&mut self, url: &str, content_length: Option<u64>) {
        let message = match content_length {
            Some(length) => format!("Downloading {url} ({})", HumanBytes(length)),
            None => format!("Downloading {url}"),
        };
        self.bar.set_message(message);
    }

    fn on_entry_start(&mut self, path: &Path, current: usize) {
        self.bar
            .set_message(format!("Extracting #{current} {}", path.display()));
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bar.inc(bytes);
    }

    fn on_entry_complete(&mut self, _path: &Path) {
        self.entries += 1;
        self.bar.set_prefix(format!("{} members", self.entries));
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Returns a spinner when `enabled` and stderr is a terminal, otherwise a
/// no-op sink.
pub fn create(enabled: bool, message: &str) -> Box<dyn ProgressCallback> {
    if enabled && CliProgress::should_show() {
        Box::new(CliProgress::new(message))
    } else {
        Box::new(NoopProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_callbacks() {
        let mut progress = CliProgress::new("Installing");
        progress.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());

        progress.on_download_start("https://example.com/a.tgz", Some(2048));
        progress.on_entry_start(Path::new("a/b.txt"), 1);
        progress.on_bytes_written(100);
        progress.on_bytes_written(28);
        progress.on_entry_complete(Path::new("a/b.txt"));

        assert_eq!(progress.bar.position(), 128);
        assert_eq!(progress.entries, 1);

        progress.on_complete();
        assert!(progress.bar.is_finished());
    }
}
