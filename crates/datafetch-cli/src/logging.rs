//! Diagnostic logging setup.

use anyhow::Context;
use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber writing compact logs to stderr.
///
/// `RUST_LOG` takes precedence over the level picked from the flags.
pub fn init(verbose: bool, quiet: bool) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose, quiet).into())
        .from_env()
        .context("invalid RUST_LOG filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(console::colors_enabled_stderr())
                .with_target(false)
                .without_time()
                .compact(),
        )
        .try_init()
        .context("failed to initialize logging")
}

const fn default_level(verbose: bool, quiet: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else if quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::WARN
    }
}
