//! Datafetch CLI - Command-line utility for installing remote test datasets
//! safely.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use datafetch_core::io::CancelToken;
use output::OutputFormatter;
use std::process::ExitCode;

/// Exit status after a second Ctrl-C.
const INTERRUPTED: i32 = 130;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match run(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    logging::init(cli.verbose, cli.quiet)?;

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel)?;

    match &cli.command {
        cli::Commands::Install(args) => commands::install::execute(args, formatter, &cancel),
        cli::Commands::Fetch(args) => commands::fetch::execute(args, formatter, &cancel),
        cli::Commands::Datasets(args) => commands::datasets::execute(args, formatter),
        cli::Commands::Validate(args) => commands::validate::execute(args, formatter),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    }
}

/// First Ctrl-C cancels the active download, a second one exits.
fn install_interrupt_handler(cancel: &CancelToken) -> Result<()> {
    let token = cancel.clone();
    ctrlc::set_handler(move || {
        if token.is_cancelled() {
            std::process::exit(INTERRUPTED);
        }
        tracing::warn!("interrupt received, cancelling download");
        token.cancel();
    })
    .context("failed to install Ctrl-C handler")
}
