//! Install command implementation.

use super::extract_config;
use super::fetch_config;
use crate::cli::InstallArgs;
use crate::error::add_fetch_context;
use crate::output::OutputFormatter;
use crate::progress;
use anyhow::Result;
use datafetch_core::catalog::DatasetCatalog;
use datafetch_core::fetch::HttpFetcher;
use datafetch_core::install::Installer;
use datafetch_core::io::CancelToken;

pub fn execute(
    args: &InstallArgs,
    formatter: &dyn OutputFormatter,
    cancel: &CancelToken,
) -> Result<()> {
    let dataset = args.dataset.to_lowercase();
    let catalog = DatasetCatalog::builtin();
    let fetcher = add_fetch_context(HttpFetcher::new(&fetch_config(&args.network)))?;

    let installer = Installer::new(&catalog, fetcher)
        .with_extract_config(extract_config(&args.network))
        .with_cancel_token(cancel.clone());

    let mut progress = progress::create(
        formatter.wants_progress(),
        &format!("Installing {dataset} test dataset"),
    );
    let outcome = add_fetch_context(installer.install(
        &dataset,
        &args.destination,
        &mut *progress,
    ))?;
    drop(progress);

    formatter.format_install_result(&outcome)
}
