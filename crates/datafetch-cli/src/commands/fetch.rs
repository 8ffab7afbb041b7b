//! Fetch command implementation.

use super::extract_config;
use super::fetch_config;
use crate::cli::FetchArgs;
use crate::error::add_fetch_context;
use crate::output::OutputFormatter;
use crate::progress;
use anyhow::Result;
use datafetch_core::fetch::HttpFetcher;
use datafetch_core::io::CancelToken;
use datafetch_core::source::GitCli;
use datafetch_core::source::SourceFetcher;

pub fn execute(args: &FetchArgs, formatter: &dyn OutputFormatter, cancel: &CancelToken) -> Result<()> {
    let fetcher = add_fetch_context(HttpFetcher::new(&fetch_config(&args.network)))?;

    let sources = SourceFetcher::new(fetcher, GitCli::new())
        .with_extract_config(extract_config(&args.network))
        .with_cancel_token(cancel.clone());

    let mut progress = progress::create(formatter.wants_progress(), &format!("Fetching {}", args.url));
    let outcome = add_fetch_context(sources.fetch_from_source(
        &args.url,
        &args.output_dir,
        &mut *progress,
    ))?;
    drop(progress);

    formatter.format_fetch_result(&args.url, &outcome)
}
