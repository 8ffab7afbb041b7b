//! Subcommand implementations.

pub mod completion;
pub mod datasets;
pub mod fetch;
pub mod install;
pub mod validate;

use crate::cli::NetworkArgs;
use datafetch_core::ExtractConfig;
use datafetch_core::FetchConfig;
use std::time::Duration;

fn fetch_config(network: &NetworkArgs) -> FetchConfig {
    FetchConfig::default().with_connect_timeout(Duration::from_secs(network.connect_timeout))
}

fn extract_config(network: &NetworkArgs) -> ExtractConfig {
    ExtractConfig::default().with_overwrite(network.overwrite)
}
