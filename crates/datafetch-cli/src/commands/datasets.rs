//! Datasets command implementation.

use crate::cli::DatasetsArgs;
use crate::output::DatasetStatus;
use crate::output::OutputFormatter;
use anyhow::Result;
use datafetch_core::catalog::DatasetCatalog;
use datafetch_core::types::DestDir;

pub fn execute(args: &DatasetsArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let catalog = DatasetCatalog::builtin();

    // An unusable destination only disables the installed column.
    let root = args.destination.as_ref().and_then(|dir| match DestDir::new(dir) {
        Ok(root) => Some(root),
        Err(e) => {
            formatter.format_warning(&e.to_string());
            None
        }
    });

    let datasets: Vec<DatasetStatus> = catalog
        .entries()
        .map(|entry| DatasetStatus {
            name: entry.name.to_string(),
            url: entry.url.to_string(),
            installed: root.as_ref().map(|r| r.contains_entry(entry.name)),
        })
        .collect();

    formatter.format_datasets(&datasets)
}
