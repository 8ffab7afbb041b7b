//! Validate command implementation.

use crate::cli::ValidateArgs;
use crate::error::add_fetch_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use datafetch_core::plugin::KnownInterfaces;
use datafetch_core::plugin::validate_plugin;

pub fn execute(args: &ValidateArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let descriptor = add_fetch_context(validate_plugin(&args.file, &KnownInterfaces::default()))?;
    formatter.format_validation_result(&descriptor)
}
