//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

/// Environment variable naming the test-data root.
pub const TESTDATA_DIR_ENV: &str = "GEOIPS_TESTDATA_DIR";

#[derive(Parser)]
#[command(name = "datafetch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a named test dataset
    Install(InstallArgs),
    /// Clone a git repository or download and extract a tar.gz URL
    Fetch(FetchArgs),
    /// List the datasets that can be installed
    Datasets(DatasetsArgs),
    /// Validate a plugin descriptor file
    Validate(ValidateArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct NetworkArgs {
    /// Seconds allowed for establishing the connection
    #[arg(long, value_name = "SECONDS", default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..))]
    pub connect_timeout: u64,

    /// Overwrite files that already exist in the destination
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(clap::Args)]
pub struct InstallArgs {
    /// Dataset name (case-insensitive)
    #[arg(value_name = "DATASET")]
    pub dataset: String,

    /// Root directory datasets are installed under
    #[arg(short, long, value_name = "DIR", env = TESTDATA_DIR_ENV)]
    pub destination: PathBuf,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Git repository or .tgz/.tar.gz URL
    #[arg(value_name = "URL")]
    pub url: String,

    /// Directory to clone or extract into
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(clap::Args)]
pub struct DatasetsArgs {
    /// Root directory to check for installed datasets
    #[arg(short, long, value_name = "DIR", env = TESTDATA_DIR_ENV)]
    pub destination: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Plugin file (.py module or YAML document)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}
