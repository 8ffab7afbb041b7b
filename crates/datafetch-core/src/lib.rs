//! Streaming download and path-safe extraction of remote tar.gz datasets.
//!
//! `datafetch-core` downloads a gzip-compressed tar archive over HTTP and
//! unpacks it in a single pass below a destination root. Every member name
//! is checked lexically against the root before anything is written; the
//! first member that would land outside aborts the extraction.
//!
//! On top of that sit:
//! - [`install::Installer`], which installs named datasets from a
//!   [`catalog::DatasetCatalog`] and skips datasets already present
//! - [`source::SourceFetcher`], which clones git references and
//!   downloads tar.gz references
//! - [`plugin::validate_plugin`], a static check of retrieved plugin
//!   descriptors
//!
//! # Examples
//!
//! ```no_run
//! use datafetch_core::FetchConfig;
//! use datafetch_core::NoopProgress;
//! use datafetch_core::catalog::DatasetCatalog;
//! use datafetch_core::fetch::HttpFetcher;
//! use datafetch_core::install::Installer;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = DatasetCatalog::builtin();
//! let fetcher = HttpFetcher::new(&FetchConfig::default())?;
//! let outcome = Installer::new(&catalog, fetcher).install(
//!     "test_data_viirs",
//!     Path::new("/data/testdata"),
//!     &mut NoopProgress,
//! )?;
//! println!("installed under {}", outcome.final_path().display());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
mod copy;
pub mod error;
pub mod extraction;
pub mod fetch;
pub mod install;
pub mod io;
pub mod plugin;
pub mod report;
pub mod security;
pub mod source;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::ExtractConfig;
pub use config::FetchConfig;
pub use error::FetchError;
pub use error::Result;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use security::is_contained;
pub use types::DestDir;
