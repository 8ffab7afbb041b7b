//! Static catalog of installable datasets.

use std::collections::BTreeMap;

use crate::FetchError;
use crate::Result;

const GEOIPS_TEST_DATASETS: &[(&str, &str)] = &[
    (
        "test_data_viirs",
        "https://io.cira.colostate.edu/s/mQ2HbE2Js4E9rba/download/test_data_viirs.tgz",
    ),
    (
        "test_data_smap",
        "https://io.cira.colostate.edu/s/CezXWwXg4qR2b94/download/test_data_smap.tgz",
    ),
    (
        "test_data_scat",
        "https://io.cira.colostate.edu/s/HyHLZ9F8bnfcTcd/download/test_data_scat.tgz",
    ),
    (
        "test_data_sar",
        "https://io.cira.colostate.edu/s/snxx8S5sQL3AL7f/download/test_data_sar.tgz",
    ),
    (
        "test_data_noaa_aws",
        "https://io.cira.colostate.edu/s/fkiPS3jyrQGqgPN/download/test_data_noaa_aws.tgz",
    ),
    (
        "test_data_gpm",
        "https://io.cira.colostate.edu/s/LT92NiFSA8ZSNDP/download/test_data_gpm.tgz",
    ),
    (
        "test_data_fusion",
        "https://io.cira.colostate.edu/s/DSz2nZsiPMDeLEP/download/test_data_fusion.tgz",
    ),
    (
        "test_data_clavrx",
        "https://io.cira.colostate.edu/s/ACLKdS2Cpgd2qkc/download/test_data_clavrx.tgz",
    ),
    (
        "test_data_amsr2",
        "https://io.cira.colostate.edu/s/FmWwX2ft7KDQ8N9/download/test_data_amsr2.tgz",
    ),
];

/// One named dataset and the URL of its tar.gz archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetCatalogEntry<'a> {
    /// Dataset name, also the directory the archive is expected to create.
    pub name: &'a str,
    /// Archive URL.
    pub url: &'a str,
}

/// Read-only mapping from dataset name to archive URL.
///
/// Names are unique. Lookups are exact; case folding is left to callers.
///
/// # Examples
///
/// ```
/// use datafetch_core::catalog::DatasetCatalog;
///
/// let catalog = DatasetCatalog::builtin();
/// let url = catalog.lookup("test_data_viirs")?;
/// assert!(url.ends_with("test_data_viirs.tgz"));
/// # Ok::<(), datafetch_core::FetchError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetCatalog {
    entries: BTreeMap<String, String>,
}

impl DatasetCatalog {
    /// Builds a catalog from `(name, url)` pairs. Later duplicates win.
    pub fn new<I, N, U>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, U)>,
        N: Into<String>,
        U: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, url)| (name.into(), url.into()))
                .collect(),
        }
    }

    /// The GeoIPS test-data catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(GEOIPS_TEST_DATASETS.iter().copied())
    }

    /// Resolves `name` to its archive URL.
    ///
    /// # Errors
    ///
    /// Returns `UnknownDataset` if `name` is not in the catalog.
    pub fn lookup(&self, name: &str) -> Result<&str> {
        self.entries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| FetchError::UnknownDataset {
                name: name.to_string(),
            })
    }

    /// Returns `true` if `name` is in the catalog.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates over all entries, sorted by name.
    pub fn entries(&self) -> impl Iterator<Item = DatasetCatalogEntry<'_>> {
        self.entries.iter().map(|(name, url)| DatasetCatalogEntry { name, url })
    }

    /// Iterates over all dataset names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of datasets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog has no datasets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
