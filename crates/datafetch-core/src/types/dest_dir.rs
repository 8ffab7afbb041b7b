//! Validated destination directory type.

use crate::FetchError;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;

/// A validated destination root for archive extraction.
///
/// This type represents a directory that has been validated to:
/// - Exist on the filesystem
/// - Be a directory (not a file)
/// - Be represented as an absolute canonical path
///
/// The canonical form is computed once, so every containment check made
/// against it compares like with like.
///
/// # Examples
///
/// ```no_run
/// use datafetch_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/testdata")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir` after validating the path.
    ///
    /// The directory is never created here; callers own its lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidDestination` if the path does not exist,
    /// is not a directory, or cannot be canonicalized.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let metadata = std::fs::metadata(&path).map_err(|e| FetchError::InvalidDestination {
            path: path.clone(),
            reason: format!("cannot access destination: {e}"),
        })?;

        if !metadata.is_dir() {
            return Err(FetchError::InvalidDestination {
                path,
                reason: "not a directory".into(),
            });
        }

        let canonical = path
            .canonicalize()
            .map_err(|e| FetchError::InvalidDestination {
                path: path.clone(),
                reason: format!("failed to canonicalize: {e}"),
            })?;

        Ok(Self(canonical))
    }

    /// Returns the canonical path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins an already-resolved relative path to this directory.
    #[inline]
    #[must_use]
    pub fn join(&self, relative: &Path) -> PathBuf {
        self.0.join(relative)
    }

    /// Returns `true` if a directory entry named `name` exists directly
    /// under this root.
    ///
    /// Dangling symlinks count as present, matching a directory listing.
    #[must_use]
    pub fn contains_entry(&self, name: &str) -> bool {
        std::fs::symlink_metadata(self.0.join(name)).is_ok()
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}
