//! Archive member metadata.

/// Kind of a member inside a tar archive.
///
/// Only regular files and directories are extracted. Everything else
/// (symlinks, hardlinks, devices, FIFOs, global PAX headers) is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Any other entry type.
    Other,
}

impl MemberKind {
    /// Maps a tar header entry type onto a member kind.
    #[must_use]
    pub fn from_tar(entry_type: tar::EntryType) -> Self {
        if entry_type.is_file() || entry_type.is_contiguous() || entry_type.is_gnu_sparse() {
            Self::File
        } else if entry_type.is_dir() {
            Self::Directory
        } else {
            Self::Other
        }
    }

    /// Short lowercase label used in logs and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Other => "other",
        }
    }
}

/// One entry read from the archive stream.
///
/// `name` is the raw stored path, untrusted until checked by
/// [`crate::security::is_contained`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Relative path as stored in the archive.
    pub name: String,
    /// Entry kind.
    pub kind: MemberKind,
    /// Declared size in bytes.
    pub size: u64,
    /// Unix mode bits from the header, if readable.
    pub mode: Option<u32>,
}

impl ArchiveMember {
    /// Reads member metadata from a tar entry header.
    ///
    /// Non-UTF-8 names are converted lossily; the lossy form is only used
    /// for containment checks and diagnostics, never to widen what passes.
    pub(crate) fn from_entry<R: std::io::Read>(entry: &tar::Entry<'_, R>) -> Self {
        let header = entry.header();
        Self {
            name: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
            kind: MemberKind::from_tar(header.entry_type()),
            size: header.size().unwrap_or(0),
            mode: header.mode().ok(),
        }
    }
}
