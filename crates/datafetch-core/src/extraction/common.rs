//! Filesystem writes for validated archive members.
//!
//! Every function here receives a path already resolved by
//! [`crate::security::resolve_member`]. Before creating anything the
//! deepest existing ancestor is canonicalized and checked against the
//! destination root, so a pre-existing symlink inside the root cannot
//! redirect a write outside it.

use std::fs::File;
use std::fs::OpenOptions;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::FetchError;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_member;
use crate::types::ArchiveMember;
use crate::types::DestDir;

/// Writes one regular-file member below `dest`.
///
/// Parent directories are created on demand. Without `overwrite` the file
/// is opened with `create_new`, so an existing file or symlink at the
/// target is never written through.
///
/// # Errors
///
/// - `UnsafeArchiveMember` if an existing ancestor resolves outside `dest`
/// - `WriteFailure` for any filesystem error
/// - `CorruptArchive` if the member data cannot be read
pub fn write_file<R: Read>(
    reader: &mut R,
    member: &ArchiveMember,
    relative: &Path,
    dest: &DestDir,
    config: &ExtractConfig,
    buffer: &mut CopyBuffer,
    report: &mut ExtractionReport,
    progress: &mut dyn ProgressCallback,
) -> Result<()> {
    let output_path = dest.join(relative);

    if let Some(parent) = output_path.parent() {
        ensure_within(dest, parent, member)?;
        create_dir_all(parent).map_err(|e| FetchError::write_failure(parent, e))?;
    }

    let file = open_output(&output_path, config.overwrite)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    let written = copy_member(reader, &mut writer, buffer, &output_path, progress)?;
    writer
        .flush()
        .map_err(|e| FetchError::write_failure(&output_path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = crate::security::sanitize_mode(member.mode, config.preserve_permissions);
        std::fs::set_permissions(&output_path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| FetchError::write_failure(&output_path, e))?;
    }

    report.files_extracted += 1;
    report.bytes_written = report.bytes_written.saturating_add(written);

    Ok(())
}

/// Creates a directory member below `dest`.
///
/// Idempotent: an existing directory is accepted.
pub fn create_directory(
    member: &ArchiveMember,
    relative: &Path,
    dest: &DestDir,
    report: &mut ExtractionReport,
) -> Result<()> {
    let dir_path = dest.join(relative);

    ensure_within(dest, &dir_path, member)?;
    create_dir_all(&dir_path).map_err(|e| FetchError::write_failure(&dir_path, e))?;

    report.directories_created += 1;

    Ok(())
}

fn open_output(path: &Path, overwrite: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);

    if overwrite {
        // Replace a symlink instead of following it.
        if std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink()) {
            std::fs::remove_file(path).map_err(|e| FetchError::write_failure(path, e))?;
        }
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    options
        .open(path)
        .map_err(|e| FetchError::write_failure(path, e))
}

/// Checks that the deepest existing ancestor of `path` (or `path` itself)
/// canonicalizes inside `dest`.
fn ensure_within(dest: &DestDir, path: &Path, member: &ArchiveMember) -> Result<()> {
    let Some(existing) = path.ancestors().find(|p| p.exists()) else {
        return Ok(());
    };

    let canonical = existing
        .canonicalize()
        .map_err(|e| FetchError::write_failure(existing, e))?;

    if canonical.starts_with(dest.as_path()) {
        Ok(())
    } else {
        Err(FetchError::UnsafeArchiveMember {
            member_name: member.name.clone(),
        })
    }
}
