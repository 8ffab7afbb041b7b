//! Permission sanitization for extracted files.

/// Computes the mode applied to an extracted regular file.
///
/// The owner can always read and write. With `preserve` set, read and
/// execute bits for group/other and the owner execute bit are carried over
/// from the archive. Setuid, setgid, sticky and any write bit beyond the
/// owner's are always dropped.
///
/// # Examples
///
/// ```
/// use datafetch_core::security::sanitize_mode;
///
/// assert_eq!(sanitize_mode(Some(0o4777), true), 0o755);
/// assert_eq!(sanitize_mode(Some(0o755), false), 0o644);
/// assert_eq!(sanitize_mode(None, true), 0o644);
/// ```
#[must_use]
pub const fn sanitize_mode(archive_mode: Option<u32>, preserve: bool) -> u32 {
    const DEFAULT_FILE_MODE: u32 = 0o644;

    match archive_mode {
        Some(mode) if preserve => (mode & 0o755) | 0o600,
        _ => DEFAULT_FILE_MODE,
    }
}
