//! Path containment checks for archive members.
//!
//! Everything here is lexical: no filesystem access, no errors. A member
//! name that cannot be interpreted safely is simply not contained.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Returns `true` if `member_name` joined onto `destination_root` stays
/// inside the root after normalization.
///
/// The comparison is segment-aware: `/data2/x` is never inside `/data`.
/// Empty names, absolute names, names containing NUL bytes, and any name
/// whose `..` components climb above the root are rejected. A name that
/// normalizes to the root itself (`.`, `./`) is contained.
///
/// `destination_root` must be absolute; a relative root is never trusted.
///
/// # Examples
///
/// ```
/// use datafetch_core::security::is_contained;
/// use std::path::Path;
///
/// let root = Path::new("/data");
/// assert!(is_contained(root, "file.txt"));
/// assert!(is_contained(root, "sub/../file.txt"));
/// assert!(!is_contained(root, "../etc/passwd"));
/// assert!(!is_contained(root, "/etc/passwd"));
/// assert!(!is_contained(root, "sub/../../etc"));
/// ```
#[must_use]
pub fn is_contained(destination_root: &Path, member_name: &str) -> bool {
    resolve_member(destination_root, member_name).is_some()
}

/// Resolves `member_name` to a normalized path relative to
/// `destination_root`, or `None` if it would escape.
///
/// The returned path has no `.` or `..` components and is empty when the
/// member names the root itself.
#[must_use]
pub fn resolve_member(destination_root: &Path, member_name: &str) -> Option<PathBuf> {
    if member_name.is_empty() || member_name.contains('\0') {
        return None;
    }

    let member = Path::new(member_name);
    if member.has_root()
        || member.is_absolute()
        || member
            .components()
            .any(|c| matches!(c, Component::Prefix(_)))
    {
        return None;
    }

    if !destination_root.is_absolute() {
        return None;
    }

    let root = normalize(destination_root);
    let joined = normalize(&root.join(member));

    joined.strip_prefix(&root).ok().map(Path::to_path_buf)
}

/// Lexically normalizes a path.
///
/// `.` components are dropped and `..` pops the previous normal component;
/// `..` at the filesystem root stays at the root. Prefix and root
/// components are kept as-is.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(Component::ParentDir.as_os_str());
                }
            }
            Component::Normal(part) => normalized.push(part),
        }
    }

    normalized
}
