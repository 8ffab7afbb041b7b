//! Validated wrappers and archive metadata.
//!
//! `DestDir` can only be obtained through validation, so every extraction
//! entry point receives a canonical, existing root.

pub mod dest_dir;
pub mod member;

pub use dest_dir::DestDir;
pub use member::ArchiveMember;
pub use member::MemberKind;
