//! Security checks applied to untrusted archive input.

pub mod path;
pub mod permissions;

pub use path::is_contained;
pub use path::normalize;
pub use path::resolve_member;
pub use permissions::sanitize_mode;
