//! gitcache core - domain types
//!
//! This crate provides the foundational types shared by gitcache backends:
//! validated mirror names, Git references and the operation label catalog.

pub mod error;
pub mod labels;
pub mod name;
pub mod refs;

pub use error::{CoreError, Result};
pub use labels::LabelCatalog;
pub use name::{LEASE_DIR, MirrorName};
pub use refs::GitRef;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
