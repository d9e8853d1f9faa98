//! Logical mirror names and their cache paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Directory inside the cache that holds lease files.
///
/// Starts with '.', so no valid mirror name can collide with it.
pub const LEASE_DIR: &str = ".locks";

/// Stable logical identifier of a remote source.
///
/// A valid name is exactly one path component, so `cache_dir.join(name)`
/// always lands directly inside the cache directory and two different names
/// never share a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MirrorName(String);

impl MirrorName {
    /// Validates and wraps a mirror name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(CoreError::invalid_name(name, "name cannot be empty"));
        }

        if name.starts_with('.') {
            return Err(CoreError::invalid_name(name, "name cannot start with '.'"));
        }

        if name.contains('/') || name.contains('\\') {
            return Err(CoreError::invalid_name(
                name,
                "name must be a single path component",
            ));
        }

        if name.chars().any(|c| c.is_control() || c == ':') {
            return Err(CoreError::invalid_name(
                name,
                "name contains invalid characters",
            ));
        }

        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the directory of the bare mirror inside `cache_dir`.
    pub fn mirror_path(&self, cache_dir: &Path) -> PathBuf {
        cache_dir.join(&self.0)
    }

    /// Returns the lease file guarding the mirror inside `cache_dir`.
    ///
    /// Lives under [`LEASE_DIR`], outside every mirror directory, so disposing
    /// a mirror never removes an active lease and no mirror shares its path.
    pub fn lease_path(&self, cache_dir: &Path) -> PathBuf {
        cache_dir.join(LEASE_DIR).join(format!("{}.lock", self.0))
    }
}

impl fmt::Display for MirrorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MirrorName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MirrorName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for MirrorName {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<MirrorName> for String {
    fn from(name: MirrorName) -> Self {
        name.0
    }
}
