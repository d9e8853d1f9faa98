//! Error types for gitcache domain values.
//!
//! Validation of names and references happens before any filesystem or
//! network work, so these errors never carry I/O causes.
//!
//! # Example
//!
//! ```
//! use gitcache_core::{CoreError, MirrorName};
//!
//! let err = MirrorName::new("../escape").unwrap_err();
//! assert!(matches!(err, CoreError::InvalidName { .. }));
//! ```

use thiserror::Error;

/// Errors raised while validating domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A mirror name cannot be mapped to a single cache directory.
    #[error("Invalid mirror name '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// A branch, tag or commit reference is malformed.
    #[error("Invalid reference '{name}': {reason}")]
    InvalidRef {
        /// The rejected reference
        name: String,
        /// Why it was rejected
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid reference error.
    pub fn invalid_ref(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRef {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
