//! Error types for mirror operations.

use std::path::PathBuf;

use gitcache_core::CoreError;

/// Errors raised by a [`GitEngine`](crate::engine::GitEngine).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The repository at a path could not be opened.
    #[error("failed to open repository at {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// A bare clone failed.
    #[error("clone failed: {0}")]
    Clone(String),

    /// A fetch failed.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// A remote is missing or misconfigured.
    #[error("remote error: {0}")]
    Remote(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Creates a new open error.
    pub fn open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new clone error.
    pub fn clone_failed(msg: impl Into<String>) -> Self {
        Self::Clone(msg.into())
    }

    /// Creates a new fetch error.
    pub fn fetch_failed(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Creates a new remote error.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }
}

/// Errors that can occur while managing a remote mirror.
///
/// Every variant carries the mirror name plus the context of the attempted
/// operation; rendering for users is left to the caller.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// Cloning the remote into the cache failed. A partial directory may remain.
    #[error("failed to create mirror '{name}' from {url}: {source}")]
    MirrorCreationFailed {
        name: String,
        url: String,
        #[source]
        source: EngineError,
    },

    /// Fetching a ref into an existing mirror failed. The mirror is stale but intact.
    #[error("failed to fetch '{branch}' from {remote} into mirror '{name}': {source}")]
    FetchFailed {
        name: String,
        branch: String,
        remote: String,
        #[source]
        source: EngineError,
    },

    /// Removing the mirror directory failed. Its state is unknown.
    #[error("failed to dispose mirror '{name}' at {path}: {source}")]
    DisposeFailed {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing mirror points at a different origin than requested.
    #[error("mirror '{name}' has origin {actual}, expected {expected}")]
    OriginMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// Another owner holds the lease for this mirror.
    #[error("mirror '{name}' is leased via {path}{}", .holder.as_deref().map(|h| format!(" by {h}")).unwrap_or_default())]
    LeaseHeld {
        name: String,
        path: PathBuf,
        holder: Option<String>,
    },

    /// The lease file could not be created or removed.
    #[error("lease error at {path}: {source}")]
    Lease {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A name or reference failed validation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl MirrorError {
    /// Creates a new mirror creation error.
    pub fn creation_failed(
        name: impl Into<String>,
        url: impl Into<String>,
        source: EngineError,
    ) -> Self {
        Self::MirrorCreationFailed {
            name: name.into(),
            url: url.into(),
            source,
        }
    }

    /// Creates a new fetch error.
    pub fn fetch_failed(
        name: impl Into<String>,
        branch: impl Into<String>,
        remote: impl Into<String>,
        source: EngineError,
    ) -> Self {
        Self::FetchFailed {
            name: name.into(),
            branch: branch.into(),
            remote: remote.into(),
            source,
        }
    }

    /// Creates a new dispose error.
    pub fn dispose_failed(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::DisposeFailed {
            name: name.into(),
            path: path.into(),
            source,
        }
    }

    /// Creates a new invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::MirrorCreationFailed { source, .. } | Self::FetchFailed { source, .. } => {
                matches!(source, EngineError::Clone(_) | EngineError::Fetch(_))
            },
            Self::LeaseHeld { .. } | Self::DisposeFailed { .. } => true,
            _ => false,
        }
    }

    /// Returns the mirror name this error refers to, if any.
    pub fn mirror_name(&self) -> Option<&str> {
        match self {
            Self::MirrorCreationFailed { name, .. }
            | Self::FetchFailed { name, .. }
            | Self::DisposeFailed { name, .. }
            | Self::OriginMismatch { name, .. }
            | Self::LeaseHeld { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Result alias for mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
