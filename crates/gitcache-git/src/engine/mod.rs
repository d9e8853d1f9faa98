//! Git engine abstraction.
//!
//! The mirror never talks to Git directly. Everything that touches objects,
//! refs or the network goes through a [`GitEngine`], which keeps the lifecycle
//! policy testable without a network and lets callers swap the transport.

mod gix_engine;

use std::path::Path;

pub use gix_engine::GixEngine;

use crate::error::EngineError;

/// Name of the remote every mirror is cloned from.
pub const ORIGIN: &str = "origin";

/// The repository operations a mirror delegates to.
///
/// Implementations must be blocking; callers that need async wrap calls in
/// their runtime's blocking pool.
pub trait GitEngine: Send + Sync {
    /// An open repository. Dropping it releases every resource it holds.
    type Handle: Send;

    /// Bare-clones `url` into `path`, configuring it as remote [`ORIGIN`].
    fn clone_bare(&self, url: &str, path: &Path) -> Result<(), EngineError>;

    /// Opens the bare repository at `path`.
    fn open(&self, path: &Path) -> Result<Self::Handle, EngineError>;

    /// Fetches `refspecs` from `remote` into the repository.
    fn fetch(
        &self,
        handle: &Self::Handle,
        remote: &str,
        refspecs: &[String],
    ) -> Result<(), EngineError>;

    /// Returns the fetch URL configured for `remote`, if the remote exists.
    fn remote_url(&self, handle: &Self::Handle, remote: &str)
    -> Result<Option<String>, EngineError>;
}
