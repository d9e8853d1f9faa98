//! Git engine backed by gix (pure Rust).

use std::path::Path;

use tracing::debug;

use super::GitEngine;
use crate::error::EngineError;

/// [`GitEngine`] using gix for all repository operations - no system git required.
#[derive(Debug, Clone, Copy, Default)]
pub struct GixEngine;

impl GixEngine {
    /// Creates a new gix engine.
    pub fn new() -> Self {
        Self
    }
}

impl GitEngine for GixEngine {
    type Handle = gix::ThreadSafeRepository;

    fn clone_bare(&self, url: &str, path: &Path) -> Result<(), EngineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = gix::url::parse(url.into())
            .map_err(|e| EngineError::clone_failed(format!("invalid URL: {}", e)))?;

        let mut prepare = gix::prepare_clone_bare(url, path)
            .map_err(|e| EngineError::clone_failed(format!("failed to prepare clone: {}", e)))?;

        let (repo, _outcome) = prepare
            .fetch_only(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| EngineError::clone_failed(e.to_string()))?;

        debug!("Bare clone completed at {:?}", repo.git_dir());

        Ok(())
    }

    fn open(&self, path: &Path) -> Result<Self::Handle, EngineError> {
        gix::open(path)
            .map(gix::Repository::into_sync)
            .map_err(|e| EngineError::open(path, e))
    }

    fn fetch(
        &self,
        handle: &Self::Handle,
        remote: &str,
        refspecs: &[String],
    ) -> Result<(), EngineError> {
        let repo = handle.to_thread_local();

        let mut remote = repo
            .find_remote(remote)
            .map_err(|e| EngineError::remote(format!("failed to find remote: {}", e)))?;

        remote
            .replace_refspecs(
                refspecs.iter().map(String::as_str),
                gix::remote::Direction::Fetch,
            )
            .map_err(|e| EngineError::fetch_failed(format!("invalid refspec: {}", e)))?;

        remote
            .connect(gix::remote::Direction::Fetch)
            .map_err(|e| EngineError::fetch_failed(format!("failed to connect: {}", e)))?
            .prepare_fetch(gix::progress::Discard, Default::default())
            .map_err(|e| EngineError::fetch_failed(format!("failed to prepare fetch: {}", e)))?
            .receive(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| EngineError::fetch_failed(e.to_string()))?;

        Ok(())
    }

    fn remote_url(
        &self,
        handle: &Self::Handle,
        remote: &str,
    ) -> Result<Option<String>, EngineError> {
        let repo = handle.to_thread_local();

        match repo.try_find_remote(remote) {
            None => Ok(None),
            Some(Ok(remote)) => Ok(remote
                .url(gix::remote::Direction::Fetch)
                .map(|url| url.to_bstring().to_string())),
            Some(Err(e)) => Err(EngineError::remote(format!(
                "failed to read remote: {}",
                e
            ))),
        }
    }
}
