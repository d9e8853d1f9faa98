//! Bare mirror of a remote repository.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gitcache_core::labels::{GIT_ARTIFACT_CLONE, GIT_ARTIFACT_DISPOSE, GIT_ARTIFACT_FETCH};
use gitcache_core::{GitRef, LabelCatalog, MirrorName};
use parking_lot::Mutex;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{FetchPolicy, MirrorConfig, OriginCheck};
use crate::engine::{GitEngine, GixEngine, ORIGIN};
use crate::error::{EngineError, MirrorError, Result};
use crate::lease::MirrorLease;
use crate::notify::{Notifier, TracingNotifier};

/// Whether a mirror exists on disk.
///
/// Always derived from the filesystem, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorState {
    /// No directory at the mirror path.
    Absent,
    /// The mirror path is a directory and is treated as a valid bare mirror.
    Mirrored,
}

/// A locally cached bare mirror of a remote Git repository.
///
/// Opening a mirror clones the remote when the mirror directory is missing
/// and reuses it otherwise. The directory's presence is the only record of
/// whether the remote is mirrored. Every operation runs under a
/// [`MirrorLease`], so a second owner of the same name fails fast instead of
/// racing.
pub struct RemoteGitMirror<E: GitEngine = GixEngine, N: Notifier = TracingNotifier> {
    config: MirrorConfig,
    path: PathBuf,
    engine: E,
    notifier: N,
    labels: LabelCatalog,
    handle: Mutex<Option<E::Handle>>,
}

impl RemoteGitMirror {
    /// Opens the mirror with the gix engine, cloning it if absent.
    pub fn open(config: MirrorConfig) -> Result<Self> {
        Self::with_engine(config, GixEngine::new(), TracingNotifier)
    }
}

impl<E: GitEngine, N: Notifier> RemoteGitMirror<E, N> {
    /// Opens the mirror with a custom engine and notifier.
    pub fn with_engine(config: MirrorConfig, engine: E, notifier: N) -> Result<Self> {
        Self::with_parts(config, engine, notifier, LabelCatalog::default())
    }

    /// Opens the mirror with every collaborator supplied by the caller.
    pub fn with_parts(
        config: MirrorConfig,
        engine: E,
        notifier: N,
        labels: LabelCatalog,
    ) -> Result<Self> {
        let mirror = Self {
            path: config.mirror_path(),
            config,
            engine,
            notifier,
            labels,
            handle: Mutex::new(None),
        };

        let _lease = mirror.lease()?;

        if mirror.path.is_dir() {
            debug!("Mirror '{}' already present at {:?}", mirror.name(), mirror.path);
            mirror.check_origin()?;
        } else {
            info!("Cloning {} into {:?}", mirror.url(), mirror.path);
            let label = mirror.label(GIT_ARTIFACT_CLONE);
            mirror
                .notifier
                .run_notified(&label, true, || {
                    mirror.engine.clone_bare(mirror.url(), &mirror.path)
                })
                .map_err(|e| {
                    MirrorError::creation_failed(mirror.name().as_str(), mirror.url(), e)
                })?;
            info!("Mirror '{}' created", mirror.name());
        }

        Ok(mirror)
    }

    /// Returns the mirror name.
    pub fn name(&self) -> &MirrorName {
        self.config.name()
    }

    /// Returns the remote URL this mirror was opened with.
    pub fn url(&self) -> &str {
        self.config.url()
    }

    /// Returns the bare repository directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the ref fetched when no branch is given.
    pub fn default_branch(&self) -> &GitRef {
        self.config.default_branch()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Returns the state as seen on disk right now.
    pub fn state(&self) -> MirrorState {
        if self.path.is_dir() {
            MirrorState::Mirrored
        } else {
            MirrorState::Absent
        }
    }

    /// Returns true if the mirror directory exists.
    pub fn is_mirrored(&self) -> bool {
        self.state() == MirrorState::Mirrored
    }

    /// Returns true if a repository handle is currently held.
    pub fn is_open(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Fetches `branch` (or the default branch) from origin.
    ///
    /// Does nothing when the configured policy skips fetches.
    pub fn fetch(&self, branch: Option<&str>) -> Result<()> {
        self.fetch_with_policy(branch, self.config.policy())
    }

    /// Fetches `branch` (or the default branch) from origin under `policy`.
    pub fn fetch_with_policy(&self, branch: Option<&str>, policy: FetchPolicy) -> Result<()> {
        if policy.skips_fetch() {
            debug!(
                "Skipping fetch for mirror '{}' (ignore_fetch={}, dry_run={})",
                self.name(),
                policy.ignore_fetch,
                policy.dry_run
            );
            return Ok(());
        }

        let git_ref = match branch {
            Some(branch) => GitRef::parse(branch),
            None => self.default_branch().clone(),
        };
        git_ref.validate()?;

        let _lease = self.lease()?;
        let refspecs = vec![git_ref.fetch_refspec()];
        let label = self.label(GIT_ARTIFACT_FETCH);

        info!("Fetching {} for mirror '{}'", git_ref, self.name());

        self.notifier
            .run_notified(&label, true, || {
                let mut guard = self.handle.lock();
                let handle = match guard.take() {
                    Some(handle) => handle,
                    None => self.engine.open(&self.path)?,
                };
                let result = self.engine.fetch(&handle, ORIGIN, &refspecs);
                *guard = Some(handle);
                result
            })
            .map_err(|e| {
                warn!("Fetch failed for mirror '{}': {}", self.name(), e);
                MirrorError::fetch_failed(self.name().as_str(), git_ref.name(), ORIGIN, e)
            })
    }

    /// Releases the repository handle and removes the mirror directory.
    ///
    /// Disposing an absent mirror succeeds. On failure the directory may be
    /// partially removed; callers re-check [`state`](Self::state) or retry.
    pub fn dispose(&self) -> Result<()> {
        let _lease = self.lease()?;

        drop(self.handle.lock().take());

        let label = self.label(GIT_ARTIFACT_DISPOSE);
        self.notifier
            .run_notified(&label, true, || match fs::remove_dir_all(&self.path) {
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            })
            .map_err(|e| MirrorError::dispose_failed(self.name().as_str(), &self.path, e))?;

        info!("Mirror '{}' removed from {:?}", self.name(), self.path);
        Ok(())
    }

    fn lease(&self) -> Result<MirrorLease> {
        MirrorLease::acquire(self.config.cache_dir(), self.name())
    }

    fn label(&self, code: &str) -> String {
        self.labels
            .label(code, &json!({ "name": self.name().as_str() }))
    }

    /// Compares an existing mirror's origin with the configured URL.
    fn check_origin(&self) -> Result<()> {
        let check = self.config.origin_check();
        if check == OriginCheck::Skip {
            return Ok(());
        }

        let creation_failed =
            |e: EngineError| MirrorError::creation_failed(self.name().as_str(), self.url(), e);

        let handle = self.engine.open(&self.path).map_err(creation_failed)?;
        let actual = self
            .engine
            .remote_url(&handle, ORIGIN)
            .map_err(creation_failed)?;
        *self.handle.lock() = Some(handle);

        if actual.as_deref().is_some_and(|actual| same_url(actual, self.url())) {
            return Ok(());
        }

        let actual = actual.unwrap_or_else(|| "<none>".to_string());
        match check {
            OriginCheck::Enforce => Err(MirrorError::OriginMismatch {
                name: self.name().to_string(),
                expected: self.url().to_string(),
                actual,
            }),
            _ => {
                warn!(
                    "Mirror '{}' has origin {}, expected {}; reusing it",
                    self.name(),
                    actual,
                    self.url()
                );
                Ok(())
            },
        }
    }
}

fn same_url(a: &str, b: &str) -> bool {
    a.trim().trim_end_matches('/') == b.trim().trim_end_matches('/')
}

impl<E: GitEngine, N: Notifier> std::fmt::Debug for RemoteGitMirror<E, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteGitMirror")
            .field("name", self.name())
            .field("url", &self.url())
            .field("path", &self.path)
            .field("state", &self.state())
            .finish()
    }
}
