//! Exclusive leases on a mirror's cache path.
//!
//! A lease is a lock file created with `create_new` under the cache's
//! [`LEASE_DIR`](gitcache_core::LEASE_DIR). Holding a [`MirrorLease`] means no other cooperating process is
//! cloning, fetching or disposing the same mirror. Dropping the lease removes
//! the file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use gitcache_core::MirrorName;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MirrorError, Result};

/// Metadata written into a lease file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseMeta {
    pub name: String,
    pub pid: u32,
    pub acquired_at_ms: u64,
}

impl LeaseMeta {
    fn new(name: &MirrorName) -> Self {
        let acquired_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            pid: std::process::id(),
            acquired_at_ms,
        }
    }

    fn holder(&self) -> String {
        format!("pid {}", self.pid)
    }
}

/// An exclusive, scoped lease on one mirror.
#[derive(Debug)]
pub struct MirrorLease {
    path: PathBuf,
    meta: LeaseMeta,
    released: bool,
}

impl MirrorLease {
    /// Acquires the lease for `name` inside `cache_dir`.
    ///
    /// Fails with [`MirrorError::LeaseHeld`] if another owner holds it; never waits.
    pub fn acquire(cache_dir: &Path, name: &MirrorName) -> Result<Self> {
        let path = name.lease_path(cache_dir);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| MirrorError::Lease {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let meta = LeaseMeta::new(name);

        let mut file = match open_new_lease_file(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                let holder = read_meta(&path).map(|meta| meta.holder());
                return Err(MirrorError::LeaseHeld {
                    name: name.to_string(),
                    path,
                    holder,
                });
            },
            Err(source) => return Err(MirrorError::Lease { path, source }),
        };

        let written = serde_json::to_writer(&mut file, &meta)
            .map_err(io::Error::from)
            .and_then(|()| file.sync_all());
        if let Err(source) = written {
            let _ = fs::remove_file(&path);
            return Err(MirrorError::Lease { path, source });
        }

        debug!("Acquired lease {:?}", path);

        Ok(Self {
            path,
            meta,
            released: false,
        })
    }

    /// Removes a lease left behind by an owner that never released it.
    ///
    /// Returns the metadata of the removed lease, or `None` if no lease was
    /// held. Only call this once the recorded owner is known to be gone.
    pub fn force_release(cache_dir: &Path, name: &MirrorName) -> Result<Option<LeaseMeta>> {
        let path = name.lease_path(cache_dir);
        let meta = read_meta(&path);

        match fs::remove_file(&path) {
            Ok(()) => {
                warn!(
                    "Force-released lease {:?} (holder: {})",
                    path,
                    meta.as_ref().map_or_else(|| "unknown".to_string(), LeaseMeta::holder)
                );
                Ok(meta)
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(MirrorError::Lease { path, source }),
        }
    }

    /// Returns the lease file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the metadata recorded for this lease.
    pub fn meta(&self) -> &LeaseMeta {
        &self.meta
    }

    /// Releases the lease, reporting removal failures.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(MirrorError::Lease {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for MirrorLease {
    fn drop(&mut self) {
        if !self.released
            && let Err(err) = fs::remove_file(&self.path)
            && err.kind() != io::ErrorKind::NotFound
        {
            warn!("Failed to release lease {:?}: {}", self.path, err);
        }
    }
}

/// Reads the metadata of a lease file, if present and readable.
pub fn read_meta(path: &Path) -> Option<LeaseMeta> {
    let bytes = fs::read(path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn open_new_lease_file(path: &Path) -> io::Result<fs::File> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(path)
    }
    #[cfg(not(unix))]
    {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> MirrorName {
        MirrorName::new(s).unwrap()
    }

    #[test]
    fn test_acquire_writes_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let lease = MirrorLease::acquire(dir.path(), &name("lib")).unwrap();

        assert_eq!(lease.path(), dir.path().join(".locks").join("lib.lock"));
        let meta = read_meta(lease.path()).unwrap();
        assert_eq!(meta.name, "lib");
        assert_eq!(meta.pid, std::process::id());
        assert_eq!(&meta, lease.meta());
    }

    #[test]
    fn test_second_acquire_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let _lease = MirrorLease::acquire(dir.path(), &name("lib")).unwrap();

        let err = MirrorLease::acquire(dir.path(), &name("lib")).unwrap_err();
        match err {
            MirrorError::LeaseHeld { name, holder, .. } => {
                assert_eq!(name, "lib");
                assert_eq!(holder, Some(format!("pid {}", std::process::id())));
            },
            other => panic!("expected LeaseHeld, got {other:?}"),
        }
    }

    #[test]
    fn test_drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let lease = MirrorLease::acquire(dir.path(), &name("lib")).unwrap();
            lease.path().to_path_buf()
        };

        assert!(!path.exists());
        assert!(MirrorLease::acquire(dir.path(), &name("lib")).is_ok());
    }

    #[test]
    fn test_explicit_release() {
        let dir = tempfile::tempdir().unwrap();
        let lease = MirrorLease::acquire(dir.path(), &name("lib")).unwrap();
        let path = lease.path().to_path_buf();

        lease.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_force_release_clears_abandoned_lease() {
        let dir = tempfile::tempdir().unwrap();
        let lease = MirrorLease::acquire(dir.path(), &name("lib")).unwrap();
        let recorded = lease.meta().clone();
        // An owner that dies without unwinding never runs Drop.
        std::mem::forget(lease);

        assert!(matches!(
            MirrorLease::acquire(dir.path(), &name("lib")),
            Err(MirrorError::LeaseHeld { .. })
        ));

        let removed = MirrorLease::force_release(dir.path(), &name("lib")).unwrap();
        assert_eq!(removed, Some(recorded));
        assert!(MirrorLease::acquire(dir.path(), &name("lib")).is_ok());
    }

    #[test]
    fn test_force_release_without_lease() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(MirrorLease::force_release(dir.path(), &name("lib")).unwrap(), None);
    }

    #[test]
    fn test_independent_names() {
        let dir = tempfile::tempdir().unwrap();
        let _a = MirrorLease::acquire(dir.path(), &name("a")).unwrap();
        assert!(MirrorLease::acquire(dir.path(), &name("b")).is_ok());
    }
}
