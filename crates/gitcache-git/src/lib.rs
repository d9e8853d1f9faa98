//! # gitcache Git mirrors
//!
//! Locally cached bare mirrors of remote Git repositories, used as a source of
//! file content by downstream build steps.
//!
//! A [`RemoteGitMirror`] clones its remote on first use, fetches single refs
//! on demand and removes itself from disk when disposed. Whether a remote is
//! mirrored is decided solely by the presence of its directory in the cache.
//!
//! ## Features
//!
//! - Git operations via gix (pure Rust) behind the [`GitEngine`] trait
//! - Explicit fetch policy (`ignore_fetch`, `dry_run`) instead of global flags
//! - Lock-file leases so concurrent builds sharing a cache fail fast
//! - Optional origin URL consistency check for existing mirrors
//! - Layered settings from file and `GITCACHE_*` environment variables
//!
//! ## Example
//!
//! ```ignore
//! use gitcache_git::{MirrorConfig, RemoteGitMirror};
//!
//! let config = MirrorConfig::builder()
//!     .name("lib")
//!     .url("https://example.com/lib.git")
//!     .cache_dir("/var/cache/gitcache")
//!     .build()?;
//!
//! let mirror = RemoteGitMirror::open(config)?;
//! mirror.fetch(Some("main"))?;
//! // read files from mirror.path() ...
//! mirror.dispose()?;
//! ```

pub mod engine;
pub mod error;
pub mod lease;
pub mod mirror;
pub mod notify;
pub mod settings;

// Re-exports
pub use engine::{GitEngine, GixEngine, ORIGIN};
pub use error::{EngineError, MirrorError, Result};
pub use lease::MirrorLease;
pub use mirror::{
    FetchPolicy, MirrorConfig, MirrorConfigBuilder, MirrorState, OriginCheck, RemoteGitMirror,
};
pub use notify::{Notifier, TracingNotifier};
pub use settings::MirrorSettings;

// Re-export gitcache_core for consumers
pub use gitcache_core;
