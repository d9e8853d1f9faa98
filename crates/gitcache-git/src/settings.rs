//! Layered settings shared by every mirror of a cache.
//!
//! Values come from an optional configuration file, then from `GITCACHE_*`
//! environment variables, later sources winning:
//!
//! | key              | env var                    | default |
//! |------------------|----------------------------|---------|
//! | `cache_dir`      | `GITCACHE_CACHE_DIR`       | -       |
//! | `default_branch` | `GITCACHE_DEFAULT_BRANCH`  | `main`  |
//! | `ignore_fetch`   | `GITCACHE_IGNORE_FETCH`    | `false` |
//! | `dry_run`        | `GITCACHE_DRY_RUN`         | `false` |
//! | `origin_check`   | `GITCACHE_ORIGIN_CHECK`    | `skip`  |

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{MirrorError, Result};
use crate::mirror::{FetchPolicy, MirrorConfig, MirrorConfigBuilder, OriginCheck};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "GITCACHE";

/// Settings applied to all mirrors created from them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MirrorSettings {
    pub cache_dir: PathBuf,

    #[serde(default = "default_branch")]
    pub default_branch: String,

    #[serde(default)]
    pub ignore_fetch: bool,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub origin_check: OriginCheck,
}

fn default_branch() -> String {
    "main".to_string()
}

impl MirrorSettings {
    /// Loads settings from `file` (if given) and the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_sources(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads settings from `file` (if given) and an explicit variable map.
    ///
    /// Keys are full variable names such as `GITCACHE_CACHE_DIR`.
    pub fn from_vars(file: Option<&Path>, vars: config::Map<String, String>) -> Result<Self> {
        Self::from_sources(file, Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn from_sources(file: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(env.try_parsing(true))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| MirrorError::invalid_config(e.to_string()))
    }

    /// Returns the fetch policy described by these settings.
    pub fn policy(&self) -> FetchPolicy {
        FetchPolicy {
            ignore_fetch: self.ignore_fetch,
            dry_run: self.dry_run,
        }
    }

    /// Returns a builder for mirror `name` of `url`, pre-filled from these settings.
    pub fn mirror(&self, name: impl Into<String>, url: impl Into<String>) -> MirrorConfigBuilder {
        MirrorConfig::builder()
            .name(name)
            .url(url)
            .cache_dir(&self.cache_dir)
            .default_branch(self.default_branch.as_str())
            .policy(self.policy())
            .origin_check(self.origin_check)
    }
}
