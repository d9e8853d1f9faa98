//! Mirror configuration.

use std::path::{Path, PathBuf};

use gitcache_core::{GitRef, MirrorName};
use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};

/// Orchestration flags that turn fetches into no-ops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchPolicy {
    /// Skip fetching entirely and build from whatever the mirror holds.
    #[serde(default)]
    pub ignore_fetch: bool,

    /// Plan only; nothing may touch the network.
    #[serde(default)]
    pub dry_run: bool,
}

impl FetchPolicy {
    /// A policy that never skips.
    pub const FETCH: Self = Self {
        ignore_fetch: false,
        dry_run: false,
    };

    /// Returns true if fetches must be skipped.
    pub fn skips_fetch(&self) -> bool {
        self.ignore_fetch || self.dry_run
    }
}

/// What to do when an existing mirror's origin differs from the requested URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginCheck {
    /// Reuse the mirror without looking at its origin.
    #[default]
    Skip,
    /// Reuse the mirror but log a warning on mismatch.
    Warn,
    /// Refuse to open a mirror whose origin differs.
    Enforce,
}

/// Configuration for one remote mirror.
///
/// Deserialized values pass through [`MirrorConfigBuilder::build`], so they
/// are validated exactly like built ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawMirrorConfig")]
pub struct MirrorConfig {
    /// Logical name; the mirror lives at `cache_dir/name`.
    name: MirrorName,

    /// The remote repository URL (path, file, SSH or HTTPS).
    url: String,

    /// Directory holding all mirrors and their leases.
    cache_dir: PathBuf,

    /// Ref fetched when none is requested.
    default_branch: GitRef,

    /// Fetch skip flags.
    policy: FetchPolicy,

    /// Consistency check applied to already existing mirrors.
    origin_check: OriginCheck,
}

/// Unvalidated wire form of [`MirrorConfig`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMirrorConfig {
    name: String,
    url: String,
    cache_dir: PathBuf,
    #[serde(default)]
    default_branch: Option<GitRef>,
    #[serde(default)]
    policy: FetchPolicy,
    #[serde(default)]
    origin_check: OriginCheck,
}

impl TryFrom<RawMirrorConfig> for MirrorConfig {
    type Error = MirrorError;

    fn try_from(raw: RawMirrorConfig) -> Result<Self> {
        let builder = MirrorConfig::builder()
            .name(raw.name)
            .url(raw.url)
            .cache_dir(raw.cache_dir)
            .policy(raw.policy)
            .origin_check(raw.origin_check);

        match raw.default_branch {
            Some(branch) => builder.default_branch(branch),
            None => builder,
        }
        .build()
    }
}

impl MirrorConfig {
    /// Creates a new builder for MirrorConfig.
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::default()
    }

    /// Returns the mirror name.
    pub fn name(&self) -> &MirrorName {
        &self.name
    }

    /// Returns the remote URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the on-disk location of the bare mirror.
    pub fn mirror_path(&self) -> PathBuf {
        self.name.mirror_path(&self.cache_dir)
    }

    /// Returns the default branch.
    pub fn default_branch(&self) -> &GitRef {
        &self.default_branch
    }

    /// Returns the fetch policy.
    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    /// Returns the origin consistency check.
    pub fn origin_check(&self) -> OriginCheck {
        self.origin_check
    }
}

/// Builder for MirrorConfig.
#[derive(Debug, Default, Clone)]
pub struct MirrorConfigBuilder {
    name: Option<String>,
    url: Option<String>,
    cache_dir: Option<PathBuf>,
    default_branch: Option<GitRef>,
    policy: FetchPolicy,
    origin_check: OriginCheck,
}

impl MirrorConfigBuilder {
    /// Sets the mirror name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the remote URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the cache directory.
    pub fn cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    /// Sets the default branch.
    pub fn default_branch(mut self, branch: impl Into<GitRef>) -> Self {
        self.default_branch = Some(branch.into());
        self
    }

    /// Sets the fetch policy.
    pub fn policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the ignore-fetch flag.
    pub fn ignore_fetch(mut self, ignore: bool) -> Self {
        self.policy.ignore_fetch = ignore;
        self
    }

    /// Sets the dry-run flag.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.policy.dry_run = dry_run;
        self
    }

    /// Sets the origin consistency check.
    pub fn origin_check(mut self, check: OriginCheck) -> Self {
        self.origin_check = check;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or the name or
    /// default branch is invalid.
    pub fn build(self) -> Result<MirrorConfig> {
        let name = self
            .name
            .ok_or_else(|| MirrorError::invalid_config("name is required"))?;
        let name = MirrorName::new(name)?;

        let url = self
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| MirrorError::invalid_config("url is required"))?;

        let cache_dir = self
            .cache_dir
            .ok_or_else(|| MirrorError::invalid_config("cache_dir is required"))?;

        let default_branch = self.default_branch.unwrap_or_default();
        default_branch.validate()?;

        Ok(MirrorConfig {
            name,
            url,
            cache_dir,
            default_branch,
            policy: self.policy,
            origin_check: self.origin_check,
        })
    }
}
