//! Git reference types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A Git reference (branch, tag, or commit) requested from a remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum GitRef {
    /// A branch reference (e.g., "main", "develop").
    Branch(String),

    /// A tag reference (e.g., "v1.0.0").
    Tag(String),

    /// A commit SHA (full 40 hex characters).
    Commit(String),
}

impl GitRef {
    /// Creates a branch reference.
    pub fn branch(name: impl Into<String>) -> Self {
        Self::Branch(name.into())
    }

    /// Creates a tag reference.
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Creates a commit reference.
    pub fn commit(sha: impl Into<String>) -> Self {
        Self::Commit(sha.into())
    }

    /// Parses a user-supplied ref string.
    ///
    /// - 40-character hex string → Commit
    /// - Starts with "refs/tags/" or "tags/" → Tag
    /// - Otherwise → Branch, with an optional "refs/heads/" prefix stripped
    pub fn parse(label: &str) -> Self {
        let label = label.trim();

        if label.len() == 40 && label.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::Commit(label.to_string());
        }

        if let Some(tag_name) = label
            .strip_prefix("refs/tags/")
            .or_else(|| label.strip_prefix("tags/"))
        {
            return Self::Tag(tag_name.to_string());
        }

        if let Some(branch_name) = label.strip_prefix("refs/heads/") {
            return Self::Branch(branch_name.to_string());
        }

        Self::Branch(label.to_string())
    }

    /// Returns the reference name without prefix.
    pub fn name(&self) -> &str {
        match self {
            Self::Branch(name) | Self::Tag(name) | Self::Commit(name) => name,
        }
    }

    /// Returns the full Git reference path.
    pub fn full_ref(&self) -> String {
        match self {
            Self::Branch(name) => format!("refs/heads/{}", name),
            Self::Tag(name) => format!("refs/tags/{}", name),
            Self::Commit(sha) => sha.clone(),
        }
    }

    /// Returns the fetch refspec that mirrors this reference locally.
    ///
    /// Branches and tags map onto the same ref name in the bare mirror and are
    /// force-updated, so a rewritten remote history simply moves the local ref.
    pub fn fetch_refspec(&self) -> String {
        match self {
            Self::Branch(_) | Self::Tag(_) => {
                let full = self.full_ref();
                format!("+{full}:{full}")
            },
            Self::Commit(sha) => sha.clone(),
        }
    }

    /// Returns true if this is a branch reference.
    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }

    /// Returns true if this is a tag reference.
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }

    /// Returns true if this is a commit reference.
    pub fn is_commit(&self) -> bool {
        matches!(self, Self::Commit(_))
    }

    /// Validates the reference name.
    pub fn validate(&self) -> Result<()> {
        let name = self.name();
        let invalid = |reason: &str| Err(CoreError::invalid_ref(name, reason));

        if name.is_empty() {
            return invalid("reference name cannot be empty");
        }

        if name.starts_with('/') || name.ends_with('/') {
            return invalid("reference name cannot start or end with '/'");
        }

        if name.contains("..") {
            return invalid("reference name cannot contain '..'");
        }

        if name.contains("//") {
            return invalid("reference name cannot contain '//'");
        }

        if name.ends_with(".lock") {
            return invalid("reference name cannot end with '.lock'");
        }

        if name.chars().any(|c| {
            c.is_control() || matches!(c, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\')
        }) {
            return invalid("reference name contains invalid characters");
        }

        Ok(())
    }
}

impl Default for GitRef {
    fn default() -> Self {
        Self::Branch("main".to_string())
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(name) => write!(f, "{}", name),
            Self::Tag(name) => write!(f, "tags/{}", name),
            Self::Commit(sha) => write!(f, "{}", &sha[..8.min(sha.len())]),
        }
    }
}

impl From<&str> for GitRef {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for GitRef {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<GitRef> for String {
    fn from(git_ref: GitRef) -> Self {
        match git_ref {
            GitRef::Tag(_) => git_ref.full_ref(),
            GitRef::Branch(name) | GitRef::Commit(name) => name,
        }
    }
}
