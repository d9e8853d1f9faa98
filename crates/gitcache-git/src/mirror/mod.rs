//! Remote mirror lifecycle.
//!
//! This module provides the bare mirror itself and its configuration.

mod config;
mod remote;

pub use config::{FetchPolicy, MirrorConfig, MirrorConfigBuilder, OriginCheck};
pub use remote::{MirrorState, RemoteGitMirror};
