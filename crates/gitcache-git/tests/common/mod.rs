//! Test helpers for gitcache-git.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use gitcache_git::{EngineError, GitEngine, MirrorConfig, MirrorConfigBuilder, Notifier};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A call observed by [`FakeEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Clone { url: String, path: PathBuf },
    Open { path: PathBuf },
    Fetch { remote: String, refspecs: Vec<String> },
}

#[derive(Debug, Default)]
struct FakeState {
    calls: Mutex<Vec<Call>>,
    fail_clone: AtomicBool,
    partial_clone: AtomicBool,
    fail_fetch: AtomicBool,
    live_handles: Arc<AtomicUsize>,
}

/// In-memory engine that simulates clones by writing a minimal bare layout.
///
/// Clones share state, so a test keeps one copy to inspect while the mirror
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    state: Arc<FakeState>,
}

/// Handle returned by [`FakeEngine::open`]; tracks how many are alive.
#[derive(Debug)]
pub struct FakeHandle {
    path: PathBuf,
    live: Arc<AtomicUsize>,
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().clone()
    }

    pub fn clone_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Clone { .. }))
    }

    pub fn fetch_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Fetch { .. }))
    }

    pub fn fetched_refspecs(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Fetch { refspecs, .. } => Some(refspecs),
                _ => None,
            })
            .collect()
    }

    pub fn live_handles(&self) -> usize {
        self.state.live_handles.load(Ordering::SeqCst)
    }

    /// Makes clones fail; with `partial` a half-written directory is left behind.
    pub fn fail_clones(&self, fail: bool, partial: bool) {
        self.state.fail_clone.store(fail, Ordering::SeqCst);
        self.state.partial_clone.store(partial, Ordering::SeqCst);
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.state.fail_fetch.store(fail, Ordering::SeqCst);
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.calls.lock().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.state.calls.lock().push(call);
    }
}

impl GitEngine for FakeEngine {
    type Handle = FakeHandle;

    fn clone_bare(&self, url: &str, path: &Path) -> Result<(), EngineError> {
        self.record(Call::Clone {
            url: url.to_string(),
            path: path.to_path_buf(),
        });

        if self.state.fail_clone.load(Ordering::SeqCst) {
            if self.state.partial_clone.load(Ordering::SeqCst) {
                std::fs::create_dir_all(path.join("objects"))?;
            }
            return Err(EngineError::clone_failed("network unreachable"));
        }

        std::fs::create_dir_all(path.join("refs").join("heads"))?;
        std::fs::create_dir_all(path.join("objects"))?;
        std::fs::write(path.join("HEAD"), "ref: refs/heads/main\n")?;
        std::fs::write(
            path.join("config"),
            format!("[core]\n\tbare = true\n[remote \"origin\"]\n\turl = {url}\n"),
        )?;
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<Self::Handle, EngineError> {
        self.record(Call::Open {
            path: path.to_path_buf(),
        });

        if !path.join("HEAD").is_file() {
            return Err(EngineError::open(path, "not a repository"));
        }

        self.state.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(FakeHandle {
            path: path.to_path_buf(),
            live: Arc::clone(&self.state.live_handles),
        })
    }

    fn fetch(
        &self,
        _handle: &Self::Handle,
        remote: &str,
        refspecs: &[String],
    ) -> Result<(), EngineError> {
        self.record(Call::Fetch {
            remote: remote.to_string(),
            refspecs: refspecs.to_vec(),
        });

        if self.state.fail_fetch.load(Ordering::SeqCst) {
            return Err(EngineError::fetch_failed("couldn't find remote ref"));
        }
        Ok(())
    }

    fn remote_url(
        &self,
        handle: &Self::Handle,
        remote: &str,
    ) -> Result<Option<String>, EngineError> {
        let config = std::fs::read_to_string(handle.path.join("config"))?;
        let section = format!("[remote \"{remote}\"]");

        Ok(config
            .split_once(section.as_str())
            .and_then(|(_, rest)| rest.lines().find_map(|l| l.trim().strip_prefix("url = ")))
            .map(str::to_string))
    }
}

/// Notifier that records every label it wraps.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    labels: Arc<Mutex<Vec<(String, bool)>>>,
}

impl RecordingNotifier {
    pub fn labels(&self) -> Vec<(String, bool)> {
        self.labels.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn run_notified<T, E>(
        &self,
        label: &str,
        short: bool,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.labels.lock().push((label.to_string(), short));
        work()
    }
}

/// Returns a builder for mirror `name` in `cache_dir`.
pub fn mirror_config(cache_dir: &Path, name: &str, url: &str) -> MirrorConfigBuilder {
    MirrorConfig::builder()
        .name(name)
        .url(url)
        .cache_dir(cache_dir)
}

/// Returns true if the `git` CLI is available for building fixtures.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Runs `git` in `dir`, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "gitcache")
        .env("GIT_AUTHOR_EMAIL", "gitcache@example.com")
        .env("GIT_COMMITTER_NAME", "gitcache")
        .env("GIT_COMMITTER_EMAIL", "gitcache@example.com")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .expect("failed to run git");

    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Creates an upstream repository with one commit on `main`.
pub fn upstream_repo(dir: &Path) -> PathBuf {
    let repo = dir.join("upstream");
    std::fs::create_dir_all(&repo).unwrap();
    git(&repo, &["init", "--quiet", "--initial-branch=main"]);
    commit_file(&repo, "README.md", "hello\n");
    repo
}

/// Writes `file` and commits it, returning the new tip.
pub fn commit_file(repo: &Path, file: &str, contents: &str) -> String {
    std::fs::write(repo.join(file), contents).unwrap();
    git(repo, &["add", file]);
    git(repo, &["commit", "--quiet", "-m", &format!("update {file}")]);
    git(repo, &["rev-parse", "HEAD"])
}
