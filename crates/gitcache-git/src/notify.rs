//! Progress notification around long-running operations.

use std::time::Instant;

use tracing::{info, info_span, warn};

/// Wraps an operation for progress and logging purposes.
///
/// Implementations must run `work` exactly once, synchronously, and hand its
/// result back unchanged. They observe operations; they never alter them.
pub trait Notifier: Send + Sync {
    /// Runs `work` under a notification labelled `label`.
    ///
    /// `short` asks for a compact rendering (a single line once the work
    /// finishes) instead of separate start and finish records.
    fn run_notified<T, E>(
        &self,
        label: &str,
        short: bool,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E>;
}

/// Notifier that records operations as `tracing` spans and events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn run_notified<T, E>(
        &self,
        label: &str,
        short: bool,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let span = info_span!("git_operation", label, short);
        let _enter = span.enter();

        if !short {
            info!("{} started", label);
        }

        let started = Instant::now();
        let result = work();
        let elapsed = started.elapsed();

        match &result {
            Ok(_) => info!("{} [OK] ({:.2?})", label, elapsed),
            Err(_) => warn!("{} [FAILED] ({:.2?})", label, elapsed),
        }

        result
    }
}
