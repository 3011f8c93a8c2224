//! Cooperative cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation for long-running operations.
///
/// The rule engine checks between fact pairs; an in-flight leaf walk is
/// bounded and always runs to completion. A cancelled run is recorded
/// with a distinct status, never silently dropped. Tokens are shared
/// across worker threads.
pub trait Cancellable: Send + Sync {
    /// Check if cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Request cancellation.
    fn cancel(&self);
}

/// Default implementation of a cancellation token.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancellation token (not cancelled).
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
