//! Graceful halt coordination
//!
//! Ctrl-C (or a caller-imposed stop) must not interrupt a fetch already in
//! flight, since that can leave a partial spreadsheet behind. The signal is
//! instead observed between period downloads: the orchestrator checks the
//! latch at each period boundary and during retry waits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared handle to a halt signal.
pub type SharedHalt = Arc<HaltSignal>;

/// One-way latch requesting the run stop at the next period boundary.
#[derive(Debug, Default)]
pub struct HaltSignal {
    halted: AtomicBool,
    notify: Notify,
}

impl HaltSignal {
    /// Create a new signal.
    pub fn new() -> Self {
        Self {
            halted: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Create a new shared signal wrapped in [`Arc`].
    pub fn shared() -> SharedHalt {
        Arc::new(Self::new())
    }

    /// Request a halt. Wakes all waiters exactly once.
    pub fn request_halt(&self) {
        if !self.halted.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether a halt has been requested.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Wait until a halt is requested. Returns immediately if already set.
    pub async fn halted(&self) {
        if self.is_halted() {
            return;
        }
        self.notify.notified().await;
    }
}
