//! Per-instance readiness state.
//!
//! Each instance owns exactly one readiness flag: whether it is currently
//! willing to receive traffic. The orchestrator polls `/ready` and routes
//! traffic accordingly; nothing inside this process gates on the flag.
//! Liveness is deliberately stateless ("the process can answer at all") so a
//! hung external dependency can never be mistaken for a hung process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owns this instance's readiness flag.
///
/// Constructed fresh per process (and per test) rather than living in a
/// process-wide static. The flag starts `true` and resets to `true` on every
/// restart; it is never shared across instances.
#[derive(Clone)]
pub struct ReadinessController {
    // Single word-sized flag with no ordering relationship to other data.
    ready: Arc<AtomicBool>,
}

impl ReadinessController {
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Current value of the readiness flag. No side effects.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Unconditionally overwrite the readiness flag. Idempotent; takes effect
    /// at the orchestrator's next readiness poll, whenever that is.
    pub fn set_ready(&self, value: bool) {
        self.ready.store(value, Ordering::Relaxed);
    }

    /// Kill this instance immediately, with no cleanup and no graceful
    /// shutdown. Exists so an operator can exercise the platform's restart
    /// behavior; the platform is expected to bring up a replacement.
    pub fn crash(&self) -> ! {
        std::process::exit(1);
    }
}

impl Default for ReadinessController {
    fn default() -> Self {
        Self::new()
    }
}
