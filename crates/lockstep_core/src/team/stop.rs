//! # Stop Signal
//!
//! External request to end a running team. Raising it does not interrupt
//! anything: the team finishes the cycle in progress and every member leaves
//! at the same phase-0 boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle that asks a [`WorkerTeam`](super::WorkerTeam) to stop.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates a lowered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop at the end of the current cycle.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Lowers the signal so the team can be run again.
    pub fn reset(&self) {
        self.raised.store(false, Ordering::Release);
    }

    /// Whether a stop was requested.
    #[inline]
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}
