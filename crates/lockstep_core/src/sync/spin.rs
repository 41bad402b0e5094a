//! # Spin Policy
//!
//! How a barrier busy-waits. Spinning trades a core per waiter for wake-up
//! latency measured in nanoseconds instead of a scheduler round trip.

use serde::{Deserialize, Serialize};

/// Default number of polls before a waiter starts yielding its time slice.
pub const DEFAULT_SPINS_BEFORE_YIELD: u32 = 1024;

/// Busy-wait behaviour for [`SpinBarrier`](super::SpinBarrier).
///
/// A waiter polls with [`std::hint::spin_loop`]. With `yield_to_scheduler`
/// set, once `spins_before_yield` polls have failed it calls
/// [`std::thread::yield_now`] between polls instead, which keeps a team
/// larger than the number of cores from starving the member it waits for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpinPolicy {
    /// Polls before falling back to yielding.
    pub spins_before_yield: u32,
    /// Whether to yield at all. `false` spins forever on the CPU.
    pub yield_to_scheduler: bool,
}

impl Default for SpinPolicy {
    fn default() -> Self {
        Self::yielding_after(DEFAULT_SPINS_BEFORE_YIELD)
    }
}

impl SpinPolicy {
    /// Never yields. Lowest latency, one fully busy core per waiter.
    #[must_use]
    pub const fn pure() -> Self {
        Self {
            spins_before_yield: 0,
            yield_to_scheduler: false,
        }
    }

    /// Spins `spins` times, then yields between polls.
    #[must_use]
    pub const fn yielding_after(spins: u32) -> Self {
        Self {
            spins_before_yield: spins,
            yield_to_scheduler: true,
        }
    }

    /// Polls `done` until it returns true.
    #[inline]
    pub fn spin_until(&self, mut done: impl FnMut() -> bool) {
        let mut spins = 0u32;
        while !done() {
            if self.yield_to_scheduler && spins >= self.spins_before_yield {
                std::thread::yield_now();
            } else {
                spins = spins.saturating_add(1);
                std::hint::spin_loop();
            }
        }
    }
}
