//! # Rendezvous Primitives
//!
//! ## The Problem
//!
//! ```text
//! Cycle i:    A B C D  all arrive → all released
//! Cycle i+1:  A (fast) re-enters wait() while D is still leaving cycle i
//!
//! One counter:  A's increment lands in cycle i's count → CORRUPTED
//! Two counters: last arriver holds the lock until B C D have departed
//! ```
//!
//! ## The Solution: Two Counts
//!
//! [`SpinBarrier`] keeps an *arrival* count, guarded by a lock, and a
//! *departure* count, bumped atomically outside it. The last arriver resets
//! both, releases everyone by publishing `arrived = 0`, and keeps the lock
//! until every peer has bumped `departed`. Nobody can enter the next cycle
//! until the current one is empty.
//!
//! [`ParkingBarrier`] gives the same guarantees with a condition variable
//! and a generation counter, for hosts where spinning is too expensive.

mod parking_barrier;
mod spin;
mod spin_barrier;

pub use parking_barrier::ParkingBarrier;
pub use spin::{SpinPolicy, DEFAULT_SPINS_BEFORE_YIELD};
pub use spin_barrier::SpinBarrier;

/// A barrier shared by a fixed team of N members.
///
/// ## Contract
///
/// - Every member calls [`wait`](Rendezvous::wait) once per phase boundary,
///   the same number of times as every other member.
/// - Everything a member wrote before its `wait()` in cycle *i* is visible to
///   every member once their own `wait()` in cycle *i* returns.
/// - Fewer or more than N callers per cycle deadlocks. There is no timeout.
pub trait Rendezvous: Send + Sync {
    /// Number of members (N) that must arrive before anyone is released.
    fn team_size(&self) -> usize;

    /// Blocks until all N members have called `wait()` for this cycle.
    fn wait(&self);
}

impl<R: Rendezvous + ?Sized> Rendezvous for &R {
    #[inline]
    fn team_size(&self) -> usize {
        (**self).team_size()
    }

    #[inline]
    fn wait(&self) {
        (**self).wait();
    }
}

impl<R: Rendezvous + ?Sized> Rendezvous for std::sync::Arc<R> {
    #[inline]
    fn team_size(&self) -> usize {
        (**self).team_size()
    }

    #[inline]
    fn wait(&self) {
        (**self).wait();
    }
}
