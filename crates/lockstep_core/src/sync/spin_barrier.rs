//! # Two-Count Spin Barrier
//!
//! ```text
//!                 ┌──────────────────────────────┐
//!   wait() ─────▶ │ lock ─ arrived += 1          │
//!                 │   │                          │
//!                 │   ├─ arrived < N ──▶ unlock  │──▶ spin until arrived == 0
//!                 │   │                          │        │
//!                 │   │                          │        ▼
//!                 │   │                          │    departed += 1 ──▶ return
//!                 │   │                          │
//!                 │   └─ arrived == N            │
//!                 │        departed = 0          │
//!                 │        arrived  = 0 (release)│
//!                 │        spin until departed == N-1
//!                 │      unlock ─────────────────│──▶ return
//!                 └──────────────────────────────┘
//! ```
//!
//! The last arriver keeps the lock until every peer has departed, so a fast
//! member that loops straight back into `wait()` queues on the lock instead
//! of bumping a count that still belongs to the previous cycle.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{Rendezvous, SpinPolicy};
use crate::error::{LockstepError, LockstepResult};

/// Reusable barrier for a fixed team, built from one lock and two spin loops.
///
/// ## Usage
///
/// ```rust
/// use lockstep_core::SpinBarrier;
///
/// let barrier = SpinBarrier::new(3);
/// std::thread::scope(|s| {
///     for _ in 0..3 {
///         s.spawn(|| {
///             for _phase in 0..100 {
///                 // ... phase work ...
///                 barrier.wait();
///             }
///         });
///     }
/// });
/// assert_eq!(barrier.cycles(), 100);
/// assert!(barrier.is_quiescent());
/// ```
///
/// ## Cost
///
/// Waiters burn CPU while they wait (see [`SpinPolicy`]). Use
/// [`ParkingBarrier`](super::ParkingBarrier) when members routinely wait a
/// long time for each other.
#[derive(Debug)]
pub struct SpinBarrier {
    /// Number of members (N).
    team_size: usize,
    /// Guards every mutation of `arrived`.
    arrival_lock: Mutex<()>,
    /// Members blocked in the current cycle. Spinners read it without the lock.
    arrived: AtomicUsize,
    /// Members that have observed release of the current cycle.
    departed: AtomicUsize,
    /// Completed cycles.
    cycles: AtomicU64,
    /// Busy-wait behaviour.
    spin: SpinPolicy,
}

impl SpinBarrier {
    /// Creates a barrier for `team_size` members with the default spin policy.
    ///
    /// # Panics
    ///
    /// Panics if `team_size` is zero.
    #[must_use]
    pub fn new(team_size: usize) -> Self {
        assert!(team_size > 0, "team size must be at least 1");
        Self::with_policy(team_size, SpinPolicy::default())
    }

    /// Creates a barrier, reporting a zero team size as an error.
    ///
    /// # Errors
    ///
    /// Returns [`LockstepError::EmptyTeam`] if `team_size` is zero.
    pub fn try_new(team_size: usize) -> LockstepResult<Self> {
        if team_size == 0 {
            return Err(LockstepError::EmptyTeam);
        }
        Ok(Self::with_policy(team_size, SpinPolicy::default()))
    }

    /// Creates a barrier with an explicit spin policy.
    ///
    /// # Panics
    ///
    /// Panics if `team_size` is zero.
    #[must_use]
    pub fn with_policy(team_size: usize, spin: SpinPolicy) -> Self {
        assert!(team_size > 0, "team size must be at least 1");
        Self {
            team_size,
            arrival_lock: Mutex::new(()),
            arrived: AtomicUsize::new(0),
            // Start in the drained state: every peer of a (virtual) previous
            // cycle has already left.
            departed: AtomicUsize::new(team_size - 1),
            cycles: AtomicU64::new(0),
            spin,
        }
    }

    /// Number of members (N).
    #[inline]
    #[must_use]
    pub fn team_size(&self) -> usize {
        self.team_size
    }

    /// The spin policy waiters use.
    #[inline]
    #[must_use]
    pub fn spin_policy(&self) -> SpinPolicy {
        self.spin
    }

    /// Members currently blocked in the current cycle. Always below N.
    #[inline]
    #[must_use]
    pub fn arrived(&self) -> usize {
        self.arrived.load(Ordering::Acquire)
    }

    /// Members that have left the most recent released cycle.
    #[inline]
    #[must_use]
    pub fn departed(&self) -> usize {
        self.departed.load(Ordering::Acquire)
    }

    /// Released members of the latest cycle that have not yet left `wait()`.
    #[inline]
    #[must_use]
    pub fn outstanding_departures(&self) -> usize {
        (self.team_size - 1).saturating_sub(self.departed())
    }

    /// True when nobody is inside `wait()`: no arrivals pending and every
    /// released member has left.
    ///
    /// The two counts are sampled one after the other, so the answer is only
    /// exact when the caller knows no member can be entering concurrently.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.arrived() == 0 && self.outstanding_departures() == 0
    }

    /// Number of cycles released so far.
    #[inline]
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Acquire)
    }

    /// Blocks until all `team_size` members have called `wait()`.
    ///
    /// Must be called exactly once per cycle by each of the N members.
    /// A missing or extra caller deadlocks the whole team.
    pub fn wait(&self) {
        let guard = self.arrival_lock.lock();
        let arrived = self.arrived.load(Ordering::Relaxed) + 1;

        if arrived == self.team_size {
            // Last arriver: reset for the next cycle before anyone can enter it.
            self.departed.store(0, Ordering::Relaxed);
            self.cycles.fetch_add(1, Ordering::Relaxed);
            self.arrived.store(0, Ordering::Release);

            let peers = self.team_size - 1;
            self.spin.spin_until(|| self.departed.load(Ordering::Acquire) == peers);
            drop(guard);
            return;
        }

        self.arrived.store(arrived, Ordering::Release);
        drop(guard);

        // Released once the last arriver publishes the reset.
        self.spin.spin_until(|| self.arrived.load(Ordering::Acquire) == 0);
        self.departed.fetch_add(1, Ordering::AcqRel);
    }
}

impl Rendezvous for SpinBarrier {
    #[inline]
    fn team_size(&self) -> usize {
        self.team_size
    }

    #[inline]
    fn wait(&self) {
        SpinBarrier::wait(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barrier_creation() {
        let barrier = SpinBarrier::new(4);
        assert_eq!(barrier.team_size(), 4);
        assert_eq!(barrier.arrived(), 0);
        assert_eq!(barrier.departed(), 3);
        assert_eq!(barrier.outstanding_departures(), 0);
        assert_eq!(barrier.cycles(), 0);
        assert!(barrier.is_quiescent());
    }

    #[test]
    #[should_panic(expected = "team size must be at least 1")]
    fn test_zero_team_panics() {
        let _ = SpinBarrier::new(0);
    }

    #[test]
    fn test_try_new_rejects_zero() {
        assert_eq!(SpinBarrier::try_new(0).unwrap_err(), LockstepError::EmptyTeam);
        assert_eq!(SpinBarrier::try_new(2).unwrap().team_size(), 2);
    }

    #[test]
    fn test_with_policy_is_kept() {
        let barrier = SpinBarrier::with_policy(2, SpinPolicy::pure());
        assert_eq!(barrier.spin_policy(), SpinPolicy::pure());
        assert_eq!(SpinBarrier::new(2).spin_policy(), SpinPolicy::default());

        std::thread::scope(|s| {
            s.spawn(|| barrier.wait());
            barrier.wait();
        });
        assert_eq!(barrier.cycles(), 1);
        assert!(barrier.is_quiescent());
    }

    #[test]
    fn test_single_member_never_blocks() {
        let barrier = SpinBarrier::with_policy(1, SpinPolicy::pure());
        for _ in 0..1000 {
            barrier.wait();
        }
        assert_eq!(barrier.cycles(), 1000);
        assert!(barrier.is_quiescent());
    }

    #[test]
    fn test_two_members_many_cycles() {
        let barrier = SpinBarrier::new(2);
        std::thread::scope(|s| {
            for _ in 0..2 {
                s.spawn(|| {
                    for _ in 0..5000 {
                        barrier.wait();
                    }
                });
            }
        });
        assert_eq!(barrier.cycles(), 5000);
        assert!(barrier.is_quiescent());
    }

    #[test]
    fn test_writes_before_wait_are_visible_after() {
        const TEAM: usize = 3;
        const CYCLES: u64 = 2000;

        let barrier = SpinBarrier::new(TEAM);
        let slots: Vec<AtomicU64> = (0..TEAM).map(|_| AtomicU64::new(0)).collect();

        std::thread::scope(|s| {
            for me in 0..TEAM {
                let (barrier, slots) = (&barrier, &slots);
                s.spawn(move || {
                    for cycle in 1..=CYCLES {
                        slots[me].store(cycle, Ordering::Relaxed);
                        barrier.wait();
                        for slot in slots {
                            assert_eq!(slot.load(Ordering::Relaxed), cycle);
                        }
                        barrier.wait();
                    }
                });
            }
        });
    }
}
