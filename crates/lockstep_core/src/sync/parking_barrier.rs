//! # Parking Barrier
//!
//! Condition-variable barrier with the [`SpinBarrier`](super::SpinBarrier)
//! contract. Waiters sleep instead of spinning; release costs a wake-up.
//!
//! Reuse is made safe by a generation counter instead of a departure count:
//! a waiter only leaves once the generation it arrived in has been closed,
//! and a member re-entering early joins the next generation's count.

use parking_lot::{Condvar, Mutex};

use super::Rendezvous;
use crate::error::{LockstepError, LockstepResult};

#[derive(Debug)]
struct ParkingState {
    /// Members arrived in the open generation.
    arrived: usize,
    /// Closed generations (released cycles).
    generation: u64,
}

/// Reusable barrier that parks waiting threads on a condition variable.
#[derive(Debug)]
pub struct ParkingBarrier {
    team_size: usize,
    state: Mutex<ParkingState>,
    released: Condvar,
}

impl ParkingBarrier {
    /// Creates a barrier for `team_size` members.
    ///
    /// # Panics
    ///
    /// Panics if `team_size` is zero.
    #[must_use]
    pub fn new(team_size: usize) -> Self {
        assert!(team_size > 0, "team size must be at least 1");
        Self {
            team_size,
            state: Mutex::new(ParkingState {
                arrived: 0,
                generation: 0,
            }),
            released: Condvar::new(),
        }
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
        Ok(Self::new(team_size))
    }

    /// Number of members (N).
    #[inline]
    #[must_use]
    pub fn team_size(&self) -> usize {
        self.team_size
    }

    /// Members blocked in the open cycle.
    #[must_use]
    pub fn arrived(&self) -> usize {
        self.state.lock().arrived
    }

    /// Number of cycles released so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.state.lock().generation
    }

    /// Blocks until all `team_size` members have called `wait()`.
    pub fn wait(&self) {
        let mut state = self.state.lock();
        let generation = state.generation;
        state.arrived += 1;

        if state.arrived == self.team_size {
            state.arrived = 0;
            state.generation = generation.wrapping_add(1);
            drop(state);
            self.released.notify_all();
            return;
        }

        // Loop guards against spurious wake-ups.
        while state.generation == generation {
            self.released.wait(&mut state);
        }
    }
}

impl Rendezvous for ParkingBarrier {
    #[inline]
    fn team_size(&self) -> usize {
        self.team_size
    }

    #[inline]
    fn wait(&self) {
        ParkingBarrier::wait(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parking_creation() {
        let barrier = ParkingBarrier::new(3);
        assert_eq!(barrier.team_size(), 3);
        assert_eq!(barrier.arrived(), 0);
        assert_eq!(barrier.cycles(), 0);
    }

    #[test]
    fn test_try_new_rejects_zero() {
        assert!(matches!(ParkingBarrier::try_new(0), Err(LockstepError::EmptyTeam)));
    }

    #[test]
    fn test_single_member() {
        let barrier = ParkingBarrier::new(1);
        barrier.wait();
        barrier.wait();
        assert_eq!(barrier.cycles(), 2);
    }

    #[test]
    fn test_phases_do_not_interleave() {
        const TEAM: usize = 4;
        const CYCLES: usize = 500;

        let barrier = ParkingBarrier::new(TEAM);
        let before = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..TEAM {
                s.spawn(|| {
                    for cycle in 1..=CYCLES {
                        before.fetch_add(1, Ordering::Relaxed);
                        barrier.wait();
                        assert_eq!(before.load(Ordering::Relaxed), cycle * TEAM);
                        barrier.wait();
                    }
                });
            }
        });

        assert_eq!(barrier.cycles(), (CYCLES * 2) as u64);
    }
}
