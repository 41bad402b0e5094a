//! Property tests for the reusable barriers.
//!
//! 1. **Liveness**: N members × C waits always return, exactly C times each
//! 2. **Bounded arrivals**: a monitor never sees the arrival count reach N
//! 3. **Visibility**: writes before `wait()` are seen by every member after it
//! 4. **Reuse**: back-to-back cycles leave the barrier quiescent between them
//!
//! Run with: cargo test --test barrier_properties -- --nocapture

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use lockstep_core::{ParkingBarrier, Rendezvous, SpinBarrier, SpinPolicy};

const STRESS_CYCLES: u64 = 10_000;

/// Each member waits `cycles` times; returns how often `wait()` returned per member.
fn run_team<B: Rendezvous>(barrier: &B, cycles: u64) -> Vec<u64> {
    let returns: Vec<AtomicU64> = (0..barrier.team_size()).map(|_| AtomicU64::new(0)).collect();

    std::thread::scope(|s| {
        for counter in &returns {
            s.spawn(move || {
                for _ in 0..cycles {
                    barrier.wait();
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    returns.into_iter().map(AtomicU64::into_inner).collect()
}

// ============================================================================
// LIVENESS
// ============================================================================

#[test]
fn test_every_member_returns_exactly_once_per_cycle() {
    for team_size in 1..=8 {
        let barrier = SpinBarrier::new(team_size);
        let returns = run_team(&barrier, 300);

        assert_eq!(returns, vec![300; team_size], "team of {team_size}");
        assert_eq!(barrier.cycles(), 300);
        assert!(barrier.is_quiescent());
    }
}

#[test]
fn test_parking_barrier_is_live() {
    for team_size in 1..=8 {
        let barrier = ParkingBarrier::new(team_size);
        let returns = run_team(&barrier, 200);

        assert_eq!(returns, vec![200; team_size], "team of {team_size}");
        assert_eq!(barrier.cycles(), 200);
    }
}

#[test]
fn test_pure_spin_policy_is_live() {
    let barrier = SpinBarrier::with_policy(2, SpinPolicy::pure());
    assert_eq!(run_team(&barrier, 1_000), vec![1_000, 1_000]);
}

// ============================================================================
// BOUNDED ARRIVALS
// ============================================================================

#[test]
fn test_monitor_never_sees_full_arrival_count() {
    const TEAM: usize = 4;

    let barrier = SpinBarrier::new(TEAM);
    let done = AtomicBool::new(false);
    let samples = AtomicUsize::new(0);

    std::thread::scope(|s| {
        let monitor = s.spawn(|| {
            while !done.load(Ordering::Acquire) {
                let arrived = barrier.arrived();
                let departed = barrier.departed();
                assert!(arrived < TEAM, "arrival count {arrived} observed");
                assert!(departed < TEAM, "departure count {departed} observed");
                samples.fetch_add(1, Ordering::Relaxed);
            }
        });

        std::thread::scope(|members| {
            for _ in 0..TEAM {
                members.spawn(|| {
                    for _ in 0..STRESS_CYCLES {
                        barrier.wait();
                    }
                });
            }
        });

        done.store(true, Ordering::Release);
        monitor.join().unwrap();
    });

    assert!(samples.load(Ordering::Relaxed) > 0);
    assert_eq!(barrier.cycles(), STRESS_CYCLES);
}

// ============================================================================
// VISIBILITY
// ============================================================================

/// One wait per cycle: members write the parity slot of the current cycle,
/// wait, and check every member's slot. The next cycle writes the other
/// parity, and the cycle after that is only reachable once everybody has
/// finished reading.
fn check_visibility<B: Rendezvous>(barrier: &B, cycles: u64) {
    let team = barrier.team_size();
    let slots: [Vec<AtomicU64>; 2] = [
        (0..team).map(|_| AtomicU64::new(0)).collect(),
        (0..team).map(|_| AtomicU64::new(0)).collect(),
    ];

    std::thread::scope(|s| {
        for me in 0..team {
            let slots = &slots;
            s.spawn(move || {
                for cycle in 1..=cycles {
                    let parity = &slots[(cycle % 2) as usize];
                    parity[me].store(cycle, Ordering::Relaxed);

                    barrier.wait();

                    for (peer, slot) in parity.iter().enumerate() {
                        let seen = slot.load(Ordering::Relaxed);
                        assert_eq!(seen, cycle, "member {me} saw stale value from {peer}");
                    }
                }
            });
        }
    });
}

#[test]
fn test_spin_barrier_publishes_writes_across_ten_thousand_cycles() {
    let start = Instant::now();
    check_visibility(&SpinBarrier::new(4), STRESS_CYCLES);
    println!("spin visibility: {STRESS_CYCLES} cycles in {:?}", start.elapsed());
}

#[test]
fn test_parking_barrier_publishes_writes() {
    check_visibility(&ParkingBarrier::new(4), 2_000);
}

#[test]
fn test_uneven_team_sizes_publish_writes() {
    for team in [1, 2, 3, 5, 7] {
        check_visibility(&SpinBarrier::new(team), 1_000);
    }
}

// ============================================================================
// REUSE
// ============================================================================

#[test]
fn test_barrier_is_quiescent_before_every_cycle() {
    const TEAM: usize = 4;
    const CYCLES: usize = 500;
    const WAITS_PER_CYCLE: usize = 3;

    let barrier = SpinBarrier::new(TEAM);
    // Members + monitor. The monitor inspects the barrier while members are
    // parked between `checkpoint` and `resume`.
    let checkpoint = std::sync::Barrier::new(TEAM + 1);
    let resume = std::sync::Barrier::new(TEAM + 1);

    std::thread::scope(|s| {
        for _ in 0..TEAM {
            s.spawn(|| {
                for _ in 0..CYCLES {
                    checkpoint.wait();
                    resume.wait();
                    for _ in 0..WAITS_PER_CYCLE {
                        barrier.wait();
                    }
                }
                checkpoint.wait();
            });
        }

        for cycle in 0..=CYCLES {
            checkpoint.wait();
            assert_eq!(barrier.arrived(), 0, "arrivals before cycle {cycle}");
            assert_eq!(barrier.outstanding_departures(), 0, "departures before cycle {cycle}");
            assert_eq!(barrier.cycles(), (cycle * WAITS_PER_CYCLE) as u64);
            if cycle < CYCLES {
                resume.wait();
            }
        }
    });
}

#[test]
fn test_back_to_back_cycles_keep_counts_consistent() {
    const TEAM: usize = 6;

    let barrier = SpinBarrier::new(TEAM);
    let entered = AtomicU64::new(0);

    std::thread::scope(|s| {
        for _ in 0..TEAM {
            s.spawn(|| {
                for cycle in 1..=STRESS_CYCLES {
                    entered.fetch_add(1, Ordering::Relaxed);
                    barrier.wait();
                    // Nobody may be counted into cycle + 1 before everyone left this one.
                    let seen = entered.load(Ordering::Relaxed);
                    assert!(
                        seen >= cycle * TEAM as u64 && seen <= (cycle + 1) * TEAM as u64,
                        "cycle {cycle}: {seen} entries"
                    );
                }
            });
        }
    });

    assert_eq!(entered.into_inner(), STRESS_CYCLES * TEAM as u64);
    assert!(barrier.is_quiescent());
}
