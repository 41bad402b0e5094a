//! # Barrier Round-Trip Benchmark
//!
//! Cost of one full cycle (every member in, every member out) for:
//! 1. `SpinBarrier` with the default spin-then-yield policy
//! 2. `SpinBarrier` spinning without ever yielding
//! 3. `ParkingBarrier` (mutex + condvar)
//! 4. `std::sync::Barrier` as the baseline
//!
//! Pure spinning only wins while every member owns a core; on an
//! oversubscribed machine expect it to fall behind the parking barriers.
//!
//! Run with: cargo bench --package lockstep_core --bench barrier_benchmark

#![allow(missing_docs)]

use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lockstep_core::{ParkingBarrier, Rendezvous, SpinBarrier, SpinPolicy};

const TEAM_SIZES: [usize; 3] = [2, 4, 8];

/// Runs `team_size` threads through `iters` cycles of `wait` and returns the
/// slowest member's time.
fn time_cycles<F>(team_size: usize, iters: u64, wait: F) -> Duration
where
    F: Fn() + Sync,
{
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..team_size)
            .map(|_| {
                s.spawn(|| {
                    let start = Instant::now();
                    for _ in 0..iters {
                        wait();
                    }
                    start.elapsed()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .max()
            .unwrap_or_default()
    })
}

fn bench_rendezvous<B: Rendezvous>(
    group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    name: &str,
    make: impl Fn(usize) -> B,
) {
    for team_size in TEAM_SIZES {
        group.bench_with_input(BenchmarkId::new(name, team_size), &team_size, |b, &n| {
            let barrier = make(n);
            b.iter_custom(|iters| time_cycles(n, iters, || barrier.wait()));
        });
    }
}

// =============================================================================
// ROUND TRIP
// =============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("barrier_round_trip");
    group.throughput(Throughput::Elements(1));

    bench_rendezvous(&mut group, "spin_yielding", SpinBarrier::new);
    bench_rendezvous(&mut group, "spin_pure", |n| {
        SpinBarrier::with_policy(n, SpinPolicy::pure())
    });
    bench_rendezvous(&mut group, "parking", ParkingBarrier::new);

    for team_size in TEAM_SIZES {
        group.bench_with_input(BenchmarkId::new("std", team_size), &team_size, |b, &n| {
            let barrier = std::sync::Barrier::new(n);
            b.iter_custom(|iters| {
                time_cycles(n, iters, || {
                    barrier.wait();
                })
            });
        });
    }

    group.finish();
}

// =============================================================================
// PHASED TEAM
// =============================================================================

fn bench_team_cycle(c: &mut Criterion) {
    use lockstep_core::{PhaseList, TeamConfig, WorkerTeam};

    let mut group = c.benchmark_group("team_three_phase_cycle");
    group.sample_size(20);

    for team_size in TEAM_SIZES {
        group.bench_with_input(
            BenchmarkId::from_parameter(team_size),
            &team_size,
            |b, &n| {
                b.iter_custom(|iters| {
                    let team = WorkerTeam::new(TeamConfig {
                        team_size: n,
                        max_cycles: Some(iters),
                        ..TeamConfig::default()
                    })
                    .unwrap();
                    let workers = (0..n)
                        .map(|_| PhaseList::new().idle().idle().idle())
                        .collect();
                    team.run(workers).unwrap().elapsed
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_round_trip, bench_team_cycle);
criterion_main!(benches);
