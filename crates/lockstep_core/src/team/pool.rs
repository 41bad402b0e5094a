//! # Worker Team
//!
//! A fixed pool of N threads, spawned once per [`WorkerTeam::run`] and reused
//! for every cycle. Per cycle each member runs:
//!
//! ```text
//! phase 0 → wait → phase 1 → wait → ... → phase k-1 → wait ─┐
//!    ▲                                                      │
//!    └──────────── halt latch says continue ◀───────────────┘
//! ```
//!
//! ## Stopping Together
//!
//! Members must leave in the same cycle, or the ones still running deadlock.
//! Member 0 decides: after its last phase of cycle *c* it checks the cycle
//! budget, the [`StopSignal`] and the poison slot, and if any says stop it
//! writes *c* into the halt latch before its trailing wait. Everyone reads the
//! latch after that wait, so the barrier's visibility guarantee hands all
//! members the same answer. The latch only ever decreases from `u64::MAX`, and
//! member 0 writes cycle *c* only while inside cycle *c*, so a slow reader of
//! an earlier cycle can never see a value that stops it early.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::stop::StopSignal;
use super::worker::{PhaseContext, PhasedWorker};
use crate::config::TeamConfig;
use crate::error::{LockstepError, LockstepResult};
use crate::sync::{Rendezvous, SpinBarrier, SpinPolicy};

const GATE_PENDING: u8 = 0;
const GATE_OPEN: u8 = 1;
const GATE_ABORT: u8 = 2;

const NOT_HALTED: u64 = u64::MAX;
const NOT_POISONED: usize = usize::MAX;

/// Outcome of a completed [`WorkerTeam::run`].
#[derive(Debug)]
pub struct TeamReport<W> {
    /// Cycles every member completed.
    pub cycles: u64,
    /// Wall time from opening the start gate to the last join.
    pub elapsed: Duration,
    /// The workers, handed back in team-slot order.
    pub workers: Vec<W>,
}

/// Fixed-size pool running [`PhasedWorker`]s in lock step over one barrier.
///
/// ## Usage
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use lockstep_core::{PhaseList, TeamConfig, WorkerTeam};
///
/// let team = WorkerTeam::new(TeamConfig {
///     team_size: 3,
///     max_cycles: Some(50),
///     ..TeamConfig::default()
/// })?;
///
/// let produced = AtomicUsize::new(0);
/// let workers = (0..3)
///     .map(|_| {
///         PhaseList::new()
///             .phase(|_| { produced.fetch_add(1, Ordering::Relaxed); })
///             .phase(|ctx| {
///                 let expected = 3 * (ctx.cycle as usize + 1);
///                 assert_eq!(produced.load(Ordering::Relaxed), expected);
///             })
///     })
///     .collect();
///
/// let report = team.run(workers)?;
/// assert_eq!(report.cycles, 50);
/// # Ok::<(), lockstep_core::LockstepError>(())
/// ```
#[derive(Debug)]
pub struct WorkerTeam<B: Rendezvous = SpinBarrier> {
    barrier: B,
    config: TeamConfig,
    stop: StopSignal,
    running: AtomicBool,
}

impl WorkerTeam<SpinBarrier> {
    /// Creates a team over a [`SpinBarrier`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns the error of [`TeamConfig::validate`].
    pub fn new(config: TeamConfig) -> LockstepResult<Self> {
        config.validate()?;
        let barrier = SpinBarrier::with_policy(config.team_size, config.spin);
        Self::with_barrier(barrier, config)
    }
}

impl<B: Rendezvous> WorkerTeam<B> {
    /// Creates a team over a caller-supplied barrier.
    ///
    /// # Errors
    ///
    /// Returns [`LockstepError::TeamSizeMismatch`] if the barrier's team size
    /// differs from `config.team_size`, or the error of
    /// [`TeamConfig::validate`].
    pub fn with_barrier(barrier: B, config: TeamConfig) -> LockstepResult<Self> {
        config.validate()?;
        if barrier.team_size() != config.team_size {
            return Err(LockstepError::TeamSizeMismatch {
                expected: barrier.team_size(),
                actual: config.team_size,
            });
        }
        Ok(Self {
            barrier,
            config,
            stop: StopSignal::new(),
            running: AtomicBool::new(false),
        })
    }

    /// The shared barrier.
    #[must_use]
    pub fn barrier(&self) -> &B {
        &self.barrier
    }

    /// The team configuration.
    #[must_use]
    pub fn config(&self) -> &TeamConfig {
        &self.config
    }

    /// Handle for stopping a run from another thread.
    ///
    /// The signal stays raised after the run ends; call
    /// [`StopSignal::reset`] before running the team again.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Runs `workers` in lock step until the cycle budget is spent, the stop
    /// signal is raised, or a phase panics.
    ///
    /// Worker `i` runs in team slot `i` on its own thread. Stop requests are
    /// honoured at the end of a cycle, so at least one cycle runs unless
    /// `max_cycles` is `Some(0)`.
    ///
    /// # Errors
    ///
    /// - [`LockstepError::TeamSizeMismatch`] if `workers.len()` is not N
    /// - [`LockstepError::NoPhases`] / [`LockstepError::PhaseCountMismatch`]
    ///   if the phase schedules cannot run in lock step
    /// - [`LockstepError::TeamBusy`] if this team is already running
    /// - [`LockstepError::Spawn`] if a thread cannot be started
    /// - [`LockstepError::WorkerPanicked`] if a phase panicked
    pub fn run<W: PhasedWorker>(&self, workers: Vec<W>) -> LockstepResult<TeamReport<W>> {
        let phases = self.check_schedule(&workers)?;

        if self.running.swap(true, Ordering::AcqRel) {
            return Err(LockstepError::TeamBusy);
        }
        let outcome = self.run_members(workers, phases);
        self.running.store(false, Ordering::Release);
        outcome
    }

    fn check_schedule<W: PhasedWorker>(&self, workers: &[W]) -> LockstepResult<usize> {
        let expected = self.barrier.team_size();
        if workers.len() != expected {
            return Err(LockstepError::TeamSizeMismatch {
                expected,
                actual: workers.len(),
            });
        }

        let phases = workers[0].phase_count();
        for (member, worker) in workers.iter().enumerate() {
            let actual = worker.phase_count();
            if actual == 0 {
                return Err(LockstepError::NoPhases { member });
            }
            if actual != phases {
                return Err(LockstepError::PhaseCountMismatch {
                    member,
                    expected: phases,
                    actual,
                });
            }
        }
        Ok(phases)
    }

    fn run_members<W: PhasedWorker>(
        &self,
        workers: Vec<W>,
        phases: usize,
    ) -> LockstepResult<TeamReport<W>> {
        if self.config.max_cycles == Some(0) {
            return Ok(TeamReport {
                cycles: 0,
                elapsed: Duration::ZERO,
                workers,
            });
        }

        let team_size = workers.len();
        let shared = self.shared(phases);

        tracing::info!(
            "Starting team: {} members, {} phases per cycle, budget {:?}",
            team_size,
            phases,
            self.config.max_cycles
        );

        let mut start = Instant::now();
        let joined = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(team_size);

            for (member, mut worker) in workers.into_iter().enumerate() {
                let shared = &shared;
                let spawned = injected_spawn_failure(member).and_then(|()| {
                    std::thread::Builder::new()
                        .name(format!("{}-{member}", self.config.thread_name_prefix))
                        .spawn_scoped(scope, move || {
                            shared.run_member(member, &mut worker);
                            worker
                        })
                });

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        tracing::warn!("Failed to spawn member {}: {}", member, e);
                        shared.gate.store(GATE_ABORT, Ordering::Release);
                        // Started members exit at the gate; their workers are dropped.
                        for handle in handles {
                            let _ = handle.join();
                        }
                        return Err(LockstepError::Spawn(e.to_string()));
                    }
                }
            }

            start = Instant::now();
            shared.gate.store(GATE_OPEN, Ordering::Release);

            let mut workers = Vec::with_capacity(team_size);
            let mut escaped = None;
            for (member, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(worker) => workers.push(worker),
                    Err(_) => escaped = escaped.or(Some(member)),
                }
            }
            match escaped {
                Some(member) => Err(LockstepError::WorkerPanicked { member }),
                None => Ok(workers),
            }
        });
        let elapsed = start.elapsed();
        let workers = joined?;

        let poisoned = shared.poisoned.load(Ordering::Acquire);
        if poisoned != NOT_POISONED {
            tracing::warn!("Team stopped after worker {} panicked", poisoned);
            return Err(LockstepError::WorkerPanicked { member: poisoned });
        }

        let cycles = shared.halt_after.load(Ordering::Acquire).saturating_add(1);
        tracing::info!("Team finished: {} cycles in {:?}", cycles, elapsed);

        Ok(TeamReport {
            cycles,
            elapsed,
            workers,
        })
    }

    fn shared(&self, phases: usize) -> Shared<'_, B> {
        Shared {
            barrier: &self.barrier,
            stop: &self.stop,
            max_cycles: self.config.max_cycles,
            phases,
            spin: self.config.spin,
            gate: AtomicU8::new(GATE_PENDING),
            halt_after: AtomicU64::new(NOT_HALTED),
            poisoned: AtomicUsize::new(NOT_POISONED),
        }
    }
}

#[cfg(test)]
thread_local! {
    /// Member whose spawn fails in runs started from this thread.
    static FAIL_SPAWN_AT: std::cell::Cell<Option<usize>> = const { std::cell::Cell::new(None) };
}

#[cfg(test)]
fn injected_spawn_failure(member: usize) -> std::io::Result<()> {
    if FAIL_SPAWN_AT.with(std::cell::Cell::get) == Some(member) {
        return Err(std::io::Error::other("spawn refused"));
    }
    Ok(())
}

#[cfg(not(test))]
#[inline]
fn injected_spawn_failure(_member: usize) -> std::io::Result<()> {
    Ok(())
}

/// State shared by the members of one run.
struct Shared<'a, B> {
    barrier: &'a B,
    stop: &'a StopSignal,
    max_cycles: Option<u64>,
    phases: usize,
    /// How members wait at the start gate.
    spin: SpinPolicy,
    gate: AtomicU8,
    /// Last cycle to run. Written by member 0 only, monotonically decreasing.
    halt_after: AtomicU64,
    /// First member whose phase panicked.
    poisoned: AtomicUsize,
}

impl<B: Rendezvous> Shared<'_, B> {
    fn run_member<W: PhasedWorker>(&self, member: usize, worker: &mut W) {
        if !self.pass_gate() {
            return;
        }

        let team_size = self.barrier.team_size();
        let last_phase = self.phases - 1;
        let mut failed = false;
        let mut cycle = 0u64;

        loop {
            for phase in 0..self.phases {
                let ctx = PhaseContext {
                    member,
                    team_size,
                    cycle,
                    phase,
                };
                if !failed {
                    let ran = panic::catch_unwind(AssertUnwindSafe(|| {
                        worker.run_phase(phase, &ctx);
                    }));
                    if ran.is_err() {
                        failed = true;
                        self.poison(member, cycle, phase);
                    }
                }

                if ctx.is_coordinator() && phase == last_phase && self.should_halt_after(cycle) {
                    self.halt_after.fetch_min(cycle, Ordering::Release);
                }

                // A failed member keeps waiting so its peers never deadlock.
                self.barrier.wait();
            }

            if self.halt_after.load(Ordering::Acquire) <= cycle {
                break;
            }
            cycle += 1;
        }

        tracing::debug!("Member {} leaving after cycle {}", member, cycle);
    }

    /// Waits for the start gate. False means the run was aborted.
    fn pass_gate(&self) -> bool {
        self.spin.spin_until(|| self.gate.load(Ordering::Acquire) != GATE_PENDING);
        self.gate.load(Ordering::Acquire) == GATE_OPEN
    }

    fn should_halt_after(&self, cycle: u64) -> bool {
        let budget_spent = self
            .max_cycles
            .is_some_and(|max| cycle.saturating_add(1) >= max);
        budget_spent
            || self.stop.is_raised()
            || self.poisoned.load(Ordering::Acquire) != NOT_POISONED
    }

    fn poison(&self, member: usize, cycle: u64, phase: usize) {
        tracing::warn!(
            "Member {} panicked in phase {} of cycle {}",
            member,
            phase,
            cycle
        );
        let _ = self.poisoned.compare_exchange(
            NOT_POISONED,
            member,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}
