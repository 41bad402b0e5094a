//! # Simulation Driver
//!
//! Builds the four roles around one shared [`Ecosystem`] and runs them on a
//! [`WorkerTeam`] for one cycle per simulated month.

use std::time::Duration;

use lockstep_core::{ParkingBarrier, Rendezvous, SpinBarrier, TeamConfig, WorkerTeam};
use parking_lot::Mutex;

use crate::climate::Climate;
use crate::config::{BarrierKind, SimConfig};
use crate::ecosystem::{Ecosystem, MonthRecord};
use crate::error::SimResult;
use crate::roles::{DeerHerd, GrainField, Hunter, Role, Watcher};

/// One thread per role.
pub const ROLE_COUNT: usize = 4;

/// Mixed into the seed so the hunter's stream differs from the weather's.
const HUNTER_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Result of a finished simulation.
#[derive(Debug, Clone)]
pub struct SimOutcome {
    /// One row per simulated month.
    pub records: Vec<MonthRecord>,
    /// State after the last month.
    pub final_state: Ecosystem,
    /// Wall time spent in the team.
    pub elapsed: Duration,
}

/// Runs a whole simulation on the barrier named in `config`.
///
/// # Errors
///
/// [`SimError::InvalidConfig`](crate::SimError::InvalidConfig) for a bad
/// config, [`SimError::Team`](crate::SimError::Team) if the team fails.
pub fn run(config: &SimConfig) -> SimResult<SimOutcome> {
    config.validate()?;
    match config.barrier {
        BarrierKind::Spin => run_on(SpinBarrier::with_policy(ROLE_COUNT, config.spin), config),
        BarrierKind::Parking => run_on(ParkingBarrier::new(ROLE_COUNT), config),
    }
}

/// Runs a whole simulation on a caller-supplied barrier of [`ROLE_COUNT`].
///
/// # Errors
///
/// As [`run`], plus
/// [`LockstepError::TeamSizeMismatch`](lockstep_core::LockstepError::TeamSizeMismatch)
/// for a barrier of the wrong size.
pub fn run_on<B: Rendezvous>(barrier: B, config: &SimConfig) -> SimResult<SimOutcome> {
    config.validate()?;

    let team = WorkerTeam::with_barrier(
        barrier,
        TeamConfig {
            team_size: ROLE_COUNT,
            max_cycles: Some(config.months()),
            spin: config.spin,
            thread_name_prefix: "graindeer".to_owned(),
        },
    )?;

    let mut climate = Climate::new(config.climate, config.seed);
    let world = Mutex::new(Ecosystem::initial(config, &mut climate));

    tracing::info!(
        "Simulating {} months from {} on the {} barrier (seed {})",
        config.months(),
        config.start_year,
        config.barrier,
        config.seed
    );

    let roles = vec![
        Role::Deer(DeerHerd::new(&world)),
        Role::Grain(GrainField::new(&world, config.growth)),
        Role::Watcher(Watcher::new(&world, climate)),
        Role::Hunter(Hunter::new(&world, config.seed ^ HUNTER_STREAM)),
    ];

    let report = team.run(roles)?;
    let records = report
        .workers
        .into_iter()
        .find_map(Role::into_records)
        .unwrap_or_default();

    tracing::info!("Simulation finished: {} months in {:?}", report.cycles, report.elapsed);

    let elapsed = report.elapsed;
    Ok(SimOutcome {
        records,
        final_state: world.into_inner(),
        elapsed,
    })
}
