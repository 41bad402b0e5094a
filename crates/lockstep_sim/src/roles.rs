//! # Roles
//!
//! Four workers, one thread each, five phases per simulated month:
//!
//! ```text
//!              COMPUTE     ASSIGN      ENVIRONMENT   AGENT        REPORT
//! DeerHerd     next deer   write deer  -             -            -
//! GrainField   next grain  write grain -             -            -
//! Watcher      -           -           new weather   -            record row
//! Hunter       -           -           -             births/kills -
//! ```
//!
//! COMPUTE only reads and ASSIGN only writes, so the herd and the field both
//! see last month's numbers no matter which of them runs first.

use lockstep_core::{PhaseContext, PhasedWorker};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::climate::{next_grain_height, Climate};
use crate::config::GrowthParams;
use crate::ecosystem::{fahrenheit_to_celsius, inches_to_cm, Ecosystem, MonthRecord};

/// Phases in one simulated month.
pub const PHASES_PER_MONTH: usize = 5;

/// Next values are computed from the current state.
pub const COMPUTE: usize = 0;
/// Next values become current.
pub const ASSIGN: usize = 1;
/// The calendar advances and new weather is drawn.
pub const ENVIRONMENT: usize = 2;
/// The hunter adds or removes deer.
pub const AGENT: usize = 3;
/// The month is recorded.
pub const REPORT: usize = 4;

/// State shared by all four roles.
pub type SharedEcosystem = Mutex<Ecosystem>;

/// Natural herd dynamics: the herd grows by one while the grain is at least
/// as tall (in inches) as the herd is large, and shrinks by one otherwise.
#[derive(Debug)]
pub struct DeerHerd<'a> {
    world: &'a SharedEcosystem,
    next: u32,
}

impl<'a> DeerHerd<'a> {
    /// Creates the herd role.
    #[must_use]
    pub fn new(world: &'a SharedEcosystem) -> Self {
        Self { world, next: 0 }
    }
}

impl PhasedWorker for DeerHerd<'_> {
    fn phase_count(&self) -> usize {
        PHASES_PER_MONTH
    }

    fn run_phase(&mut self, phase: usize, _ctx: &PhaseContext) {
        match phase {
            COMPUTE => {
                let world = self.world.lock();
                self.next = if world.deer as f32 > world.height {
                    world.deer.saturating_sub(1)
                } else {
                    world.deer + 1
                };
            }
            ASSIGN => self.world.lock().deer = self.next,
            _ => {}
        }
    }
}

/// Grain growth from the weather, minus what the herd eats.
#[derive(Debug)]
pub struct GrainField<'a> {
    world: &'a SharedEcosystem,
    growth: GrowthParams,
    next: f32,
}

impl<'a> GrainField<'a> {
    /// Creates the grain role.
    #[must_use]
    pub fn new(world: &'a SharedEcosystem, growth: GrowthParams) -> Self {
        Self {
            world,
            growth,
            next: 0.0,
        }
    }
}

impl PhasedWorker for GrainField<'_> {
    fn phase_count(&self) -> usize {
        PHASES_PER_MONTH
    }

    fn run_phase(&mut self, phase: usize, _ctx: &PhaseContext) {
        match phase {
            COMPUTE => {
                let world = self.world.lock();
                self.next = next_grain_height(
                    &self.growth,
                    world.height,
                    world.deer,
                    world.temp,
                    world.precip,
                );
            }
            ASSIGN => self.world.lock().height = self.next,
            _ => {}
        }
    }
}

/// Owns the calendar and the weather, and records one row per month.
#[derive(Debug)]
pub struct Watcher<'a> {
    world: &'a SharedEcosystem,
    climate: Climate,
    /// Weather of the month that just ended, for the report.
    ended: (f32, f32),
    records: Vec<MonthRecord>,
}

impl<'a> Watcher<'a> {
    /// Creates the watcher; `climate` must be the generator that drew the
    /// initial weather so the sequence continues from there.
    #[must_use]
    pub fn new(world: &'a SharedEcosystem, climate: Climate) -> Self {
        Self {
            world,
            climate,
            ended: (0.0, 0.0),
            records: Vec::new(),
        }
    }

    /// Rows recorded so far.
    #[must_use]
    pub fn records(&self) -> &[MonthRecord] {
        &self.records
    }

    /// Consumes the watcher, returning its rows.
    #[must_use]
    pub fn into_records(self) -> Vec<MonthRecord> {
        self.records
    }
}

impl PhasedWorker for Watcher<'_> {
    fn phase_count(&self) -> usize {
        PHASES_PER_MONTH
    }

    fn run_phase(&mut self, phase: usize, ctx: &PhaseContext) {
        match phase {
            ENVIRONMENT => {
                let mut world = self.world.lock();
                self.ended = (world.temp, world.precip);
                world.advance_month();
                world.temp = self.climate.temperature(world.month);
                world.precip = self.climate.precipitation(world.month);
            }
            REPORT => {
                let world = self.world.lock();
                let (temp, precip) = self.ended;
                let record = MonthRecord {
                    month: ctx.cycle + 1,
                    temp_c: fahrenheit_to_celsius(temp),
                    precip_cm: inches_to_cm(precip),
                    deer: world.deer,
                    height_cm: inches_to_cm(world.height),
                    deer_change: world.deer_change,
                };
                tracing::debug!(
                    "Month {}: {} deer, grain {:.1} cm",
                    record.month,
                    record.deer,
                    record.height_cm
                );
                self.records.push(record);
            }
            _ => {}
        }
    }
}

/// Seasonal births in May and June, hunting from August to December.
#[derive(Debug)]
pub struct Hunter<'a> {
    world: &'a SharedEcosystem,
    rng: ChaCha8Rng,
}

impl<'a> Hunter<'a> {
    /// Creates the hunter role with its own RNG stream.
    #[must_use]
    pub fn new(world: &'a SharedEcosystem, seed: u64) -> Self {
        Self {
            world,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl PhasedWorker for Hunter<'_> {
    fn phase_count(&self) -> usize {
        PHASES_PER_MONTH
    }

    fn run_phase(&mut self, phase: usize, _ctx: &PhaseContext) {
        if phase != AGENT {
            return;
        }

        let mut world = self.world.lock();
        let change = match world.month {
            4 | 5 => {
                let births = self.rng.gen_range(1..=2u32);
                world.deer += births;
                births as i32
            }
            7.. => {
                let kills = self.rng.gen_range(0..=3u32).min(world.deer);
                world.deer -= kills;
                -(kills as i32)
            }
            _ => 0,
        };
        world.deer_change = change;
    }
}

/// Any of the four roles, so one team can run them all.
#[derive(Debug)]
pub enum Role<'a> {
    /// [`DeerHerd`].
    Deer(DeerHerd<'a>),
    /// [`GrainField`].
    Grain(GrainField<'a>),
    /// [`Watcher`].
    Watcher(Watcher<'a>),
    /// [`Hunter`].
    Hunter(Hunter<'a>),
}

impl Role<'_> {
    /// The watcher's rows, if this is the watcher.
    #[must_use]
    pub fn into_records(self) -> Option<Vec<MonthRecord>> {
        match self {
            Role::Watcher(watcher) => Some(watcher.into_records()),
            _ => None,
        }
    }
}

impl PhasedWorker for Role<'_> {
    fn phase_count(&self) -> usize {
        PHASES_PER_MONTH
    }

    fn run_phase(&mut self, phase: usize, ctx: &PhaseContext) {
        match self {
            Role::Deer(role) => role.run_phase(phase, ctx),
            Role::Grain(role) => role.run_phase(phase, ctx),
            Role::Watcher(role) => role.run_phase(phase, ctx),
            Role::Hunter(role) => role.run_phase(phase, ctx),
        }
    }
}
