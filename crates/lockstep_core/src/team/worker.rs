//! # Phased Workers
//!
//! A worker is one team slot's fixed, ordered list of phases. The team calls
//! the phases in order and waits on the barrier after every one of them.

use std::fmt;

/// Read-only view of where a member is in the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseContext {
    /// Team slot of the running member (0..team_size).
    pub member: usize,
    /// Number of members (N).
    pub team_size: usize,
    /// Zero-based cycle number.
    pub cycle: u64,
    /// Zero-based phase index within the cycle.
    pub phase: usize,
}

impl PhaseContext {
    /// True for member 0, the slot that also latches stop decisions.
    #[inline]
    #[must_use]
    pub const fn is_coordinator(&self) -> bool {
        self.member == 0
    }
}

/// Logic executed by one team member, phase by phase.
///
/// Every member of a team must report the same [`phase_count`](Self::phase_count).
/// Only the number and order of phases must agree; the work done in each
/// phase can differ per member, including doing nothing at all.
pub trait PhasedWorker: Send {
    /// Number of phases per cycle. Must be at least 1 and must not change.
    fn phase_count(&self) -> usize;

    /// Runs phase `phase` (0..phase_count) of the current cycle.
    fn run_phase(&mut self, phase: usize, ctx: &PhaseContext);
}

impl<W: PhasedWorker + ?Sized> PhasedWorker for Box<W> {
    fn phase_count(&self) -> usize {
        (**self).phase_count()
    }

    fn run_phase(&mut self, phase: usize, ctx: &PhaseContext) {
        (**self).run_phase(phase, ctx);
    }
}

type PhaseFn<'a> = Box<dyn FnMut(&PhaseContext) + Send + 'a>;

/// A [`PhasedWorker`] assembled from closures.
///
/// ```rust
/// use lockstep_core::{PhaseList, PhasedWorker};
///
/// let worker = PhaseList::new()
///     .phase(|ctx| println!("compute, cycle {}", ctx.cycle))
///     .phase(|_| {})
///     .phase(|ctx| println!("report, cycle {}", ctx.cycle));
/// assert_eq!(worker.phase_count(), 3);
/// ```
#[derive(Default)]
pub struct PhaseList<'a> {
    phases: Vec<PhaseFn<'a>>,
}

impl<'a> PhaseList<'a> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self { phases: Vec::new() }
    }

    /// Appends a phase.
    #[must_use]
    pub fn phase(mut self, run: impl FnMut(&PhaseContext) + Send + 'a) -> Self {
        self.phases.push(Box::new(run));
        self
    }

    /// Appends a phase that does nothing, for members idle in that phase.
    #[must_use]
    pub fn idle(self) -> Self {
        self.phase(|_| {})
    }

    /// Number of phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// True if no phase was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

impl PhasedWorker for PhaseList<'_> {
    fn phase_count(&self) -> usize {
        self.phases.len()
    }

    fn run_phase(&mut self, phase: usize, ctx: &PhaseContext) {
        (self.phases[phase])(ctx);
    }
}

impl fmt::Debug for PhaseList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseList")
            .field("phases", &self.phases.len())
            .finish()
    }
}
