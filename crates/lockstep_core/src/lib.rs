//! # LOCKSTEP Core
//!
//! Fixed-team rendezvous for threads that advance through repeated phases
//! in lock step:
//!
//! ```text
//! [phase A] → wait → [phase B] → wait → ... → [phase K] → wait → (next cycle)
//! ```
//!
//! ## Components
//!
//! 1. **[`SpinBarrier`]** - two-count reusable barrier. One short lock, two
//!    spin loops, no condition variables. Safe to re-enter immediately.
//! 2. **[`ParkingBarrier`]** - same contract built on a condition variable,
//!    for hosts where burning a core per waiter is not acceptable.
//! 3. **[`WorkerTeam`]** - a fixed pool of N threads, started once, each
//!    running an ordered list of phases with a barrier wait after every phase.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lockstep_core::{PhaseList, TeamConfig, WorkerTeam};
//!
//! let config = TeamConfig { team_size: 2, max_cycles: Some(10), ..TeamConfig::default() };
//! let team = WorkerTeam::new(config)?;
//!
//! let workers = (0..2)
//!     .map(|_| PhaseList::new().phase(|_| { /* compute */ }).phase(|_| { /* commit */ }))
//!     .collect();
//!
//! let report = team.run(workers)?;
//! assert_eq!(report.cycles, 10);
//! # Ok::<(), lockstep_core::LockstepError>(())
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod sync;
pub mod team;

pub use config::TeamConfig;
pub use error::{LockstepError, LockstepResult};
pub use sync::{ParkingBarrier, Rendezvous, SpinBarrier, SpinPolicy};
pub use team::{PhaseContext, PhaseList, PhasedWorker, StopSignal, TeamReport, WorkerTeam};
