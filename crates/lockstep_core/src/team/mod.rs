//! # Phased Worker Team
//!
//! Replaces "one hard-coded section per thread" dispatch with a generic pool:
//! N members, each with its own ordered phase list, all sharing one barrier.
//!
//! ```text
//!             ┌──────────── WorkerTeam ────────────┐
//!             │                                    │
//!  member 0 ──┤ compute │ commit │ observe │ report ├──┐
//!  member 1 ──┤ compute │ commit │  (idle) │ (idle) ├──┤  wait() after
//!  member 2 ──┤ compute │ commit │ mutate  │ (idle) ├──┤  every column
//!             │         ▲        ▲         ▲        ▲  │
//!             └─────────┴────────┴─────────┴────────┴──┘
//!                         shared Rendezvous
//! ```
//!
//! The barrier enforces synchrony, not content: members may do entirely
//! different work in a phase, but every member runs the same number of
//! phases per cycle.

mod pool;
mod stop;
mod worker;

pub use pool::{TeamReport, WorkerTeam};
pub use stop::StopSignal;
pub use worker::{PhaseContext, PhaseList, PhasedWorker};
