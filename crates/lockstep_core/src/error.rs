//! # Lockstep Error Types
//!
//! Errors raised while configuring or launching a team.
//!
//! `wait()` itself never fails: a barrier misused by the wrong number of
//! callers deadlocks, it does not report.

use thiserror::Error;

/// Errors that can occur while building or running a worker team.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockstepError {
    /// A team must have at least one member.
    #[error("team size must be at least 1")]
    EmptyTeam,

    /// Number of workers handed to a team does not match its barrier.
    #[error("team size mismatch: barrier expects {expected} members, got {actual} workers")]
    TeamSizeMismatch {
        /// Team size of the barrier.
        expected: usize,
        /// Number of workers supplied.
        actual: usize,
    },

    /// A worker declared zero phases per cycle.
    #[error("worker {member} has no phases")]
    NoPhases {
        /// Team slot of the offending worker.
        member: usize,
    },

    /// Workers disagree on the number of phases per cycle.
    #[error("worker {member} runs {actual} phases per cycle, worker 0 runs {expected}")]
    PhaseCountMismatch {
        /// Team slot of the offending worker.
        member: usize,
        /// Phase count of worker 0.
        expected: usize,
        /// Phase count of the offending worker.
        actual: usize,
    },

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),

    /// A phase panicked. The team stops at the end of that cycle, or one
    /// cycle later when the panic hits the last phase after member 0 has
    /// already checked for it.
    #[error("worker {member} panicked during a phase")]
    WorkerPanicked {
        /// Team slot of the first worker that panicked.
        member: usize,
    },

    /// `run` was called while the same team is already running.
    #[error("team is already running")]
    TeamBusy,

    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for lockstep operations.
pub type LockstepResult<T> = Result<T, LockstepError>;
