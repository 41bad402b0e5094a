//! # Simulation Error Types

use lockstep_core::LockstepError;
use thiserror::Error;

/// Errors that can occur while configuring or running a simulation.
#[derive(Error, Debug)]
pub enum SimError {
    /// The worker team refused to start or a role panicked.
    #[error(transparent)]
    Team(#[from] LockstepError),

    /// Malformed simulation config file.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read, or output could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config value outside its meaningful range.
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
