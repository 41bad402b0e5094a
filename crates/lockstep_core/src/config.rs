//! # Team Configuration
//!
//! Loaded once at startup, from code or from a TOML file:
//!
//! ```toml
//! team_size = 4
//! max_cycles = 1000
//! thread_name_prefix = "member"
//!
//! [spin]
//! spins_before_yield = 1024
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LockstepError, LockstepResult};
use crate::sync::SpinPolicy;

/// Default team size: one member per role of a four-role schedule.
pub const DEFAULT_TEAM_SIZE: usize = 4;

/// Configuration for a [`WorkerTeam`](crate::WorkerTeam).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeamConfig {
    /// Number of members (N). Fixed for the lifetime of the team.
    pub team_size: usize,
    /// Cycle budget. `None` runs until the stop signal is raised.
    pub max_cycles: Option<u64>,
    /// Busy-wait behaviour of the default [`SpinBarrier`](crate::SpinBarrier).
    pub spin: SpinPolicy,
    /// Worker threads are named `{prefix}-{member}`.
    pub thread_name_prefix: String,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            team_size: DEFAULT_TEAM_SIZE,
            max_cycles: None,
            spin: SpinPolicy::default(),
            thread_name_prefix: "lockstep".to_owned(),
        }
    }
}

impl TeamConfig {
    /// Parses a configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`LockstepError::InvalidConfig`] on malformed TOML or unknown
    /// keys, and [`LockstepError::EmptyTeam`] for `team_size = 0`.
    pub fn from_toml_str(text: &str) -> LockstepResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| LockstepError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Same as [`TeamConfig::from_toml_str`], plus
    /// [`LockstepError::InvalidConfig`] if the file cannot be read.
    pub fn from_toml_file(path: impl AsRef<Path>) -> LockstepResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LockstepError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the invariants a team relies on.
    ///
    /// # Errors
    ///
    /// Returns [`LockstepError::EmptyTeam`] if `team_size` is zero.
    pub fn validate(&self) -> LockstepResult<()> {
        if self.team_size == 0 {
            return Err(LockstepError::EmptyTeam);
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(LockstepError::InvalidConfig(
                "thread_name_prefix must not contain NUL bytes".to_owned(),
            ));
        }
        Ok(())
    }
}
