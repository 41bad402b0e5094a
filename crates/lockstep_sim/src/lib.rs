//! # LOCKSTEP Sim
//!
//! A grain/deer ecosystem advanced one month per team cycle. Four roles own
//! disjoint parts of the state and never touch each other's fields in the
//! same phase; the barrier is the only thing keeping them in order.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lockstep_sim::{MonthRecord, SimConfig};
//!
//! let outcome = lockstep_sim::run(&SimConfig::default())?;
//! println!("{}", MonthRecord::TSV_HEADER);
//! for row in &outcome.records {
//!     println!("{row}");
//! }
//! # Ok::<(), lockstep_sim::SimError>(())
//! ```

#![deny(unsafe_code)]

pub mod climate;
pub mod config;
pub mod ecosystem;
pub mod error;
pub mod roles;
pub mod sim;

pub use config::{BarrierKind, ClimateParams, GrowthParams, SimConfig};
pub use ecosystem::{Ecosystem, MonthRecord};
pub use error::{SimError, SimResult};
pub use sim::{run, run_on, SimOutcome, ROLE_COUNT};
