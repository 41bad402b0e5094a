//! # Simulation Configuration
//!
//! Every constant of the ecosystem model, with the classic values as
//! defaults. Any key may be omitted:
//!
//! ```toml
//! seed = 7
//! start_year = 2019
//! end_year = 2025
//! barrier = "parking"
//!
//! [growth]
//! grain_grows_per_month = 8.0
//!
//! [climate]
//! avg_temp = 50.0
//! random_temp = 10.0
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use lockstep_core::SpinPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Which barrier the role team synchronizes on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierKind {
    /// [`lockstep_core::SpinBarrier`].
    #[default]
    Spin,
    /// [`lockstep_core::ParkingBarrier`].
    Parking,
}

impl FromStr for BarrierKind {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        match s {
            "spin" => Ok(Self::Spin),
            "parking" => Ok(Self::Parking),
            other => Err(SimError::InvalidConfig(format!(
                "unknown barrier '{other}', expected 'spin' or 'parking'"
            ))),
        }
    }
}

impl fmt::Display for BarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Spin => "spin",
            Self::Parking => "parking",
        })
    }
}

/// Grain growth and grazing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrowthParams {
    /// Inches of grain added per month under ideal weather.
    pub grain_grows_per_month: f32,
    /// Inches of grain one deer eats per month.
    pub one_deer_eats_per_month: f32,
    /// Temperature (°F) at which grain grows best.
    pub mid_temp: f32,
    /// Precipitation (inches) at which grain grows best.
    pub mid_precip: f32,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            grain_grows_per_month: 8.0,
            one_deer_eats_per_month: 0.5,
            mid_temp: 40.0,
            mid_precip: 10.0,
        }
    }
}

/// Seasonal weather curves. Temperatures in °F, precipitation in inches.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClimateParams {
    /// Yearly mean of monthly precipitation.
    pub avg_precip: f32,
    /// Seasonal swing of monthly precipitation.
    pub amp_precip: f32,
    /// Uniform noise added to precipitation, ± this much.
    pub random_precip: f32,
    /// Yearly mean temperature.
    pub avg_temp: f32,
    /// Seasonal swing of temperature.
    pub amp_temp: f32,
    /// Uniform noise added to temperature, ± this much.
    pub random_temp: f32,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            avg_precip: 6.0,
            amp_precip: 6.0,
            random_precip: 2.0,
            avg_temp: 50.0,
            amp_temp: 20.0,
            random_temp: 10.0,
        }
    }
}

/// Full simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Seed for the weather and hunter RNGs.
    pub seed: u64,
    /// First simulated year; the run starts in its January.
    pub start_year: i32,
    /// The run ends when this year's January is reached.
    pub end_year: i32,
    /// Deer in the herd at the start.
    pub initial_deer: u32,
    /// Grain height in inches at the start.
    pub initial_height: f32,
    /// Barrier the roles synchronize on.
    pub barrier: BarrierKind,
    /// Busy-wait policy when `barrier = "spin"`.
    pub spin: SpinPolicy,
    /// Grain growth model.
    pub growth: GrowthParams,
    /// Weather model.
    pub climate: ClimateParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            start_year: 2019,
            end_year: 2025,
            initial_deer: 1,
            initial_height: 1.0,
            barrier: BarrierKind::Spin,
            spin: SpinPolicy::default(),
            growth: GrowthParams::default(),
            climate: ClimateParams::default(),
        }
    }
}

impl SimConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// [`SimError::Parse`] for malformed TOML or unknown keys,
    /// [`SimError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> SimResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if the file cannot be read, otherwise as
    /// [`SimConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Number of simulated months, one team cycle each.
    #[must_use]
    pub fn months(&self) -> u64 {
        let years = u64::try_from(self.end_year.saturating_sub(self.start_year)).unwrap_or(0);
        years * 12
    }

    /// Checks that every value is usable by the model.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> SimResult<()> {
        if self.end_year < self.start_year {
            return Err(SimError::InvalidConfig(format!(
                "end_year {} is before start_year {}",
                self.end_year, self.start_year
            )));
        }
        if !self.initial_height.is_finite() || self.initial_height < 0.0 {
            return Err(SimError::InvalidConfig(
                "initial_height must be a non-negative number".to_owned(),
            ));
        }

        let g = &self.growth;
        let c = &self.climate;
        let finite = [
            ("growth.grain_grows_per_month", g.grain_grows_per_month),
            ("growth.one_deer_eats_per_month", g.one_deer_eats_per_month),
            ("growth.mid_temp", g.mid_temp),
            ("growth.mid_precip", g.mid_precip),
            ("climate.avg_precip", c.avg_precip),
            ("climate.amp_precip", c.amp_precip),
            ("climate.avg_temp", c.avg_temp),
            ("climate.amp_temp", c.amp_temp),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SimError::InvalidConfig(format!("{name} must be finite")));
            }
        }

        for (name, value) in [
            ("climate.random_precip", c.random_precip),
            ("climate.random_temp", c.random_temp),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}
