//! # Climate Model
//!
//! Monthly temperature and precipitation follow a yearly sinusoid centred
//! on mid-month, plus uniform noise:
//!
//! ```text
//! angle  = (30 · month + 15)°
//! temp   = avg_temp   - amp_temp   · cos(angle) ± random_temp
//! precip = avg_precip + amp_precip · sin(angle) ± random_precip   (≥ 0)
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{ClimateParams, GrowthParams};

/// Angle of the mid-point of `month` (0 = January) on the yearly cycle.
#[inline]
fn season_angle(month: u32) -> f32 {
    (30.0 * month as f32 + 15.0).to_radians()
}

/// Noise-free temperature (°F) for `month`.
#[must_use]
pub fn mean_temperature(params: &ClimateParams, month: u32) -> f32 {
    params.avg_temp - params.amp_temp * season_angle(month).cos()
}

/// Noise-free precipitation (inches) for `month`. May be negative.
#[must_use]
pub fn mean_precipitation(params: &ClimateParams, month: u32) -> f32 {
    params.avg_precip + params.amp_precip * season_angle(month).sin()
}

/// How well grain grows at `value` given its optimum `mid`: 1 at the
/// optimum, falling off as a Gaussian with a width of 10 units.
#[must_use]
pub fn growth_factor(value: f32, mid: f32) -> f32 {
    let x = (value - mid) / 10.0;
    (-(x * x)).exp()
}

/// Grain height after one month, before anything else touches it.
#[must_use]
pub fn next_grain_height(
    growth: &GrowthParams,
    height: f32,
    deer: u32,
    temp: f32,
    precip: f32,
) -> f32 {
    let weather = growth_factor(temp, growth.mid_temp) * growth_factor(precip, growth.mid_precip);
    let grown = height + weather * growth.grain_grows_per_month;
    let grazed = grown - deer as f32 * growth.one_deer_eats_per_month;
    grazed.max(0.0)
}

/// Seeded weather generator.
#[derive(Debug, Clone)]
pub struct Climate {
    params: ClimateParams,
    rng: ChaCha8Rng,
}

impl Climate {
    /// Creates a generator; the same seed yields the same weather.
    #[must_use]
    pub fn new(params: ClimateParams, seed: u64) -> Self {
        Self {
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Temperature (°F) for `month` with noise.
    pub fn temperature(&mut self, month: u32) -> f32 {
        mean_temperature(&self.params, month) + self.noise(self.params.random_temp)
    }

    /// Precipitation (inches) for `month` with noise, never negative.
    pub fn precipitation(&mut self, month: u32) -> f32 {
        let noise = self.noise(self.params.random_precip);
        (mean_precipitation(&self.params, month) + noise).max(0.0)
    }

    fn noise(&mut self, amplitude: f32) -> f32 {
        if amplitude > 0.0 {
            self.rng.gen_range(-amplitude..=amplitude)
        } else {
            0.0
        }
    }
}
