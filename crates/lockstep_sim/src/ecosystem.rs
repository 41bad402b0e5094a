//! # Ecosystem State
//!
//! The single shared state of a run, and the monthly report rows.

use std::fmt;

use crate::climate::Climate;
use crate::config::SimConfig;

const CM_PER_INCH: f32 = 2.54;

/// Converts °F to °C.
#[inline]
#[must_use]
pub fn fahrenheit_to_celsius(f: f32) -> f32 {
    (f - 32.0) * (5.0 / 9.0)
}

/// Converts inches to centimetres.
#[inline]
#[must_use]
pub fn inches_to_cm(inches: f32) -> f32 {
    inches * CM_PER_INCH
}

/// Current month of the world.
///
/// Each field has exactly one writing role; phases are ordered so nobody
/// reads a field in the phase its writer changes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ecosystem {
    /// Calendar year.
    pub year: i32,
    /// Month of the year, 0 = January.
    pub month: u32,
    /// Temperature this month, °F.
    pub temp: f32,
    /// Precipitation this month, inches.
    pub precip: f32,
    /// Deer in the herd.
    pub deer: u32,
    /// Grain height, inches.
    pub height: f32,
    /// Births (positive) or kills (negative) by the hunter this month.
    pub deer_change: i32,
}

impl Ecosystem {
    /// January of `config.start_year`, with its weather drawn from `climate`.
    pub fn initial(config: &SimConfig, climate: &mut Climate) -> Self {
        Self {
            year: config.start_year,
            month: 0,
            temp: climate.temperature(0),
            precip: climate.precipitation(0),
            deer: config.initial_deer,
            height: config.initial_height,
            deer_change: 0,
        }
    }

    /// Moves to the next month, rolling the year over after December.
    pub fn advance_month(&mut self) {
        self.month += 1;
        if self.month > 11 {
            self.month = 0;
            self.year += 1;
        }
    }
}

/// One row of the monthly report, in metric units.
///
/// Weather is the month that just ended; herd and grain are as they stand
/// after the hunter's move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthRecord {
    /// Months since the start, 1-based.
    pub month: u64,
    /// Temperature, °C.
    pub temp_c: f32,
    /// Precipitation, cm.
    pub precip_cm: f32,
    /// Deer in the herd.
    pub deer: u32,
    /// Grain height, cm.
    pub height_cm: f32,
    /// Births or kills this month.
    pub deer_change: i32,
}

impl MonthRecord {
    /// Header line matching the [`Display`](fmt::Display) output.
    pub const TSV_HEADER: &'static str = "month\ttemp_c\tprecip_cm\tdeer\theight_cm\tdeer_change";
}

impl fmt::Display for MonthRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{:.2}\t{:.2}\t{}\t{:.2}\t{}",
            self.month, self.temp_c, self.precip_cm, self.deer, self.height_cm, self.deer_change
        )
    }
}
