//! Weather condition taxonomy and hazard classification.
//!
//! Condition codes follow the OpenWeatherMap scheme
//! (<https://openweathermap.org/weather-conditions>). The bands live in a
//! lookup table so a provider with a different code scheme only needs a new
//! [`HazardTaxonomy`], not changes to the reweighting flow.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Multiplier applied when the wind favours the direction of travel.
pub const FAVORABLE_WIND_MULTIPLIER: f64 = 0.7;
/// Multiplier applied for cross- and headwinds.
pub const ADVERSE_WIND_MULTIPLIER: f64 = 1.2;
/// Angular half-width of the favourable wind band, in degrees.
pub const FAVORABLE_WIND_HALF_WIDTH_DEG: f64 = 60.0;

/// Temperatures above this (Kelvin) degrade aircraft performance.
pub const EXTREME_HEAT_K: f64 = 323.15;
/// Temperatures below this (Kelvin) degrade aircraft performance.
pub const EXTREME_COLD_K: f64 = 218.5;
/// Multiplier applied at extreme temperatures.
pub const EXTREME_TEMPERATURE_MULTIPLIER: f64 = 1.05;

/// Multiplier making a connection effectively impassable.
pub const TORNADO_PENALTY_MULTIPLIER: f64 = 1000.0;

/// Coarse classification of a weather condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionClass {
    Thunderstorm,
    Rain,
    Snow,
    Fog,
    VolcanicAsh,
    Tornado,
    Clear,
}

/// Outcome of hazard screening for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HazardSignal {
    #[default]
    None,
    Thunderstorm,
    Tornado,
}

impl HazardSignal {
    pub fn is_blocking(self) -> bool {
        !matches!(self, HazardSignal::None)
    }

    /// Name reported to callers when a hazard blocks the query.
    pub fn as_str(self) -> &'static str {
        match self {
            HazardSignal::None => "",
            HazardSignal::Thunderstorm => "Thunderstorm alert",
            HazardSignal::Tornado => "Tornado",
        }
    }
}

impl fmt::Display for HazardSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open code range mapped onto a condition class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionBand {
    pub codes: Range<u16>,
    pub class: ConditionClass,
}

impl ConditionBand {
    pub const fn new(codes: Range<u16>, class: ConditionClass) -> Self {
        Self { codes, class }
    }
}

/// Lookup table from provider condition codes to classes and weight factors.
///
/// Bands are evaluated in order and the first match wins.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardTaxonomy {
    bands: Vec<ConditionBand>,
    multipliers: Vec<(ConditionClass, f64)>,
}

impl HazardTaxonomy {
    pub fn new(bands: Vec<ConditionBand>, multipliers: Vec<(ConditionClass, f64)>) -> Self {
        Self { bands, multipliers }
    }

    /// OpenWeatherMap condition-code bands.
    pub fn openweathermap() -> Self {
        Self::new(
            vec![
                ConditionBand::new(200..300, ConditionClass::Thunderstorm),
                ConditionBand::new(500..600, ConditionClass::Rain),
                ConditionBand::new(600..623, ConditionClass::Snow),
                ConditionBand::new(741..742, ConditionClass::Fog),
                ConditionBand::new(762..763, ConditionClass::VolcanicAsh),
                ConditionBand::new(781..782, ConditionClass::Tornado),
            ],
            vec![
                (ConditionClass::Rain, 1.1),
                (ConditionClass::Snow, 1.4),
                (ConditionClass::Fog, 1.3),
                (ConditionClass::VolcanicAsh, 2.5),
            ],
        )
    }

    pub fn classify(&self, code: u16) -> ConditionClass {
        self.bands
            .iter()
            .find(|band| band.codes.contains(&code))
            .map(|band| band.class)
            .unwrap_or(ConditionClass::Clear)
    }

    /// Weight factor for precipitation and visibility classes, if any.
    pub fn multiplier(&self, class: ConditionClass) -> Option<f64> {
        self.multipliers
            .iter()
            .find(|(candidate, _)| *candidate == class)
            .map(|(_, factor)| *factor)
    }
}

impl Default for HazardTaxonomy {
    fn default() -> Self {
        Self::openweathermap()
    }
}

/// Wind factor for travel on `bearing_deg` with wind reported from `wind_deg`.
///
/// Differences in `[0, 60)` or `[300, 360)` are favourable; everything in
/// `[60, 300)` is adverse.
pub fn wind_multiplier(bearing_deg: f64, wind_deg: f64) -> f64 {
    let difference = (bearing_deg - wind_deg).abs().rem_euclid(360.0);
    let favourable_upper = 360.0 - FAVORABLE_WIND_HALF_WIDTH_DEG;
    if difference < FAVORABLE_WIND_HALF_WIDTH_DEG || difference >= favourable_upper {
        FAVORABLE_WIND_MULTIPLIER
    } else {
        ADVERSE_WIND_MULTIPLIER
    }
}

/// Factor for temperatures outside the operating envelope.
pub fn temperature_multiplier(temperature_k: f64) -> Option<f64> {
    (temperature_k > EXTREME_HEAT_K || temperature_k < EXTREME_COLD_K)
        .then_some(EXTREME_TEMPERATURE_MULTIPLIER)
}
