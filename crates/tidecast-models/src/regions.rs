//! Per-sea adjustments applied on top of the global regressors.
use serde::{Deserialize, Serialize};

/// Scalars applied uniformly to every model's raw prediction for one sea.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionParameters {
    /// Regional scaling of the global rise.
    pub multiplier: f64,
    /// Amplitude of the synthetic year-to-year wiggle (mm).
    pub variability_amplitude: f64,
    /// Values above 1.0 steepen the curve after the present year.
    pub acceleration_factor: f64,
}

impl RegionParameters {
    /// Used for any sea not in the table.
    pub const DEFAULT: RegionParameters = RegionParameters::new(1.0, 0.2, 1.0);

    pub const fn new(multiplier: f64, variability_amplitude: f64, acceleration_factor: f64) -> Self {
        Self {
            multiplier,
            variability_amplitude,
            acceleration_factor,
        }
    }

    /// Same parameters with the synthetic variability switched off.
    pub fn without_variability(self) -> Self {
        Self {
            variability_amplitude: 0.0,
            ..self
        }
    }
}

impl Default for RegionParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const SEA_TABLE: [(&str, RegionParameters); 6] = [
    ("Arabian Sea", RegionParameters::new(1.0, 0.3, 1.05)),
    ("Caribbean Sea", RegionParameters::new(0.85, 0.25, 1.02)),
    ("Philippine Sea", RegionParameters::new(2.05, 0.5, 1.10)),
    ("Coral Sea", RegionParameters::new(1.1, 0.35, 1.04)),
    ("Labrador Sea", RegionParameters::new(0.85, 0.4, 1.03)),
    ("Barents Sea", RegionParameters::new(1.2, 0.45, 1.08)),
];

/// Look up a sea by exact (case-sensitive) name, falling back to
/// [`RegionParameters::DEFAULT`].
pub fn parameters_for(sea_name: &str) -> RegionParameters {
    SEA_TABLE
        .iter()
        .find(|(name, _)| *name == sea_name)
        .map(|(_, params)| *params)
        .unwrap_or(RegionParameters::DEFAULT)
}

pub fn is_known_sea(sea_name: &str) -> bool {
    SEA_TABLE.iter().any(|(name, _)| *name == sea_name)
}

pub fn known_seas() -> Vec<&'static str> {
    SEA_TABLE.iter().map(|(name, _)| *name).collect()
}
