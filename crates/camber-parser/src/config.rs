//! Parser configuration: advisory machine limits.
//!
//! Limits are optional; when absent, no range warnings are produced. Range
//! checks never reject a statement, they only attach `W2xx` diagnostics.

use serde::Deserialize;

/// Configured travel envelope of the machine, in mm.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TravelLimits {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl TravelLimits {
    /// Returns `true` if `value` is inside the envelope for `axis`.
    pub fn contains(&self, axis: char, value: f64) -> bool {
        let (min, max) = match axis.to_ascii_uppercase() {
            'X' => (self.x_min, self.x_max),
            'Y' => (self.y_min, self.y_max),
            'Z' => (self.z_min, self.z_max),
            _ => return true,
        };
        value >= min && value <= max
    }
}

/// Configuration for one parse pass.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParserConfig {
    /// Travel envelope for `W200` range warnings, if known.
    #[serde(default)]
    pub travel: Option<TravelLimits>,

    /// Maximum spindle speed (PWM ceiling) for `W201` warnings, if known.
    #[serde(default)]
    pub spindle_max: Option<f64>,
}
