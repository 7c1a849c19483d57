use serde::{Deserialize, Serialize};

use super::time::JulianDate;

/// Minimum target altitude for an observation.
pub const DEFAULT_MIN_TARGET_ALTITUDE_DEG: f64 = 20.0;
/// Maximum Sun altitude (astronomical twilight).
pub const DEFAULT_MAX_SUN_ALTITUDE_DEG: f64 = -18.0;

/// Altitude limits that define when a target counts as observable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityThresholds {
    /// Target must be at or above this altitude
    pub min_target_altitude: qtty::Degrees,
    /// Sun must be at or below this altitude
    pub max_sun_altitude: qtty::Degrees,
}

impl VisibilityThresholds {
    pub fn new(min_target_altitude_deg: f64, max_sun_altitude_deg: f64) -> Self {
        Self {
            min_target_altitude: qtty::Degrees::new(min_target_altitude_deg),
            max_sun_altitude: qtty::Degrees::new(max_sun_altitude_deg),
        }
    }

    /// Both limits hold for one sample.
    pub fn admits(&self, target_altitude: qtty::Degrees, sun_altitude: qtty::Degrees) -> bool {
        target_altitude.value() >= self.min_target_altitude.value()
            && sun_altitude.value() <= self.max_sun_altitude.value()
    }
}

impl Default for VisibilityThresholds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TARGET_ALTITUDE_DEG, DEFAULT_MAX_SUN_ALTITUDE_DEG)
    }
}

/// Closest approach of the Moon to a target during a night.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LunarSeparation {
    pub minimum: qtty::Degrees,
    pub at: JulianDate,
}

/// Outcome of the visibility computation for one target on one night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityResult {
    pub target: String,
    pub visible: bool,
    /// Span between the first and last visible fine-grid samples
    pub hours: qtty::Hours,
    /// Sum of visible fine-grid samples (diagnostic only)
    pub masked_hours: qtty::Hours,
    /// First visible fine-grid sample
    pub visible_from: Option<JulianDate>,
    /// Last visible fine-grid sample
    pub visible_until: Option<JulianDate>,
    pub peak_altitude: Option<qtty::Degrees>,
    pub lunar_separation: Option<LunarSeparation>,
}

impl VisibilityResult {
    /// Result for a target that never satisfies the limits.
    pub fn not_visible(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            visible: false,
            hours: qtty::Hours::new(0.0),
            masked_hours: qtty::Hours::new(0.0),
            visible_from: None,
            visible_until: None,
            peak_altitude: None,
            lunar_separation: None,
        }
    }
}
