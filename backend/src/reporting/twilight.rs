//! Twilight phases of a night, for chart shading.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::JulianDate;

/// Sky brightness phase from the Sun's altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwilightPhase {
    /// Sun above the horizon
    Day,
    /// 0 to -6 deg
    Civil,
    /// -6 to -12 deg
    Nautical,
    /// -12 to -18 deg
    Astronomical,
    /// Below -18 deg
    Night,
}

impl TwilightPhase {
    pub fn from_sun_altitude(altitude: qtty::Degrees) -> Self {
        let alt = altitude.value();
        if alt > 0.0 {
            TwilightPhase::Day
        } else if alt >= -6.0 {
            TwilightPhase::Civil
        } else if alt >= -12.0 {
            TwilightPhase::Nautical
        } else if alt >= -18.0 {
            TwilightPhase::Astronomical
        } else {
            TwilightPhase::Night
        }
    }
}

impl fmt::Display for TwilightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TwilightPhase::Day => "day",
            TwilightPhase::Civil => "civil twilight",
            TwilightPhase::Nautical => "nautical twilight",
            TwilightPhase::Astronomical => "astronomical twilight",
            TwilightPhase::Night => "night",
        };
        write!(f, "{}", label)
    }
}

/// Run of consecutive samples in the same phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwilightSegment {
    pub phase: TwilightPhase,
    pub start: JulianDate,
    /// Last sample of the run (inclusive)
    pub end: JulianDate,
}

/// Collapse a sampled Sun altitude series into phase segments.
pub fn twilight_segments(times: &[JulianDate], sun_altitudes: &[qtty::Degrees]) -> Vec<TwilightSegment> {
    let mut segments: Vec<TwilightSegment> = Vec::new();
    for (&time, &altitude) in times.iter().zip(sun_altitudes) {
        let phase = TwilightPhase::from_sun_altitude(altitude);
        match segments.last_mut() {
            Some(last) if last.phase == phase => last.end = time,
            _ => segments.push(TwilightSegment {
                phase,
                start: time,
                end: time,
            }),
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_boundaries() {
        let phase = |a: f64| TwilightPhase::from_sun_altitude(qtty::Degrees::new(a));
        assert_eq!(phase(0.5), TwilightPhase::Day);
        assert_eq!(phase(0.0), TwilightPhase::Civil);
        assert_eq!(phase(-6.0), TwilightPhase::Civil);
        assert_eq!(phase(-6.1), TwilightPhase::Nautical);
        assert_eq!(phase(-18.0), TwilightPhase::Astronomical);
        assert_eq!(phase(-18.1), TwilightPhase::Night);
    }

    #[test]
    fn test_segments_collapse_runs() {
        let times: Vec<JulianDate> = (0..6).map(|i| JulianDate::new(2_460_736.0 + i as f64)).collect();
        let sun: Vec<qtty::Degrees> = [5.0, -3.0, -4.0, -20.0, -25.0, -3.0]
            .iter()
            .map(|&a| qtty::Degrees::new(a))
            .collect();
        let segments = twilight_segments(&times, &sun);
        let phases: Vec<TwilightPhase> = segments.iter().map(|s| s.phase).collect();
        assert_eq!(
            phases,
            vec![
                TwilightPhase::Day,
                TwilightPhase::Civil,
                TwilightPhase::Night,
                TwilightPhase::Civil
            ]
        );
        assert_eq!(segments[1].start, times[1]);
        assert_eq!(segments[1].end, times[2]);
        assert_eq!(segments[2].end, times[4]);
    }
}
