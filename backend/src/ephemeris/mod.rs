//! Ephemeris provider interface.
//!
//! An [`EphemerisProvider`] turns timestamps into horizontal coordinates of
//! the Sun, the Moon and fixed sky targets for one observing site, and finds
//! the sunset/sunrise that bracket a night. Implementations are treated as
//! pure functions of their inputs. [`SiderustEphemeris`] is the built-in
//! provider.

pub mod astro;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use astro::SiderustEphemeris;

use crate::models::{HorizontalCoordinates, JulianDate, SkyCoordinates};

/// Sun altitude that defines sunset and sunrise (geometric horizon).
pub const HORIZON_ALTITUDE_DEG: f64 = 0.0;

const CROSSING_SEARCH_SPAN_DAYS: f64 = 1.0;
const CROSSING_SCAN_STEP_MINUTES: f64 = 10.0;
const CROSSING_TOLERANCE_DAYS: f64 = 1e-6;

/// Result type for ephemeris operations
pub type EphemerisResult<T> = Result<T, EphemerisError>;

/// Error type for ephemeris operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EphemerisError {
    /// The Sun does not cross the horizon near the requested time (polar day or night).
    #[error("no {event} within {span_days} day(s) of {near}")]
    NoHorizonCrossing {
        event: SunEvent,
        near: JulianDate,
        span_days: f64,
    },

    /// Inputs are inconsistent (e.g. series of different lengths).
    #[error("invalid ephemeris input: {0}")]
    InvalidInput(String),

    /// The provider failed to compute a position.
    #[error("ephemeris computation failed: {0}")]
    Computation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SunEvent {
    Sunset,
    Sunrise,
}

impl fmt::Display for SunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SunEvent::Sunset => write!(f, "sunset"),
            SunEvent::Sunrise => write!(f, "sunrise"),
        }
    }
}

/// Source of Sun, Moon and target positions for a fixed site.
pub trait EphemerisProvider {
    /// Sun altitude at each timestamp.
    fn sun_altitudes(&self, times: &[JulianDate]) -> EphemerisResult<Vec<qtty::Degrees>>;

    /// Moon altitude/azimuth at each timestamp.
    fn moon_positions(&self, times: &[JulianDate]) -> EphemerisResult<Vec<HorizontalCoordinates>>;

    /// Altitude/azimuth of a fixed sky position at each timestamp.
    fn target_positions(
        &self,
        target: &SkyCoordinates,
        times: &[JulianDate],
    ) -> EphemerisResult<Vec<HorizontalCoordinates>>;

    /// Sunset nearest to `near`. The default scans [`Self::sun_altitudes`].
    fn sunset(&self, near: JulianDate) -> EphemerisResult<JulianDate> {
        nearest_horizon_crossing(self, near, SunEvent::Sunset)
    }

    /// Sunrise nearest to `near`.
    fn sunrise(&self, near: JulianDate) -> EphemerisResult<JulianDate> {
        nearest_horizon_crossing(self, near, SunEvent::Sunrise)
    }
}

/// Find the Sun horizon crossing of the given kind closest to `near`.
///
/// Scans one day either side at a fixed step, then bisects every bracket that
/// changes sign in the right direction.
pub fn nearest_horizon_crossing<E: EphemerisProvider + ?Sized>(
    ephemeris: &E,
    near: JulianDate,
    event: SunEvent,
) -> EphemerisResult<JulianDate> {
    let step = CROSSING_SCAN_STEP_MINUTES / crate::models::MINUTES_PER_DAY;
    let samples = (2.0 * CROSSING_SEARCH_SPAN_DAYS / step).round() as usize;
    let start = near.add_days(-CROSSING_SEARCH_SPAN_DAYS);
    let times: Vec<JulianDate> = (0..=samples)
        .map(|i| start.add_days(i as f64 * step))
        .collect();
    let altitudes = ephemeris.sun_altitudes(&times)?;
    if altitudes.len() != times.len() {
        return Err(EphemerisError::InvalidInput(format!(
            "expected {} Sun altitudes, got {}",
            times.len(),
            altitudes.len()
        )));
    }

    let is_up = |alt: qtty::Degrees| alt.value() > HORIZON_ALTITUDE_DEG;
    let mut best: Option<JulianDate> = None;
    for i in 0..samples {
        let (before, after) = (is_up(altitudes[i]), is_up(altitudes[i + 1]));
        let matches = match event {
            SunEvent::Sunset => before && !after,
            SunEvent::Sunrise => !before && after,
        };
        if !matches {
            continue;
        }
        let crossing = bisect_crossing(ephemeris, times[i], times[i + 1], before)?;
        let closer = best.map_or(true, |b| {
            (crossing.value() - near.value()).abs() < (b.value() - near.value()).abs()
        });
        if closer {
            best = Some(crossing);
        }
    }

    best.ok_or(EphemerisError::NoHorizonCrossing {
        event,
        near,
        span_days: CROSSING_SEARCH_SPAN_DAYS,
    })
}

fn bisect_crossing<E: EphemerisProvider + ?Sized>(
    ephemeris: &E,
    mut low: JulianDate,
    mut high: JulianDate,
    low_is_up: bool,
) -> EphemerisResult<JulianDate> {
    while high.value() - low.value() > CROSSING_TOLERANCE_DAYS {
        let mid = JulianDate::new((low.value() + high.value()) / 2.0);
        let altitude = ephemeris
            .sun_altitudes(&[mid])?
            .first()
            .copied()
            .ok_or_else(|| EphemerisError::InvalidInput("no Sun altitude returned".to_string()))?;
        if (altitude.value() > HORIZON_ALTITUDE_DEG) == low_is_up {
            low = mid;
        } else {
            high = mid;
        }
    }
    Ok(JulianDate::new((low.value() + high.value()) / 2.0))
}
