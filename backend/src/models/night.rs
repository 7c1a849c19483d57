use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::time::{JulianDate, MINUTES_PER_DAY};

/// Half-width of the observing window around the night midpoint.
pub const NIGHT_WINDOW_HALF_WIDTH_HOURS: f64 = 7.5;
/// Coarse grid resolution (plotting, peak altitude, lunar separation).
pub const COARSE_RESOLUTION_MINUTES: f64 = 20.0;
/// Fine grid resolution (visibility mask).
pub const FINE_RESOLUTION_MINUTES: f64 = 1.0;

/// One observing night, identified by its reference Julian Date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Night {
    pub reference: JulianDate,
    /// UTC calendar date of the reference instant
    pub date: NaiveDate,
    /// Key of the night in tables and artifact names, unique within a campaign
    pub label: String,
}

impl Night {
    /// Night labelled by its calendar date.
    pub fn new(reference: JulianDate) -> Self {
        let date = reference.calendar_date();
        Self {
            reference,
            date,
            label: date.to_string(),
        }
    }

    /// Label with the reference time of day, `YYYY-MM-DD_HHMM`.
    pub fn timed_label(&self) -> String {
        self.reference.to_datetime().format("%Y-%m-%d_%H%M").to_string()
    }
}

/// Make night labels unique: the calendar date when no two nights share one,
/// otherwise date and time, with a `_N` night index as last resort.
pub fn assign_unique_labels(nights: &mut [Night]) {
    fn all_distinct(nights: &[Night]) -> bool {
        let mut seen = HashSet::with_capacity(nights.len());
        nights.iter().all(|n| seen.insert(n.label.as_str()))
    }

    if all_distinct(nights) {
        return;
    }
    for night in nights.iter_mut() {
        night.label = night.timed_label();
    }
    if all_distinct(nights) {
        return;
    }
    for (k, night) in nights.iter_mut().enumerate() {
        night.label = format!("{}_{}", night.label, k);
    }
}

/// Sunset/sunrise bracket of a night and the fixed-width window around its midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NightWindow {
    pub sunset: JulianDate,
    pub sunrise: JulianDate,
    pub midpoint: JulianDate,
    pub start: JulianDate,
    pub end: JulianDate,
}

impl NightWindow {
    pub fn from_sun_events(sunset: JulianDate, sunrise: JulianDate) -> Self {
        let midpoint = JulianDate::new((sunset.value() + sunrise.value()) / 2.0);
        Self {
            sunset,
            sunrise,
            midpoint,
            start: midpoint.add_hours(-NIGHT_WINDOW_HALF_WIDTH_HOURS),
            end: midpoint.add_hours(NIGHT_WINDOW_HALF_WIDTH_HOURS),
        }
    }

    pub fn duration(&self) -> qtty::Hours {
        self.end.hours_since(self.start)
    }
}

/// Evenly spaced timestamps over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    resolution: qtty::Minutes,
    times: Vec<JulianDate>,
}

impl TimeGrid {
    /// Build a grid starting at `start` (inclusive) and stopping before `end`.
    ///
    /// Sample `i` is computed as `start + i * step` so no rounding error
    /// accumulates along the grid.
    pub fn from_range(start: JulianDate, end: JulianDate, resolution: qtty::Minutes) -> Self {
        let step_days = resolution.value() / MINUTES_PER_DAY;
        let span = end.value() - start.value();
        let count = if step_days > 0.0 && span > 0.0 {
            // an end point a whole number of steps away stays exclusive despite JD rounding
            (span / step_days - 1e-3).ceil().max(0.0) as usize
        } else {
            0
        };
        let times = (0..count)
            .map(|i| start.add_days(i as f64 * step_days))
            .collect();
        Self { resolution, times }
    }

    pub fn coarse(window: &NightWindow) -> Self {
        Self::from_range(
            window.start,
            window.end,
            qtty::Minutes::new(COARSE_RESOLUTION_MINUTES),
        )
    }

    pub fn fine(window: &NightWindow) -> Self {
        Self::from_range(
            window.start,
            window.end,
            qtty::Minutes::new(FINE_RESOLUTION_MINUTES),
        )
    }

    pub fn resolution(&self) -> qtty::Minutes {
        self.resolution
    }

    pub fn times(&self) -> &[JulianDate] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
