use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Julian Date of the Unix epoch (1970-01-01 00:00:00 UTC).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Offset between Julian Date and Modified Julian Date.
pub const MJD_OFFSET: f64 = 2_400_000.5;
/// Julian Date of the J2000.0 epoch (2000-01-01 12:00:00).
pub const J2000_JD: f64 = 2_451_545.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const MINUTES_PER_DAY: f64 = 1_440.0;
pub const HOURS_PER_DAY: f64 = 24.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Error returned when a timestamp string cannot be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid timestamp '{input}': expected \"YYYY-MM-DD HH:MM\"")]
pub struct TimeParseError {
    pub input: String,
}

/// Julian Date representation (continuous day count, UTC scale).
/// JD 0 = -4712-01-01 12:00:00 (proleptic Julian calendar)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct JulianDate(qtty::Days);

impl JulianDate {
    /// Create a new JD value.
    pub fn new<V: Into<qtty::Days>>(v: V) -> Self {
        Self(v.into())
    }

    /// Raw JD value as f64.
    pub fn value(&self) -> f64 {
        self.0.value()
    }

    /// Create from a Modified Julian Date value.
    pub fn from_mjd(mjd: f64) -> Self {
        Self::new(mjd + MJD_OFFSET)
    }

    /// Modified Julian Date value.
    pub fn to_mjd(&self) -> f64 {
        self.value() - MJD_OFFSET
    }

    /// Convert to Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn to_unix_timestamp(&self) -> f64 {
        (self.value() - UNIX_EPOCH_JD) * SECONDS_PER_DAY
    }

    /// Create from Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn from_unix_timestamp(timestamp: f64) -> Self {
        Self::new(timestamp / SECONDS_PER_DAY + UNIX_EPOCH_JD)
    }

    /// Convert to chrono DateTime<Utc>, rounded to the nearest millisecond.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        let millis = (self.to_unix_timestamp() * 1_000.0).round() as i64;
        DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Create from chrono DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_unix_timestamp(dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9)
    }

    /// UTC calendar date containing this instant.
    pub fn calendar_date(&self) -> NaiveDate {
        self.to_datetime().date_naive()
    }

    /// Shift by a (possibly fractional, possibly negative) number of days.
    pub fn add_days(self, days: f64) -> Self {
        Self::new(self.value() + days)
    }

    /// Shift by a number of hours.
    pub fn add_hours(self, hours: f64) -> Self {
        self.add_days(hours / HOURS_PER_DAY)
    }

    /// Elapsed time from `earlier` to `self`.
    pub fn days_since(&self, earlier: JulianDate) -> qtty::Days {
        qtty::Days::new(self.value() - earlier.value())
    }

    /// Elapsed hours from `earlier` to `self`.
    pub fn hours_since(&self, earlier: JulianDate) -> qtty::Hours {
        qtty::Hours::new((self.value() - earlier.value()) * HOURS_PER_DAY)
    }

    /// Parse an ISO-8601-like UTC timestamp.
    ///
    /// Accepts `YYYY-MM-DD HH:MM`, `YYYY-MM-DD HH:MM:SS`, the same with a `T`
    /// separator, and a bare `YYYY-MM-DD` (midnight).
    pub fn parse_iso(input: &str) -> Result<Self, TimeParseError> {
        let trimmed = input.trim();
        for format in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self::from_datetime(naive.and_utc()));
            }
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self::from_datetime(naive.and_utc()))
            .ok_or_else(|| TimeParseError {
                input: input.to_string(),
            })
    }
}

impl From<f64> for JulianDate {
    fn from(v: f64) -> Self {
        JulianDate::new(v)
    }
}

impl From<DateTime<Utc>> for JulianDate {
    fn from(dt: DateTime<Utc>) -> Self {
        JulianDate::from_datetime(dt)
    }
}

impl fmt::Display for JulianDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().format("%Y-%m-%d %H:%M:%S"))
    }
}
