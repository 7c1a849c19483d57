use serde::{Deserialize, Serialize};

use super::target::CoordinateError;

/// Fixed observing site (timezone is always UTC).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservingSite {
    name: String,
    /// Latitude in decimal degrees (-90 to 90)
    latitude: f64,
    /// Longitude in decimal degrees, east positive (-180 to 180)
    longitude: f64,
    /// Elevation in meters above sea level
    elevation_m: f64,
}

impl ObservingSite {
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        elevation_m: f64,
    ) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        if !elevation_m.is_finite() {
            return Err(CoordinateError::NonFiniteElevation(elevation_m));
        }
        Ok(Self {
            name: name.into(),
            latitude,
            longitude,
            elevation_m,
        })
    }

    /// Bayfordbury Observatory, Hertfordshire.
    pub fn bayfordbury() -> Self {
        Self {
            name: "Bayfordbury".to_string(),
            latitude: 51.775,
            longitude: -0.09,
            elevation_m: 66.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> qtty::Degrees {
        qtty::Degrees::new(self.latitude)
    }

    pub fn longitude(&self) -> qtty::Degrees {
        qtty::Degrees::new(self.longitude)
    }

    pub fn elevation_m(&self) -> f64 {
        self.elevation_m
    }
}

impl Default for ObservingSite {
    fn default() -> Self {
        Self::bayfordbury()
    }
}
