use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Out-of-range angle or distance in a position or site definition.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("right ascension must be finite, got {0}")]
    NonFiniteRightAscension(f64),

    #[error("declination must be between -90 and 90 degrees, got {0}")]
    DeclinationOutOfRange(f64),

    #[error("latitude must be between -90 and 90 degrees, got {0}")]
    LatitudeOutOfRange(f64),

    #[error("longitude must be between -180 and 180 degrees, got {0}")]
    LongitudeOutOfRange(f64),

    #[error("elevation must be a finite number of meters, got {0}")]
    NonFiniteElevation(f64),
}

/// Equatorial sky position (ICRS, J2000.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyCoordinates {
    /// Right ascension, normalized to [0, 360)
    pub ra: qtty::Degrees,
    /// Declination in [-90, 90]
    pub dec: qtty::Degrees,
}

impl SkyCoordinates {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Result<Self, CoordinateError> {
        if !ra_deg.is_finite() {
            return Err(CoordinateError::NonFiniteRightAscension(ra_deg));
        }
        if !(-90.0..=90.0).contains(&dec_deg) {
            return Err(CoordinateError::DeclinationOutOfRange(dec_deg));
        }
        Ok(Self {
            ra: qtty::Degrees::new(ra_deg.rem_euclid(360.0)),
            dec: qtty::Degrees::new(dec_deg),
        })
    }
}

/// Position in the observer's horizontal frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoordinates {
    /// Altitude above the horizon
    pub altitude: qtty::Degrees,
    /// Azimuth, north through east, in [0, 360)
    pub azimuth: qtty::Degrees,
}

impl HorizontalCoordinates {
    pub fn new(altitude_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            altitude: qtty::Degrees::new(altitude_deg),
            azimuth: qtty::Degrees::new(azimuth_deg.rem_euclid(360.0)),
        }
    }

    /// Great-circle angle between two horizontal directions, in [0, 180].
    ///
    /// Uses the Vincenty form, which stays accurate for both tiny and
    /// near-antipodal separations.
    pub fn separation(&self, other: &HorizontalCoordinates) -> qtty::Degrees {
        let (sin_a1, cos_a1) = self.altitude.value().to_radians().sin_cos();
        let (sin_a2, cos_a2) = other.altitude.value().to_radians().sin_cos();
        let (sin_dz, cos_dz) = (other.azimuth.value() - self.azimuth.value())
            .to_radians()
            .sin_cos();

        let x = cos_a2 * sin_dz;
        let y = cos_a1 * sin_a2 - sin_a1 * cos_a2 * cos_dz;
        let numerator = (x * x + y * y).sqrt();
        let denominator = sin_a1 * sin_a2 + cos_a1 * cos_a2 * cos_dz;

        qtty::Degrees::new(numerator.atan2(denominator).to_degrees())
    }
}

/// A catalog target with its position resolved for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    pub name: String,
    pub coordinates: SkyCoordinates,
    /// Apparent V magnitude; `None` when the catalog has no data.
    pub magnitude: Option<f64>,
}

impl ResolvedTarget {
    pub fn new(name: impl Into<String>, coordinates: SkyCoordinates, magnitude: Option<f64>) -> Self {
        Self {
            name: name.into(),
            coordinates,
            magnitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_sky_coordinates_wraps_ra() {
        let coords = SkyCoordinates::new(-10.0, 41.0).unwrap();
        assert_close(coords.ra.value(), 350.0, 1e-12);
        let coords = SkyCoordinates::new(370.0, 41.0).unwrap();
        assert_close(coords.ra.value(), 10.0, 1e-12);
    }

    #[test]
    fn test_sky_coordinates_rejects_bad_dec() {
        assert_eq!(
            SkyCoordinates::new(10.0, 90.5).unwrap_err(),
            CoordinateError::DeclinationOutOfRange(90.5)
        );
        assert!(matches!(
            SkyCoordinates::new(f64::NAN, 0.0),
            Err(CoordinateError::NonFiniteRightAscension(_))
        ));
        assert!(matches!(
            SkyCoordinates::new(10.0, f64::NAN),
            Err(CoordinateError::DeclinationOutOfRange(_))
        ));
    }

    #[test]
    fn test_coordinate_error_names_the_value() {
        let err = SkyCoordinates::new(10.0, -91.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "declination must be between -90 and 90 degrees, got -91"
        );
    }

    #[test]
    fn test_separation_same_point() {
        let a = HorizontalCoordinates::new(45.0, 120.0);
        assert_close(a.separation(&a).value(), 0.0, 1e-9);
    }

    #[test]
    fn test_separation_along_meridian() {
        let a = HorizontalCoordinates::new(20.0, 180.0);
        let b = HorizontalCoordinates::new(60.0, 180.0);
        assert_close(a.separation(&b).value(), 40.0, 1e-9);
    }

    #[test]
    fn test_separation_across_zenith() {
        let a = HorizontalCoordinates::new(30.0, 0.0);
        let b = HorizontalCoordinates::new(30.0, 180.0);
        assert_close(a.separation(&b).value(), 120.0, 1e-9);
    }

    #[test]
    fn test_separation_antipodal() {
        let a = HorizontalCoordinates::new(10.0, 90.0);
        let b = HorizontalCoordinates::new(-10.0, 270.0);
        assert_close(a.separation(&b).value(), 180.0, 1e-9);
    }

    #[test]
    fn test_separation_is_symmetric() {
        let a = HorizontalCoordinates::new(12.5, 33.0);
        let b = HorizontalCoordinates::new(-40.0, 301.0);
        assert_close(a.separation(&b).value(), b.separation(&a).value(), 1e-12);
    }
}
