//! Ephemeris backed by the `siderust` astronomy library.
//!
//! Sun, Moon and fixed ICRS directions are evaluated topocentrically for the
//! configured site, without refraction. Our timestamps are UTC Julian Dates;
//! `siderust` works on the TT Modified Julian Date axis, so every value is
//! converted at this boundary.

use log::debug;
use siderust::bodies::solar_system::{Moon, Sun};
use siderust::coordinates::centers::Geodetic;
use siderust::coordinates::frames::ECEF;
use siderust::coordinates::spherical::direction;
use siderust::event::altitude::{crossings, AltitudeProvider, CrossingDirection, SearchOpts};
use siderust::event::azimuth::AzimuthProvider;
use siderust::qtty::{Degrees as SkyDegrees, Meter, Quantity};
use siderust::time::{Interval, ModifiedJulianDate};

use super::{
    EphemerisError, EphemerisProvider, EphemerisResult, SunEvent, CROSSING_SEARCH_SPAN_DAYS,
    HORIZON_ALTITUDE_DEG,
};
use crate::models::{HorizontalCoordinates, JulianDate, ObservingSite, SkyCoordinates};

/// [`EphemerisProvider`] for one site, computed with `siderust`.
pub struct SiderustEphemeris {
    site: ObservingSite,
    observer: Geodetic<ECEF>,
}

impl SiderustEphemeris {
    pub fn new(site: ObservingSite) -> Self {
        let observer = Geodetic::<ECEF>::new(
            SkyDegrees::new(site.longitude().value()),
            SkyDegrees::new(site.latitude().value()),
            Quantity::<Meter>::new(site.elevation_m()),
        );
        Self { site, observer }
    }

    pub fn site(&self) -> &ObservingSite {
        &self.site
    }

    fn horizontal<B>(&self, body: &B, times: &[JulianDate]) -> Vec<HorizontalCoordinates>
    where
        B: AltitudeProvider + AzimuthProvider,
    {
        times
            .iter()
            .map(|&t| {
                let mjd = to_tt(t);
                HorizontalCoordinates::new(
                    body.altitude_at(&self.observer, mjd).value().to_degrees(),
                    body.azimuth_at(&self.observer, mjd).value().to_degrees(),
                )
            })
            .collect()
    }

    /// Sun horizon crossing of the given kind closest to `near`, searched one
    /// day either side.
    fn sun_crossing(&self, near: JulianDate, event: SunEvent) -> EphemerisResult<JulianDate> {
        let offset = tt_offset_days(near);
        let centre = near.to_mjd() + offset;
        let window = Interval::new(
            ModifiedJulianDate::new(centre - CROSSING_SEARCH_SPAN_DAYS),
            ModifiedJulianDate::new(centre + CROSSING_SEARCH_SPAN_DAYS),
        );
        let wanted = match event {
            SunEvent::Sunset => CrossingDirection::Setting,
            SunEvent::Sunrise => CrossingDirection::Rising,
        };

        let events = crossings(
            &Sun,
            &self.observer,
            window,
            SkyDegrees::new(HORIZON_ALTITUDE_DEG),
            SearchOpts::default(),
        );
        debug!(
            "{} Sun horizon crossing(s) within {} day(s) of {} at {}",
            events.len(),
            CROSSING_SEARCH_SPAN_DAYS,
            near,
            self.site.name()
        );

        let distance = |t: &JulianDate| (t.value() - near.value()).abs();
        events
            .into_iter()
            .filter(|e| e.direction == wanted)
            .map(|e| JulianDate::from_mjd(e.mjd.raw().value() - offset))
            .filter(|t| t.value().is_finite())
            .min_by(|a, b| distance(a).total_cmp(&distance(b)))
            .ok_or(EphemerisError::NoHorizonCrossing {
                event,
                near,
                span_days: CROSSING_SEARCH_SPAN_DAYS,
            })
    }
}

impl EphemerisProvider for SiderustEphemeris {
    fn sun_altitudes(&self, times: &[JulianDate]) -> EphemerisResult<Vec<qtty::Degrees>> {
        Ok(times
            .iter()
            .map(|&t| {
                let altitude = Sun.altitude_at(&self.observer, to_tt(t));
                qtty::Degrees::new(altitude.value().to_degrees())
            })
            .collect())
    }

    fn moon_positions(&self, times: &[JulianDate]) -> EphemerisResult<Vec<HorizontalCoordinates>> {
        Ok(self.horizontal(&Moon, times))
    }

    fn target_positions(
        &self,
        target: &SkyCoordinates,
        times: &[JulianDate],
    ) -> EphemerisResult<Vec<HorizontalCoordinates>> {
        if !target.ra.value().is_finite() || !target.dec.value().is_finite() {
            return Err(EphemerisError::InvalidInput(format!(
                "non-finite target coordinates ({}, {})",
                target.ra.value(),
                target.dec.value()
            )));
        }
        let icrs = direction::ICRS::new(
            SkyDegrees::new(target.ra.value()),
            SkyDegrees::new(target.dec.value()),
        );
        Ok(self.horizontal(&icrs, times))
    }

    fn sunset(&self, near: JulianDate) -> EphemerisResult<JulianDate> {
        self.sun_crossing(near, SunEvent::Sunset)
    }

    fn sunrise(&self, near: JulianDate) -> EphemerisResult<JulianDate> {
        self.sun_crossing(near, SunEvent::Sunrise)
    }
}

/// UTC instant on the TT Modified Julian Date axis.
fn to_tt(t: JulianDate) -> ModifiedJulianDate {
    ModifiedJulianDate::from_chrono(t.to_datetime())
}

/// TT minus UTC at `t`, in days.
fn tt_offset_days(t: JulianDate) -> f64 {
    to_tt(t).raw().value() - t.to_mjd()
}
