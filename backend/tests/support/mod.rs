#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use obsplan::catalog::{CatalogError, CatalogResolver, CatalogResult};
use obsplan::ephemeris::{EphemerisError, EphemerisProvider, EphemerisResult};
use obsplan::models::{HorizontalCoordinates, JulianDate, ResolvedTarget, SkyCoordinates};
use obsplan::reporting::{
    AltitudeChartRequest, CampaignSummaryRequest, NightTableRequest, ReportResult, Reporter,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn jd(s: &str) -> JulianDate {
    JulianDate::parse_iso(s).expect("valid timestamp")
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Deterministic ephemeris for pipeline tests.
///
/// - Sun: `amplitude * cos(2*pi*f)` where `f` is the fraction of the day
///   since noon UTC, so sunset is 18:00 and sunrise 06:00.
/// - Moon: fixed horizontal position.
/// - Targets: constant altitude equal to their declination, azimuth equal to
///   their right ascension.
/// - Any Moon request touching `blackout` fails, which fails the whole night.
#[derive(Debug, Clone)]
pub struct SyntheticEphemeris {
    pub sun_amplitude: f64,
    pub moon: HorizontalCoordinates,
    pub blackout: Option<(JulianDate, JulianDate)>,
}

impl Default for SyntheticEphemeris {
    fn default() -> Self {
        Self {
            sun_amplitude: 40.0,
            moon: HorizontalCoordinates::new(5.0, 0.0),
            blackout: None,
        }
    }
}

impl EphemerisProvider for SyntheticEphemeris {
    fn sun_altitudes(&self, times: &[JulianDate]) -> EphemerisResult<Vec<qtty::Degrees>> {
        Ok(times
            .iter()
            .map(|t| {
                let phase = (t.value() - t.value().floor()) * std::f64::consts::TAU;
                qtty::Degrees::new(self.sun_amplitude * phase.cos())
            })
            .collect())
    }

    fn moon_positions(&self, times: &[JulianDate]) -> EphemerisResult<Vec<HorizontalCoordinates>> {
        if let Some((from, until)) = self.blackout {
            if times.iter().any(|t| *t >= from && *t <= until) {
                return Err(EphemerisError::Computation("lunar theory unavailable".to_string()));
            }
        }
        Ok(vec![self.moon; times.len()])
    }

    fn target_positions(
        &self,
        target: &SkyCoordinates,
        times: &[JulianDate],
    ) -> EphemerisResult<Vec<HorizontalCoordinates>> {
        Ok(vec![
            HorizontalCoordinates::new(target.dec.value(), target.ra.value());
            times.len()
        ])
    }
}

/// Catalog held in memory, with optional per-name delay and failures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: HashMap<String, (SkyCoordinates, Option<f64>)>,
    delays: HashMap<String, Duration>,
    transient: HashSet<String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, ra: f64, dec: f64, v_mag: Option<f64>) -> Self {
        let coordinates = SkyCoordinates::new(ra, dec).expect("valid coordinates");
        self.entries.insert(name.to_string(), (coordinates, v_mag));
        self
    }

    pub fn delayed(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.transient.insert(name.to_string());
        self
    }

    async fn entry(&self, name: &str) -> CatalogResult<(SkyCoordinates, Option<f64>)> {
        if let Some(delay) = self.delays.get(name) {
            tokio::time::sleep(*delay).await;
        }
        if self.transient.contains(name) {
            return Err(CatalogError::Transient {
                name: name.to_string(),
                message: "service unavailable".to_string(),
            });
        }
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }
}

#[async_trait]
impl CatalogResolver for InMemoryCatalog {
    async fn resolve(&self, name: &str) -> CatalogResult<SkyCoordinates> {
        self.entry(name).await.map(|(coordinates, _)| coordinates)
    }

    async fn apparent_magnitude(&self, name: &str) -> CatalogResult<Option<f64>> {
        self.entry(name).await.map(|(_, v_mag)| v_mag)
    }
}

/// Target at a constant synthetic altitude (`altitude` becomes the declination).
pub fn synthetic_target(name: &str, altitude: f64, v_mag: Option<f64>) -> ResolvedTarget {
    ResolvedTarget::new(
        name,
        SkyCoordinates::new(180.0, altitude).expect("valid coordinates"),
        v_mag,
    )
}

/// Reporter that keeps every request it receives.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub charts: Vec<AltitudeChartRequest>,
    pub tables: Vec<NightTableRequest>,
    pub summaries: Vec<CampaignSummaryRequest>,
}

impl RecordingReporter {
    pub fn chart_dates(&self) -> Vec<NaiveDate> {
        self.charts.iter().map(|c| c.date).collect()
    }

    pub fn chart_labels(&self) -> Vec<&str> {
        self.charts.iter().map(|c| c.label.as_str()).collect()
    }
}

impl Reporter for RecordingReporter {
    fn altitude_chart(&mut self, request: &AltitudeChartRequest) -> ReportResult<()> {
        self.charts.push(request.clone());
        Ok(())
    }

    fn night_table(&mut self, request: &NightTableRequest) -> ReportResult<()> {
        self.tables.push(request.clone());
        Ok(())
    }

    fn campaign_summary(&mut self, request: &CampaignSummaryRequest) -> ReportResult<()> {
        self.summaries.push(request.clone());
        Ok(())
    }
}
