//! Reporting layer.
//!
//! Turns aggregator output into presentation requests and hands them to a
//! [`Reporter`]. Per-night requests are only issued for nights with at least
//! one visible target; the campaign summary is always issued.

pub mod file_reporter;
pub mod run_context;
pub mod twilight;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub use file_reporter::FileReporter;
pub use run_context::RunContext;
pub use twilight::{twilight_segments, TwilightPhase, TwilightSegment};

use crate::models::{
    CampaignOutcome, CampaignRow, JulianDate, NightReport, NightWindow, ResolvedTarget,
    SkipSummary, SkippedComputation, TargetTrack,
};

/// Result type for reporting operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Error type for reporting operations
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialization {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write table {}: {source}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ReportError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Altitude-vs-time chart of one night (visible targets only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeChartRequest {
    pub date: NaiveDate,
    /// Night key, unique within the campaign
    pub label: String,
    pub window: NightWindow,
    /// Coarse grid shared by target and Moon series
    pub times: Vec<JulianDate>,
    pub targets: Vec<TargetTrack>,
    pub moon_altitudes: Vec<qtty::Degrees>,
    /// Fine grid of the Sun series
    pub sun_times: Vec<JulianDate>,
    pub sun_altitudes: Vec<qtty::Degrees>,
    pub twilight: Vec<TwilightSegment>,
}

impl AltitudeChartRequest {
    pub fn from_report(report: &NightReport) -> Self {
        let targets = report
            .visible()
            .filter_map(|r| report.tracks.target(&r.target).cloned())
            .collect();
        Self {
            date: report.night.date,
            label: report.night.label.clone(),
            window: report.window,
            times: report.tracks.coarse_times.clone(),
            targets,
            moon_altitudes: report.tracks.moon_altitudes.clone(),
            sun_times: report.tracks.fine_times.clone(),
            sun_altitudes: report.tracks.sun_altitudes.clone(),
            twilight: twilight_segments(&report.tracks.fine_times, &report.tracks.sun_altitudes),
        }
    }

    /// Names of the plotted targets.
    pub fn visible_targets(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.target.as_str()).collect()
    }
}

/// One line of the per-night information table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightTableRow {
    pub target: String,
    pub hours: qtty::Hours,
    pub peak_altitude: Option<qtty::Degrees>,
    pub magnitude: Option<f64>,
    pub lunar_separation: Option<qtty::Degrees>,
    pub lunar_separation_at: Option<JulianDate>,
}

/// Information table of one night (visible targets only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightTableRequest {
    pub date: NaiveDate,
    pub label: String,
    pub rows: Vec<NightTableRow>,
}

impl NightTableRequest {
    /// Magnitudes are taken from the resolved target list.
    pub fn from_report(report: &NightReport, targets: &[ResolvedTarget]) -> Self {
        let magnitude = |name: &str| {
            targets
                .iter()
                .find(|t| t.name == name)
                .and_then(|t| t.magnitude)
        };
        let rows = report
            .visible()
            .map(|r| NightTableRow {
                target: r.target.clone(),
                hours: r.hours,
                peak_altitude: r.peak_altitude,
                magnitude: magnitude(&r.target),
                lunar_separation: r.lunar_separation.map(|s| s.minimum),
                lunar_separation_at: r.lunar_separation.map(|s| s.at),
            })
            .collect();
        Self {
            date: report.night.date,
            label: report.night.label.clone(),
            rows,
        }
    }
}

/// Visible hours over the whole campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummaryRequest {
    /// Every configured target, in table column order
    pub targets: Vec<String>,
    pub rows: Vec<CampaignRow>,
    pub skipped: Vec<SkippedComputation>,
    pub skip_summary: SkipSummary,
}

impl CampaignSummaryRequest {
    pub fn from_outcome(outcome: &CampaignOutcome) -> Self {
        Self {
            targets: outcome.table.targets().to_vec(),
            rows: outcome.table.rows().to_vec(),
            skipped: outcome.skipped.clone(),
            skip_summary: outcome.skip_summary(),
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }
}

/// Presentation backend.
pub trait Reporter {
    fn altitude_chart(&mut self, request: &AltitudeChartRequest) -> ReportResult<()>;

    fn night_table(&mut self, request: &NightTableRequest) -> ReportResult<()>;

    fn campaign_summary(&mut self, request: &CampaignSummaryRequest) -> ReportResult<()>;
}

/// What [`publish`] handed to the reporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub nights_reported: usize,
    pub nights_without_visible_targets: usize,
}

/// Feed a campaign outcome to a reporter.
pub fn publish<R: Reporter + ?Sized>(
    outcome: &CampaignOutcome,
    targets: &[ResolvedTarget],
    reporter: &mut R,
) -> ReportResult<PublishSummary> {
    let mut summary = PublishSummary::default();

    for report in &outcome.nights {
        if !report.has_visible_targets() {
            debug!("No visible targets on {}, skipping night reports", report.night.label);
            summary.nights_without_visible_targets += 1;
            continue;
        }
        reporter.altitude_chart(&AltitudeChartRequest::from_report(report))?;
        reporter.night_table(&NightTableRequest::from_report(report, targets))?;
        summary.nights_reported += 1;
    }

    reporter.campaign_summary(&CampaignSummaryRequest::from_outcome(outcome))?;

    info!(
        "Published {} night reports ({} nights without visible targets)",
        summary.nights_reported, summary.nights_without_visible_targets
    );
    Ok(summary)
}
