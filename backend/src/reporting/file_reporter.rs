//! Structured-data reporter: JSON chart data and CSV tables.
//!
//! Files written into the run directory:
//!
//! - `<night>_altitude.json`: altitude chart series
//! - `<night>_info.csv`: per-night information table
//!
//! `<night>` is the night label: the UTC date, or `YYYY-MM-DD_HHMM` when a
//! campaign has several nights on one date.
//! - `visibility_duration.csv`: visible hours, one row per night
//! - `summary.json`: whole campaign, including skipped computations

use std::fs::File;
use std::io::BufWriter;

use log::debug;
use serde::Serialize;

use super::{
    AltitudeChartRequest, CampaignSummaryRequest, NightTableRequest, ReportError, ReportResult,
    Reporter, RunContext,
};

pub const DURATION_TABLE_FILE: &str = "visibility_duration.csv";
pub const SUMMARY_FILE: &str = "summary.json";

const NOT_AVAILABLE: &str = "N/A";

/// Writes every request as a file under the run directory.
#[derive(Debug, Clone)]
pub struct FileReporter {
    run: RunContext,
}

impl FileReporter {
    pub fn new(run: RunContext) -> Self {
        Self { run }
    }

    pub fn run(&self) -> &RunContext {
        &self.run
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> ReportResult<()> {
        let path = self.run.artifact(file_name);
        let file = File::create(&path).map_err(|e| ReportError::io(&path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|source| {
            ReportError::Serialization {
                what: file_name.to_string(),
                source,
            }
        })?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn write_csv(&self, file_name: &str, header: &[String], rows: &[Vec<String>]) -> ReportResult<()> {
        let path = self.run.artifact(file_name);
        let table_error = |source| ReportError::Table {
            path: path.clone(),
            source,
        };
        let mut writer = csv::Writer::from_path(&path).map_err(table_error)?;
        writer.write_record(header).map_err(table_error)?;
        for row in rows {
            writer.write_record(row).map_err(table_error)?;
        }
        writer.flush().map_err(|e| ReportError::io(&path, e))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

fn fixed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Rows of the per-night information table, formatted for display.
pub fn night_table_rows(request: &NightTableRequest) -> (Vec<String>, Vec<Vec<String>>) {
    let header = [
        "Target",
        "Visible Hours",
        "Max Alt.",
        "App. Mag. (V)",
        "Lunar Sep.",
        "Lunar Sep. Time",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let rows = request
        .rows
        .iter()
        .map(|row| {
            vec![
                row.target.clone(),
                format!("{:.2}", row.hours.value()),
                fixed(row.peak_altitude.map(|a| a.value()), 1),
                fixed(row.magnitude, 1),
                fixed(row.lunar_separation.map(|s| s.value()), 1),
                row.lunar_separation_at
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ]
        })
        .collect();

    (header, rows)
}

/// Rows of the campaign duration table: one column per target.
pub fn duration_table_rows(request: &CampaignSummaryRequest) -> (Vec<String>, Vec<Vec<String>>) {
    let header = std::iter::once("Date".to_string())
        .chain(request.targets.iter().cloned())
        .collect();

    let rows = request
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.label.clone())
                .chain(
                    request
                        .targets
                        .iter()
                        .map(|t| format!("{:.2}", row.get(t).map_or(0.0, |h| h.value()))),
                )
                .collect()
        })
        .collect();

    (header, rows)
}

impl Reporter for FileReporter {
    fn altitude_chart(&mut self, request: &AltitudeChartRequest) -> ReportResult<()> {
        self.write_json(&format!("{}_altitude.json", request.label), request)
    }

    fn night_table(&mut self, request: &NightTableRequest) -> ReportResult<()> {
        let (header, rows) = night_table_rows(request);
        self.write_csv(&format!("{}_info.csv", request.label), &header, &rows)
    }

    fn campaign_summary(&mut self, request: &CampaignSummaryRequest) -> ReportResult<()> {
        let (header, rows) = duration_table_rows(request);
        self.write_csv(DURATION_TABLE_FILE, &header, &rows)?;
        self.write_json(SUMMARY_FILE, request)
    }
}
