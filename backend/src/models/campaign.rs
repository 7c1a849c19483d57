use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::night::{Night, NightWindow};
use super::time::JulianDate;
use super::visibility::VisibilityResult;

/// Why a computation was left out of the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    /// Catalog could not resolve the target name
    TargetResolution,
    /// Sun, Moon or target positions could not be computed
    Ephemeris,
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipKind::TargetResolution => write!(f, "target resolution"),
            SkipKind::Ephemeris => write!(f, "ephemeris"),
        }
    }
}

/// A target, night, or target-night pair that was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedComputation {
    pub kind: SkipKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub night: Option<NaiveDate>,
    pub reason: String,
}

impl SkippedComputation {
    pub fn unresolved_target(target: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            kind: SkipKind::TargetResolution,
            target: Some(target.into()),
            night: None,
            reason: reason.to_string(),
        }
    }

    pub fn target_night(target: impl Into<String>, night: NaiveDate, reason: impl ToString) -> Self {
        Self {
            kind: SkipKind::Ephemeris,
            target: Some(target.into()),
            night: Some(night),
            reason: reason.to_string(),
        }
    }

    pub fn night(night: NaiveDate, reason: impl ToString) -> Self {
        Self {
            kind: SkipKind::Ephemeris,
            target: None,
            night: Some(night),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for SkippedComputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref target) = self.target {
            write!(f, " target={}", target)?;
        }
        if let Some(ref night) = self.night {
            write!(f, " night={}", night)?;
        }
        write!(f, ": {}", self.reason)
    }
}

/// Coarse-grid altitude series of one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetTrack {
    pub target: String,
    pub altitudes: Vec<qtty::Degrees>,
}

/// Sampled series kept for the reporting layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NightTracks {
    pub coarse_times: Vec<JulianDate>,
    pub fine_times: Vec<JulianDate>,
    /// Sun altitude on the fine grid
    pub sun_altitudes: Vec<qtty::Degrees>,
    /// Moon altitude on the coarse grid
    pub moon_altitudes: Vec<qtty::Degrees>,
    /// Target altitudes on the coarse grid, in input order
    pub targets: Vec<TargetTrack>,
}

impl NightTracks {
    pub fn target(&self, name: &str) -> Option<&TargetTrack> {
        self.targets.iter().find(|t| t.target == name)
    }
}

/// All per-target results of one night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightReport {
    pub night: Night,
    pub window: NightWindow,
    /// One entry per input target, in input order
    pub results: Vec<VisibilityResult>,
    pub tracks: NightTracks,
    /// Targets whose positions could not be computed this night
    pub skipped: Vec<SkippedComputation>,
}

impl NightReport {
    pub fn visible(&self) -> impl Iterator<Item = &VisibilityResult> {
        self.results.iter().filter(|r| r.visible)
    }

    pub fn not_visible(&self) -> impl Iterator<Item = &VisibilityResult> {
        self.results.iter().filter(|r| !r.visible)
    }

    pub fn visible_targets(&self) -> Vec<&str> {
        self.visible().map(|r| r.target.as_str()).collect()
    }

    pub fn has_visible_targets(&self) -> bool {
        self.results.iter().any(|r| r.visible)
    }

    pub fn result(&self, target: &str) -> Option<&VisibilityResult> {
        self.results.iter().find(|r| r.target == target)
    }

    /// Visible hours of every target (zero when not visible).
    pub fn hours(&self) -> Vec<TargetHours> {
        self.results
            .iter()
            .map(|r| TargetHours {
                target: r.target.clone(),
                hours: r.hours,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetHours {
    pub target: String,
    pub hours: qtty::Hours,
}

/// One night of the campaign table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRow {
    pub date: NaiveDate,
    /// Unique night key, see [`Night::label`]
    pub label: String,
    pub reference: JulianDate,
    /// The night could not be computed; every entry is zero
    #[serde(default)]
    pub failed: bool,
    /// One entry per configured target, in configuration order
    pub hours: Vec<TargetHours>,
}

impl CampaignRow {
    pub fn get(&self, target: &str) -> Option<qtty::Hours> {
        self.hours
            .iter()
            .find(|h| h.target == target)
            .map(|h| h.hours)
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

/// Visible hours per night per target, in chronological night order.
///
/// Columns are fixed at construction: every row holds exactly one entry per
/// column, zero when the target was not visible, not resolved, or the night
/// failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignTable {
    targets: Vec<String>,
    rows: Vec<CampaignRow>,
}

impl CampaignTable {
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            rows: Vec::new(),
        }
    }

    /// Column names.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn push(&mut self, report: &NightReport) {
        let hours = self
            .targets
            .iter()
            .map(|name| TargetHours {
                target: name.clone(),
                hours: report
                    .result(name)
                    .map_or(qtty::Hours::new(0.0), |r| r.hours),
            })
            .collect();
        self.rows.push(CampaignRow {
            date: report.night.date,
            label: report.night.label.clone(),
            reference: report.night.reference,
            failed: false,
            hours,
        });
    }

    /// All-zero row for a night whose aggregation failed.
    pub fn push_failed(&mut self, night: &Night) {
        let hours = self
            .targets
            .iter()
            .map(|name| TargetHours {
                target: name.clone(),
                hours: qtty::Hours::new(0.0),
            })
            .collect();
        self.rows.push(CampaignRow {
            date: night.date,
            label: night.label.clone(),
            reference: night.reference,
            failed: true,
            hours,
        });
    }

    pub fn rows(&self) -> &[CampaignRow] {
        &self.rows
    }

    pub fn row(&self, label: &str) -> Option<&CampaignRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Rows whose reference falls on `date` (more than one with sub-daily steps).
    pub fn rows_on(&self, date: NaiveDate) -> impl Iterator<Item = &CampaignRow> {
        self.rows.iter().filter(move |r| r.date == date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    /// Hours of one target across all nights (zero where the entry is missing).
    pub fn series(&self, target: &str) -> Vec<qtty::Hours> {
        self.rows
            .iter()
            .map(|r| r.get(target).unwrap_or(qtty::Hours::new(0.0)))
            .collect()
    }

    /// Number of nights that were computed.
    pub fn computed_nights(&self) -> usize {
        self.rows.iter().filter(|r| !r.failed).count()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Skipped computations counted by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipSummary {
    pub unresolved_targets: usize,
    pub failed_nights: usize,
    pub failed_target_nights: usize,
}

impl SkipSummary {
    pub fn from_skipped(skipped: &[SkippedComputation]) -> Self {
        let mut summary = Self::default();
        for s in skipped {
            match (s.kind, s.target.is_some()) {
                (SkipKind::TargetResolution, _) => summary.unresolved_targets += 1,
                (SkipKind::Ephemeris, true) => summary.failed_target_nights += 1,
                (SkipKind::Ephemeris, false) => summary.failed_nights += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.unresolved_targets + self.failed_nights + self.failed_target_nights
    }
}

/// Everything a campaign run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignOutcome {
    pub table: CampaignTable,
    pub nights: Vec<NightReport>,
    pub skipped: Vec<SkippedComputation>,
}

impl CampaignOutcome {
    pub fn skip_summary(&self) -> SkipSummary {
        SkipSummary::from_skipped(&self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::night::assign_unique_labels;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_skip_summary_counts_by_kind() {
        let skipped = vec![
            SkippedComputation::unresolved_target("Nowhere", "not found"),
            SkippedComputation::night(date(1), "no sunset"),
            SkippedComputation::target_night("M 31", date(8), "bad input"),
            SkippedComputation::target_night("M 42", date(8), "bad input"),
        ];
        let summary = SkipSummary::from_skipped(&skipped);
        assert_eq!(summary.unresolved_targets, 1);
        assert_eq!(summary.failed_nights, 1);
        assert_eq!(summary.failed_target_nights, 2);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_skipped_display() {
        let s = SkippedComputation::target_night("M 31", date(8), "bad input");
        assert_eq!(s.to_string(), "ephemeris target=M 31 night=2025-03-08: bad input");
    }

    #[test]
    fn test_row_lookup() {
        let row = CampaignRow {
            date: date(1),
            label: "2025-03-01".to_string(),
            reference: JulianDate::new(2_460_736.0),
            failed: false,
            hours: vec![TargetHours {
                target: "M 31".to_string(),
                hours: qtty::Hours::new(2.5),
            }],
        };
        assert_eq!(row.get("M 31").map(|h| h.value()), Some(2.5));
        assert!(row.get("M 42").is_none());
        assert_eq!(row.len(), 1);
    }

    fn report(night: Night, visible: &[(&str, f64)]) -> NightReport {
        let window = NightWindow::from_sun_events(
            night.reference.add_hours(6.0),
            night.reference.add_hours(18.0),
        );
        let results = visible
            .iter()
            .map(|&(name, hours)| {
                let mut r = VisibilityResult::not_visible(name);
                r.visible = hours > 0.0;
                r.hours = qtty::Hours::new(hours);
                r
            })
            .collect();
        NightReport {
            night,
            window,
            results,
            tracks: NightTracks::default(),
            skipped: Vec::new(),
        }
    }

    fn columns() -> Vec<String> {
        vec!["M 31".to_string(), "Nowhere".to_string(), "M 42".to_string()]
    }

    #[test]
    fn test_every_configured_target_has_an_entry() {
        let mut table = CampaignTable::new(columns());
        let night = Night::new(JulianDate::parse_iso("2025-03-01 12:00").unwrap());
        table.push(&report(night, &[("M 31", 2.5), ("M 42", 0.0)]));

        let row = &table.rows()[0];
        let names: Vec<&str> = row.hours.iter().map(|h| h.target.as_str()).collect();
        assert_eq!(names, vec!["M 31", "Nowhere", "M 42"]);
        assert_eq!(row.get("Nowhere").map(|h| h.value()), Some(0.0));
        assert_eq!(row.get("M 31").map(|h| h.value()), Some(2.5));
        assert!(!row.failed);
    }

    #[test]
    fn test_failed_night_row_is_zero_filled() {
        let mut table = CampaignTable::new(columns());
        let first = Night::new(JulianDate::parse_iso("2025-03-01 12:00").unwrap());
        let second = Night::new(JulianDate::parse_iso("2025-03-08 12:00").unwrap());
        table.push(&report(first, &[("M 31", 1.0), ("M 42", 3.0)]));
        table.push_failed(&second);

        assert_eq!(table.len(), 2);
        assert_eq!(table.computed_nights(), 1);
        let failed = table.row("2025-03-08").unwrap();
        assert!(failed.failed);
        assert_eq!(failed.len(), 3);
        assert!(failed.hours.iter().all(|h| h.hours.value() == 0.0));
    }

    #[test]
    fn test_rows_share_a_date_but_not_a_label() {
        let mut nights: Vec<Night> = ["2025-03-01 06:00", "2025-03-01 18:00"]
            .iter()
            .map(|s| Night::new(JulianDate::parse_iso(s).unwrap()))
            .collect();
        assign_unique_labels(&mut nights);

        let mut table = CampaignTable::new(columns());
        for night in nights {
            table.push(&report(night, &[("M 31", 1.0)]));
        }
        assert_eq!(table.rows_on(date(1)).count(), 2);
        assert_eq!(table.labels(), vec!["2025-03-01_0600", "2025-03-01_1800"]);
        assert!(table.row("2025-03-01_1800").is_some());
    }
}
