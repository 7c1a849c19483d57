//! Campaign aggregation: one night per step across a date range.

use log::{info, warn};
use thiserror::Error;

use crate::ephemeris::EphemerisProvider;
use crate::models::{
    assign_unique_labels, CampaignOutcome, CampaignTable, JulianDate, Night, ResolvedTarget,
    SkippedComputation, VisibilityThresholds,
};
use crate::services::night_aggregator::compute_night;

/// Slack on the inclusive end so that `start + k * step` landing on `end`
/// survives float rounding.
const END_TOLERANCE_DAYS: f64 = 1e-9;

/// Upper bound on the nights of one campaign.
pub const MAX_CAMPAIGN_NIGHTS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CampaignError {
    #[error("step must be a positive number of days, got {0}")]
    InvalidStep(f64),

    #[error("campaign end {end} is before start {start}")]
    EndBeforeStart { start: JulianDate, end: JulianDate },

    #[error("campaign would have {count} nights, more than the maximum of {max}")]
    TooManyNights { count: f64, max: usize },
}

/// Date range and cadence of a campaign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CampaignPlan {
    start: JulianDate,
    end: JulianDate,
    step_days: f64,
}

impl CampaignPlan {
    pub fn new(start: JulianDate, end: JulianDate, step_days: f64) -> Result<Self, CampaignError> {
        if !(step_days.is_finite() && step_days > 0.0) {
            return Err(CampaignError::InvalidStep(step_days));
        }
        if end < start {
            return Err(CampaignError::EndBeforeStart { start, end });
        }
        let count = Self::count_for(end.value() - start.value(), step_days);
        if count > MAX_CAMPAIGN_NIGHTS as f64 {
            return Err(CampaignError::TooManyNights {
                count,
                max: MAX_CAMPAIGN_NIGHTS,
            });
        }
        Ok(Self {
            start,
            end,
            step_days,
        })
    }

    pub fn start(&self) -> JulianDate {
        self.start
    }

    pub fn end(&self) -> JulianDate {
        self.end
    }

    pub fn step_days(&self) -> f64 {
        self.step_days
    }

    fn count_for(span_days: f64, step_days: f64) -> f64 {
        ((span_days + END_TOLERANCE_DAYS) / step_days).floor() + 1.0
    }

    /// Number of nights in the closed interval `[start, end]`.
    pub fn night_count(&self) -> usize {
        Self::count_for(self.end.value() - self.start.value(), self.step_days) as usize
    }

    /// Night references `start + k * step` up to and including `end`, with
    /// labels unique across the campaign.
    pub fn nights(&self) -> Vec<Night> {
        let mut nights: Vec<Night> = (0..self.night_count())
            .map(|k| Night::new(self.start.add_days(k as f64 * self.step_days)))
            .collect();
        assign_unique_labels(&mut nights);
        nights
    }
}

/// Run the night aggregator for every night of the plan, with one table
/// column per target.
pub fn run_campaign<E: EphemerisProvider + ?Sized>(
    plan: &CampaignPlan,
    targets: &[ResolvedTarget],
    ephemeris: &E,
    thresholds: &VisibilityThresholds,
) -> CampaignOutcome {
    let configured: Vec<String> = targets.iter().map(|t| t.name.clone()).collect();
    run_configured_campaign(plan, &configured, targets, ephemeris, thresholds)
}

/// Run the night aggregator for every night of the plan.
///
/// The table has one column per `configured` name; configured names missing
/// from `targets` (unresolved) read zero on every night. Nights whose
/// aggregation fails get an all-zero row flagged `failed` and are recorded as
/// skipped; per-target failures inside a night are carried over from the
/// night report.
pub fn run_configured_campaign<E: EphemerisProvider + ?Sized>(
    plan: &CampaignPlan,
    configured: &[String],
    targets: &[ResolvedTarget],
    ephemeris: &E,
    thresholds: &VisibilityThresholds,
) -> CampaignOutcome {
    let nights = plan.nights();
    info!(
        "Campaign {} .. {} every {} day(s): {} nights, {} of {} targets resolved",
        plan.start,
        plan.end,
        plan.step_days,
        nights.len(),
        targets.len(),
        configured.len()
    );

    let mut outcome = CampaignOutcome {
        table: CampaignTable::new(configured.to_vec()),
        nights: Vec::with_capacity(nights.len()),
        skipped: Vec::new(),
    };

    for night in &nights {
        match compute_night(night, targets, ephemeris, thresholds) {
            Ok(report) => {
                outcome.table.push(&report);
                outcome.skipped.extend(report.skipped.iter().cloned());
                outcome.nights.push(report);
            }
            Err(e) => {
                warn!("Skipping night {}: {}", night.label, e);
                outcome.table.push_failed(night);
                outcome.skipped.push(SkippedComputation::night(night.date, e));
            }
        }
    }

    let summary = outcome.skip_summary();
    info!(
        "Campaign finished: {} of {} nights computed, {} computations skipped",
        outcome.table.computed_nights(),
        nights.len(),
        summary.total()
    );

    outcome
}
