//! Public API surface of the planner.
//!
//! Consolidates the types a caller needs to run a campaign and adds
//! [`plan_campaign`], which resolves the target list once and runs the
//! campaign aggregator over the resolved targets, tabulating every
//! configured name.

pub use crate::catalog::{
    resolve_targets, CatalogError, CatalogResolver, LocalCatalog, ResolveOptions, TargetResolution,
};
pub use crate::config::{ConfigError, PlannerConfig};
pub use crate::ephemeris::{EphemerisError, EphemerisProvider, SiderustEphemeris};
pub use crate::models::{
    CampaignOutcome, CampaignRow, CampaignTable, CoordinateError, JulianDate, Night, NightReport,
    NightWindow, ObservingSite, ResolvedTarget, SkipKind, SkipSummary, SkippedComputation,
    SkyCoordinates, VisibilityResult, VisibilityThresholds,
};
pub use crate::reporting::{
    publish, FileReporter, PublishSummary, ReportError, Reporter, RunContext,
};
pub use crate::services::{
    run_campaign, run_configured_campaign, CampaignError, CampaignPlan, MAX_CAMPAIGN_NIGHTS,
};

use serde::{Deserialize, Serialize};

/// Resolved targets plus everything the campaign produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignRun {
    /// Targets that made it through resolution, in input order
    pub targets: Vec<ResolvedTarget>,
    pub outcome: CampaignOutcome,
}

/// Resolve `names` and run the campaign over the resolved targets.
///
/// Every name keeps a table column; unresolved ones read zero hours on every
/// night and are listed first in `outcome.skipped`.
pub async fn plan_campaign<R, E>(
    names: &[String],
    resolver: &R,
    ephemeris: &E,
    plan: &CampaignPlan,
    thresholds: &VisibilityThresholds,
    options: &ResolveOptions,
) -> CampaignRun
where
    R: CatalogResolver + ?Sized,
    E: EphemerisProvider + ?Sized,
{
    let resolution = resolve_targets(resolver, names, options).await;
    let mut outcome =
        run_configured_campaign(plan, names, &resolution.resolved, ephemeris, thresholds);

    let mut skipped = resolution.skipped;
    skipped.append(&mut outcome.skipped);
    outcome.skipped = skipped;

    CampaignRun {
        targets: resolution.resolved,
        outcome,
    }
}
