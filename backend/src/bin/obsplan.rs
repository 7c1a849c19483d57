//! obsplan command-line entry point
//!
//! Resolves the target list against the local catalog, computes nightly
//! visibility for every night of the campaign and writes the reports into a
//! fresh timestamped directory.
//!
//! # Usage
//!
//! ```bash
//! obsplan --targets-file targets.txt --catalog-file catalog.json \
//!   --start "2025-03-01 12:00" --end "2025-05-01 12:00" --step-days 7
//! ```
//!
//! # Environment Variables
//!
//! - `OBSPLAN_START`, `OBSPLAN_END`, `OBSPLAN_STEP_DAYS`: campaign range
//! - `OBSPLAN_TARGETS_FILE`, `OBSPLAN_CATALOG_FILE`: inputs
//! - `OBSPLAN_OUTPUT_DIR`: root of the run directories (default: plots)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use obsplan::api::{
    plan_campaign, publish, FileReporter, LocalCatalog, PlannerConfig, RunContext,
    SiderustEphemeris,
};
use obsplan::parsing::load_target_list;

#[derive(Parser, Debug)]
#[command(
    name = "obsplan",
    version,
    about = "Nightly target visibility planner for a fixed observing site"
)]
struct Args {
    /// TOML configuration file (default: ./obsplan.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First night reference, "YYYY-MM-DD HH:MM" UTC
    #[arg(long)]
    start: Option<String>,

    /// Last night reference (inclusive), "YYYY-MM-DD HH:MM" UTC
    #[arg(long)]
    end: Option<String>,

    /// Days between nights (fractional values allowed)
    #[arg(long)]
    step_days: Option<f64>,

    /// Target list, one name per line
    #[arg(short, long)]
    targets_file: Option<PathBuf>,

    /// JSON catalog used to resolve target names
    #[arg(long)]
    catalog_file: Option<PathBuf>,

    /// Root directory for run output
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut PlannerConfig) {
        if let Some(start) = self.start {
            config.campaign.start = start;
        }
        if let Some(end) = self.end {
            config.campaign.end = end;
        }
        if let Some(step) = self.step_days {
            config.campaign.step_days = step;
        }
        if let Some(path) = self.targets_file {
            config.input.targets_file = path;
        }
        if let Some(path) = self.catalog_file {
            config.catalog.file = path;
        }
        if let Some(path) = self.output_dir {
            config.output.dir = path;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut config = match args.config.as_deref() {
        Some(path) => PlannerConfig::from_file(path)?,
        None => PlannerConfig::from_default_location()?,
    };
    config.apply_env_overrides()?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let plan = config.campaign_plan()?;
    let site = config.site()?;
    info!(
        "Planning {} .. {} every {} day(s) from {}",
        plan.start(),
        plan.end(),
        plan.step_days(),
        site.name()
    );

    let names = load_target_list(&config.input.targets_file)?;
    if names.is_empty() {
        warn!(
            "Target list {} is empty",
            config.input.targets_file.display()
        );
    }
    let catalog = LocalCatalog::load(&config.catalog.file)?;
    let ephemeris = SiderustEphemeris::new(site);

    let run = plan_campaign(
        &names,
        &catalog,
        &ephemeris,
        &plan,
        &config.thresholds(),
        &config.resolve_options(),
    )
    .await;

    let context = RunContext::create(&config.output.dir, chrono::Local::now().naive_local())?;
    let mut reporter = FileReporter::new(context);
    let published = publish(&run.outcome, &run.targets, &mut reporter)?;

    let skips = run.outcome.skip_summary();
    if skips.total() > 0 {
        warn!(
            "Skipped {} computation(s): {} unresolved target(s), {} failed night(s), {} failed target-night(s)",
            skips.total(),
            skips.unresolved_targets,
            skips.failed_nights,
            skips.failed_target_nights
        );
        for skipped in &run.outcome.skipped {
            warn!("  {}", skipped);
        }
    }

    info!(
        "Done: {} of {} nights computed, {} with visible targets, reports in {}",
        run.outcome.table.computed_nights(),
        run.outcome.table.len(),
        published.nights_reported,
        reporter.run().run_dir().display()
    );

    Ok(())
}
