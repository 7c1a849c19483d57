//! # obsplan
//!
//! Nightly target visibility planning for a fixed observing site.
//!
//! For a list of named targets and a range of dates, the planner finds each
//! night's sunset and sunrise, samples the Sun, the Moon and every target
//! over a 15 hour window centred on the night, and reports for how long each
//! target is high enough while the sky is astronomically dark.
//!
//! ## Architecture
//!
//! Data flows one way, from the leaves to the reports:
//!
//! - [`ephemeris`]: Sun, Moon and target positions (`siderust`)
//! - [`catalog`]: target name resolution (async, with timeouts)
//! - [`services`]: visibility engine, night aggregator, campaign aggregator
//! - [`reporting`]: presentation requests and the file reporter
//! - [`config`]: TOML configuration with environment overrides
//! - [`parsing`]: target list input
//! - [`models`]: shared domain types
//! - [`api`]: consolidated public surface
//!
//! ## Example
//!
//! ```no_run
//! use obsplan::api::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = PlannerConfig::default();
//! let catalog = LocalCatalog::load(&config.catalog.file)?;
//! let ephemeris = SiderustEphemeris::new(config.site()?);
//! let names = vec!["M 31".to_string(), "M 42".to_string()];
//!
//! let run = plan_campaign(
//!     &names,
//!     &catalog,
//!     &ephemeris,
//!     &config.campaign_plan()?,
//!     &config.thresholds(),
//!     &config.resolve_options(),
//! )
//! .await;
//! println!("{} nights computed", run.outcome.table.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod ephemeris;
pub mod models;
pub mod parsing;
pub mod reporting;
pub mod services;
