//! Computation layer.
//!
//! The visibility engine evaluates one target for one night, the night
//! aggregator runs it for every target, and the campaign aggregator repeats
//! the night aggregation across a date range. Nothing here writes files.

pub mod campaign;
pub mod night_aggregator;
pub mod visibility_engine;

pub use campaign::{
    run_campaign, run_configured_campaign, CampaignError, CampaignPlan, MAX_CAMPAIGN_NIGHTS,
};
pub use night_aggregator::{compute_night, night_window};
pub use visibility_engine::{evaluate, EngineInput};
