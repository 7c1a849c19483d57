//! Planner configuration.
//!
//! Settings are read from a TOML file (every field optional, defaulting to
//! the Bayfordbury spring campaign), then overridden by `OBSPLAN_*`
//! environment variables, then by command-line flags in the binary.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::ResolveOptions;
use crate::models::{JulianDate, ObservingSite, VisibilityThresholds};
use crate::services::CampaignPlan;

pub const ENV_START: &str = "OBSPLAN_START";
pub const ENV_END: &str = "OBSPLAN_END";
pub const ENV_STEP_DAYS: &str = "OBSPLAN_STEP_DAYS";
pub const ENV_TARGETS_FILE: &str = "OBSPLAN_TARGETS_FILE";
pub const ENV_CATALOG_FILE: &str = "OBSPLAN_CATALOG_FILE";
pub const ENV_OUTPUT_DIR: &str = "OBSPLAN_OUTPUT_DIR";

const DEFAULT_CONFIG_FILE: &str = "obsplan.toml";

/// Error type for configuration loading and validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl ToString) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

/// Complete planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    #[serde(default)]
    pub campaign: CampaignSettings,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub visibility: VisibilitySettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Date range and cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignSettings {
    /// First night reference, `"YYYY-MM-DD HH:MM"` UTC
    #[serde(default = "default_start")]
    pub start: String,
    /// Last night reference (inclusive)
    #[serde(default = "default_end")]
    pub end: String,
    #[serde(default = "default_step_days")]
    pub step_days: f64,
}

/// Observing site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteSettings {
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude_deg: f64,
    #[serde(default = "default_longitude")]
    pub longitude_deg: f64,
    #[serde(default = "default_elevation")]
    pub elevation_m: f64,
}

/// Altitude limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisibilitySettings {
    #[serde(default = "default_min_target_altitude")]
    pub min_target_altitude_deg: f64,
    #[serde(default = "default_max_sun_altitude")]
    pub max_sun_altitude_deg: f64,
}

/// Target name resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_file")]
    pub file: PathBuf,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: f64,
    #[serde(default = "default_lookup_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSettings {
    #[serde(default = "default_targets_file")]
    pub targets_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    /// Root under which each run creates its own timestamped directory
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_start() -> String {
    "2025-03-01 12:00".to_string()
}

fn default_end() -> String {
    "2025-05-01 12:00".to_string()
}

fn default_step_days() -> f64 {
    7.0
}

fn default_site_name() -> String {
    "Bayfordbury".to_string()
}

fn default_latitude() -> f64 {
    51.775
}

fn default_longitude() -> f64 {
    -0.09
}

fn default_elevation() -> f64 {
    66.0
}

fn default_min_target_altitude() -> f64 {
    crate::models::DEFAULT_MIN_TARGET_ALTITUDE_DEG
}

fn default_max_sun_altitude() -> f64 {
    crate::models::DEFAULT_MAX_SUN_ALTITUDE_DEG
}

fn default_catalog_file() -> PathBuf {
    PathBuf::from("catalog.json")
}

fn default_lookup_timeout() -> f64 {
    crate::catalog::DEFAULT_LOOKUP_TIMEOUT_SECS as f64
}

fn default_lookup_concurrency() -> usize {
    crate::catalog::DEFAULT_LOOKUP_CONCURRENCY
}

fn default_targets_file() -> PathBuf {
    PathBuf::from("targets.txt")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("plots")
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            step_days: default_step_days(),
        }
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            latitude_deg: default_latitude(),
            longitude_deg: default_longitude(),
            elevation_m: default_elevation(),
        }
    }
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            min_target_altitude_deg: default_min_target_altitude(),
            max_sun_altitude_deg: default_max_sun_altitude(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            file: default_catalog_file(),
            timeout_secs: default_lookup_timeout(),
            concurrency: default_lookup_concurrency(),
        }
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            targets_file: default_targets_file(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl PlannerConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Load `obsplan.toml` from the current or `backend/` directory, or fall
    /// back to defaults when neither exists.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from(DEFAULT_CONFIG_FILE),
            PathBuf::from("backend").join(DEFAULT_CONFIG_FILE),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Apply `OBSPLAN_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(start) = lookup(ENV_START) {
            self.campaign.start = start;
        }
        if let Some(end) = lookup(ENV_END) {
            self.campaign.end = end;
        }
        if let Some(step) = lookup(ENV_STEP_DAYS) {
            self.campaign.step_days = step
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid(ENV_STEP_DAYS, format!("'{}' is not a number", step)))?;
        }
        if let Some(path) = lookup(ENV_TARGETS_FILE) {
            self.input.targets_file = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_CATALOG_FILE) {
            self.catalog.file = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_OUTPUT_DIR) {
            self.output.dir = PathBuf::from(path);
        }
        Ok(())
    }

    /// Check every value that could only fail later, deep inside a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.campaign_plan()?;
        self.site()?;
        if !(-90.0..=90.0).contains(&self.visibility.min_target_altitude_deg) {
            return Err(ConfigError::invalid(
                "visibility.min_target_altitude_deg",
                "must be between -90 and 90",
            ));
        }
        if !(-90.0..=90.0).contains(&self.visibility.max_sun_altitude_deg) {
            return Err(ConfigError::invalid(
                "visibility.max_sun_altitude_deg",
                "must be between -90 and 90",
            ));
        }
        if !(self.catalog.timeout_secs.is_finite() && self.catalog.timeout_secs > 0.0) {
            return Err(ConfigError::invalid("catalog.timeout_secs", "must be positive"));
        }
        if self.catalog.concurrency == 0 {
            return Err(ConfigError::invalid("catalog.concurrency", "must be at least 1"));
        }
        Ok(())
    }

    pub fn campaign_plan(&self) -> Result<CampaignPlan, ConfigError> {
        let start = JulianDate::parse_iso(&self.campaign.start)
            .map_err(|e| ConfigError::invalid("campaign.start", e))?;
        let end = JulianDate::parse_iso(&self.campaign.end)
            .map_err(|e| ConfigError::invalid("campaign.end", e))?;
        CampaignPlan::new(start, end, self.campaign.step_days)
            .map_err(|e| ConfigError::invalid("campaign", e))
    }

    pub fn site(&self) -> Result<ObservingSite, ConfigError> {
        ObservingSite::new(
            self.site.name.clone(),
            self.site.latitude_deg,
            self.site.longitude_deg,
            self.site.elevation_m,
        )
        .map_err(|e| ConfigError::invalid("site", e))
    }

    pub fn thresholds(&self) -> VisibilityThresholds {
        VisibilityThresholds::new(
            self.visibility.min_target_altitude_deg,
            self.visibility.max_sun_altitude_deg,
        )
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            timeout: Duration::from_secs_f64(self.catalog.timeout_secs),
            concurrency: self.catalog.concurrency,
        }
    }
}
