//! Target catalog lookups.
//!
//! A [`CatalogResolver`] maps a target name to sky coordinates and an
//! optional apparent V magnitude. [`resolve_targets`] runs the lookups for a
//! whole target list once per campaign, with a per-lookup timeout and a
//! bounded number of lookups in flight.

pub mod local;

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};

pub use local::{CatalogEntry, LocalCatalog};

use crate::models::{ResolvedTarget, SkippedComputation, SkyCoordinates};

pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 4;

/// Result type for catalog lookups
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error type for catalog lookups
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("target '{0}' not found in catalog")]
    NotFound(String),

    #[error("target '{name}' is ambiguous: matches {candidates:?}")]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    /// The catalog could not answer right now (I/O, service unavailable).
    #[error("catalog lookup for '{name}' failed: {message}")]
    Transient { name: String, message: String },

    #[error("catalog lookup for '{name}' timed out after {seconds:.1}s")]
    Timeout { name: String, seconds: f64 },
}

/// Name resolution service.
///
/// Implementations must be `Send + Sync` so lookups can run concurrently.
#[async_trait]
pub trait CatalogResolver: Send + Sync {
    /// J2000 coordinates of a named target.
    async fn resolve(&self, name: &str) -> CatalogResult<SkyCoordinates>;

    /// Apparent V magnitude, `Ok(None)` when the catalog has no photometry.
    async fn apparent_magnitude(&self, name: &str) -> CatalogResult<Option<f64>>;
}

/// Limits applied to a batch of lookups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveOptions {
    pub timeout: Duration,
    pub concurrency: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }
}

/// Outcome of resolving a target list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetResolution {
    /// Resolved targets, in input order
    pub resolved: Vec<ResolvedTarget>,
    /// Targets that could not be resolved, in input order
    pub skipped: Vec<SkippedComputation>,
}

impl TargetResolution {
    pub fn names(&self) -> Vec<&str> {
        self.resolved.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Resolve every name, keeping input order.
///
/// A failed or timed-out coordinate lookup leaves the target out and records
/// it as skipped. A failed magnitude lookup only drops the magnitude.
pub async fn resolve_targets<R: CatalogResolver + ?Sized>(
    resolver: &R,
    names: &[String],
    options: &ResolveOptions,
) -> TargetResolution {
    let concurrency = options.concurrency.max(1);
    let outcomes: Vec<(String, CatalogResult<ResolvedTarget>)> = stream::iter(names)
        .map(|name| async move {
            let outcome = resolve_one(resolver, name, options.timeout).await;
            (name.clone(), outcome)
        })
        .buffered(concurrency)
        .collect()
        .await;

    let mut resolution = TargetResolution::default();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(target) => resolution.resolved.push(target),
            Err(e) => {
                warn!("Skipping target {}: {}", name, e);
                resolution
                    .skipped
                    .push(SkippedComputation::unresolved_target(name, e));
            }
        }
    }

    info!(
        "Resolved {} of {} targets",
        resolution.resolved.len(),
        names.len()
    );
    resolution
}

async fn resolve_one<R: CatalogResolver + ?Sized>(
    resolver: &R,
    name: &str,
    timeout: Duration,
) -> CatalogResult<ResolvedTarget> {
    let coordinates = with_timeout(name, timeout, resolver.resolve(name)).await?;

    let magnitude = match with_timeout(name, timeout, resolver.apparent_magnitude(name)).await {
        Ok(magnitude) => magnitude,
        Err(e) => {
            debug!("No magnitude for {}: {}", name, e);
            None
        }
    };

    Ok(ResolvedTarget::new(name, coordinates, magnitude))
}

async fn with_timeout<T>(
    name: &str,
    timeout: Duration,
    lookup: impl std::future::Future<Output = CatalogResult<T>>,
) -> CatalogResult<T> {
    match tokio::time::timeout(timeout, lookup).await {
        Ok(result) => result,
        Err(_) => Err(CatalogError::Timeout {
            name: name.to_string(),
            seconds: timeout.as_secs_f64(),
        }),
    }
}
