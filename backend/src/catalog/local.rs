//! Catalog backed by a JSON file.
//!
//! ```json
//! {"targets": [{"name": "M 31", "ra_deg": 10.6847, "dec_deg": 41.2690, "v_mag": 3.44, "aliases": ["NGC 224"]}]}
//! ```
//!
//! Lookups ignore case and whitespace, so "m31" finds "M 31".

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{CatalogError, CatalogResolver, CatalogResult};
use crate::models::SkyCoordinates;

/// One catalog record as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub ra_deg: f64,
    pub dec_deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_mag: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    targets: Vec<CatalogEntry>,
}

#[derive(Debug, Clone)]
struct Record {
    name: String,
    coordinates: SkyCoordinates,
    v_mag: Option<f64>,
}

/// In-memory catalog with normalized-name lookup.
#[derive(Debug, Clone, Default)]
pub struct LocalCatalog {
    records: Vec<Record>,
    index: HashMap<String, Vec<usize>>,
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl LocalCatalog {
    /// Build a catalog from entries, validating coordinates.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut catalog = Self::default();
        for (i, entry) in entries.into_iter().enumerate() {
            let coordinates = SkyCoordinates::new(entry.ra_deg, entry.dec_deg)
                .with_context(|| format!("targets[{}] ({})", i, entry.name))?;
            let id = catalog.records.len();

            let mut keys: Vec<String> = std::iter::once(&entry.name)
                .chain(entry.aliases.iter())
                .map(|n| normalize(n))
                .filter(|k| !k.is_empty())
                .collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                catalog.index.entry(key).or_default().push(id);
            }

            catalog.records.push(Record {
                name: entry.name,
                coordinates,
                v_mag: entry.v_mag,
            });
        }
        Ok(catalog)
    }

    /// Parse the JSON catalog format; errors name the offending JSON path.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let deserializer = &mut serde_json::Deserializer::from_str(json);
        let file: CatalogFile = serde_path_to_error::deserialize(deserializer)
            .map_err(|e| anyhow!("Invalid catalog at '{}': {}", e.path(), e.inner()))?;
        Self::from_entries(file.targets)
    }

    /// Load a JSON catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let catalog = Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;
        debug!("Loaded {} catalog entries from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn lookup(&self, name: &str) -> CatalogResult<&Record> {
        match self.index.get(&normalize(name)).map(Vec::as_slice) {
            Some([id]) => Ok(&self.records[*id]),
            Some(ids) if !ids.is_empty() => Err(CatalogError::Ambiguous {
                name: name.to_string(),
                candidates: ids.iter().map(|&i| self.records[i].name.clone()).collect(),
            }),
            _ => Err(CatalogError::NotFound(name.to_string())),
        }
    }
}

#[async_trait]
impl CatalogResolver for LocalCatalog {
    async fn resolve(&self, name: &str) -> CatalogResult<SkyCoordinates> {
        self.lookup(name).map(|r| r.coordinates)
    }

    async fn apparent_magnitude(&self, name: &str) -> CatalogResult<Option<f64>> {
        self.lookup(name).map(|r| r.v_mag)
    }
}
