//! Service configuration loading and types.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Service configuration loaded from a YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwsConfig {
    /// Service metadata advertised in capabilities documents.
    #[serde(default)]
    pub service: ServiceInfo,

    /// OpenSearch paging settings.
    #[serde(default)]
    pub opensearch: OpenSearchSettings,

    /// Fault document flavours.
    #[serde(default)]
    pub exceptions: ExceptionSettings,

    /// Coverage collections served.
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
}

impl OwsConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing file yields the default (empty) configuration.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                "OWS config file {:?} does not exist, using defaults",
                path
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config: OwsConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!(
            collections = config.collections.len(),
            coverages = config.coverage_count(),
            "Loaded OWS config from {:?}",
            path
        );
        Ok(config)
    }

    pub fn coverage_count(&self) -> usize {
        self.collections.iter().map(|c| c.coverages.len()).sum()
    }
}

/// Service identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default, rename = "abstract")]
    pub abstract_: String,

    #[serde(default)]
    pub provider: String,
}

fn default_title() -> String {
    "OWS Gateway".to_string()
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            title: default_title(),
            abstract_: String::new(),
            provider: String::new(),
        }
    }
}

/// Page size limits for OpenSearch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSearchSettings {
    /// Page size when the request has no `count`.
    #[serde(default = "default_count")]
    pub default_count: usize,

    /// Upper bound on `count`.
    #[serde(default = "default_max_count")]
    pub max_count: usize,

    /// Format used when the request names none.
    #[serde(default = "default_format")]
    pub default_format: String,
}

fn default_count() -> usize {
    50
}

fn default_max_count() -> usize {
    500
}

fn default_format() -> String {
    "rss".to_string()
}

impl Default for OpenSearchSettings {
    fn default() -> Self {
        Self {
            default_count: default_count(),
            max_count: default_max_count(),
            default_format: default_format(),
        }
    }
}

/// Fault flavour selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExceptionSettings {
    /// Flavour used when neither the service nor the request picks one.
    #[serde(default)]
    pub default: ExceptionFlavour,

    /// Per-service overrides, keyed by service name.
    #[serde(default)]
    pub services: std::collections::BTreeMap<String, ExceptionFlavour>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionFlavour {
    #[default]
    Ows20,
    Ows11,
    Wms130,
    Json,
}

/// A named group of coverages searchable through OpenSearch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub coverages: Vec<CoverageConfig>,
}

/// One coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    pub id: String,

    /// WGS84 extent as [west, south, east, north].
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,

    /// Footprint ring as [lon, lat] positions; defaults to the bbox outline.
    #[serde(default)]
    pub footprint: Option<Vec<[f64; 2]>>,

    #[serde(default)]
    pub begin_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    /// Grid size as [columns, rows].
    #[serde(default)]
    pub size: Option<[u32; 2]>,

    /// Range (band) names.
    #[serde(default)]
    pub bands: Vec<String>,
}
