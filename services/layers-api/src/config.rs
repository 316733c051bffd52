//! Service configuration loaded from the config directory.
//!
//! Two optional YAML files live there:
//! - `service.yaml`: assembly tunables ([`ServiceConfig`])
//! - `fixtures.yaml`: catalog and features for running without a database
//!   ([`FixtureSet`])

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use layer_common::{GeoRow, LayerDefinition};
use storage::{
    GenericFeature, MemoryCatalog, MemoryFeatureStore, StaticStrategy, StrategyRegistry,
};

/// Name of the tunables file inside the config directory.
pub const SERVICE_FILE: &str = "service.yaml";

/// Name of the fixture file inside the config directory.
pub const FIXTURES_FILE: &str = "fixtures.yaml";

/// Assembly tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upper bound on layers assembled at once by the batch listing.
    pub max_concurrent_layers: usize,

    /// Circle marker radius used when a style sets none.
    pub point_radius: f64,

    /// Fill in icon/color for pre-configuration catalog rows.
    pub legacy_defaults: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_layers: 16,
            point_radius: 8.0,
            legacy_defaults: true,
        }
    }
}

impl ServiceConfig {
    /// Load `service.yaml` from a directory. A missing directory or file
    /// yields defaults.
    pub fn load_from_dir(dir: &str) -> Result<Self> {
        let path = Path::new(dir).join(SERVICE_FILE);

        if !path.exists() {
            tracing::warn!(
                "Service config {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let mut config: ServiceConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        if config.max_concurrent_layers == 0 {
            tracing::warn!("max_concurrent_layers must be positive, using 1");
            config.max_concurrent_layers = 1;
        }

        tracing::info!(
            max_concurrent_layers = config.max_concurrent_layers,
            point_radius = config.point_radius,
            legacy_defaults = config.legacy_defaults,
            "Loaded service config from {:?}",
            path
        );
        Ok(config)
    }
}

/// Rows served for one domain slug in fixture mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainFixture {
    /// Row field the caller's date range filters on
    #[serde(default)]
    pub timestamp_field: Option<String>,

    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

/// Catalog and feature data for running the service from memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureSet {
    #[serde(default)]
    pub layers: Vec<LayerDefinition>,

    /// Generic-store features, keyed to layers by `layer_id`
    #[serde(default)]
    pub features: Vec<GenericFeature>,

    /// Domain rows by slug
    #[serde(default)]
    pub domains: HashMap<String, DomainFixture>,
}

impl FixtureSet {
    /// Load `fixtures.yaml` from a directory. A missing file yields an
    /// empty set.
    pub fn load_from_dir(dir: &str) -> Result<Self> {
        let path = Path::new(dir).join(FIXTURES_FILE);

        if !path.exists() {
            tracing::warn!(
                "Fixture file {} does not exist, serving an empty catalog",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let fixtures: FixtureSet = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!(
            layers = fixtures.layers.len(),
            features = fixtures.features.len(),
            domains = fixtures.domains.len(),
            "Loaded fixtures from {:?}",
            path
        );
        Ok(fixtures)
    }

    /// Split into in-memory backends.
    pub fn into_backends(self) -> (MemoryCatalog, MemoryFeatureStore, StrategyRegistry) {
        let mut registry = StrategyRegistry::new();
        for (slug, domain) in self.domains {
            let rows: Vec<GeoRow> = domain.rows;
            let mut strategy = StaticStrategy::new(rows);
            if let Some(field) = domain.timestamp_field {
                strategy = strategy.with_timestamp_field(field);
            }
            registry.register(slug, Arc::new(strategy));
        }

        (
            MemoryCatalog::new(self.layers),
            MemoryFeatureStore::new(self.features),
            registry,
        )
    }
}
