//! In-memory backends.
//!
//! Used as test doubles and for running the service from fixture files
//! without a database. Semantics mirror the PostgreSQL backends: catalog
//! listing order, generic row windows and row shape.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use layer_common::{DateRange, GeoRow, LayerDefinition, LayerId, LayerResult};

use crate::catalog::CatalogStore;
use crate::features::{generic_row, FeatureStore, RowWindow};
use crate::strategy::DomainStrategy;

/// Catalog held in memory.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    entries: Arc<RwLock<Vec<LayerDefinition>>>,
}

impl MemoryCatalog {
    pub fn new(entries: Vec<LayerDefinition>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Add a definition, replacing any entry with the same slug.
    pub async fn insert(&self, definition: LayerDefinition) {
        let mut entries = self.entries.write().await;
        entries.retain(|e| e.slug != definition.slug);
        entries.push(definition);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn get_entry(&self, slug: &str) -> LayerResult<Option<LayerDefinition>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.slug == slug).cloned())
    }

    async fn list_entries(&self) -> LayerResult<Vec<LayerDefinition>> {
        let mut entries = self.entries.read().await.clone();
        entries.sort_by(|a, b| b.ordering.cmp(&a.ordering).then(a.id.0.cmp(&b.id.0)));
        Ok(entries)
    }
}

/// One feature of the generic store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericFeature {
    pub id: i64,
    pub layer_id: LayerId,
    /// GeoJSON geometry, as text or as an object
    pub geometry: Value,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
}

impl GenericFeature {
    fn to_row(&self) -> GeoRow {
        generic_row(
            self.id,
            self.layer_id,
            self.geometry.clone(),
            self.properties.clone(),
            self.observed_at,
        )
    }
}

/// Generic feature store held in memory.
#[derive(Clone, Default)]
pub struct MemoryFeatureStore {
    features: Arc<RwLock<Vec<GenericFeature>>>,
}

impl MemoryFeatureStore {
    pub fn new(features: Vec<GenericFeature>) -> Self {
        Self {
            features: Arc::new(RwLock::new(features)),
        }
    }
}

#[async_trait]
impl FeatureStore for MemoryFeatureStore {
    async fn fetch_rows(&self, layer_id: LayerId, window: RowWindow) -> LayerResult<Vec<GeoRow>> {
        let features = self.features.read().await;
        let mut selected: Vec<&GenericFeature> =
            features.iter().filter(|f| f.layer_id == layer_id).collect();

        match window {
            RowWindow::Latest => {
                // Newest observation first, undated rows last, then highest id
                selected.sort_by(|a, b| {
                    b.observed_at
                        .is_some()
                        .cmp(&a.observed_at.is_some())
                        .then(b.observed_at.cmp(&a.observed_at))
                        .then(b.id.cmp(&a.id))
                });
                selected.truncate(1);
            }
            RowWindow::Between(range) => {
                selected.retain(|f| in_window(f.observed_at, &range));
                selected.sort_by(|a, b| a.observed_at.cmp(&b.observed_at).then(a.id.cmp(&b.id)));
            }
            RowWindow::All => {
                selected.sort_by_key(|f| f.id);
            }
        }

        Ok(selected.into_iter().map(GenericFeature::to_row).collect())
    }

    async fn distinct_property_values(
        &self,
        layer_id: LayerId,
        key: &str,
    ) -> LayerResult<Vec<String>> {
        let features = self.features.read().await;
        let values: BTreeSet<String> = features
            .iter()
            .filter(|f| f.layer_id == layer_id)
            .filter_map(|f| f.properties.get(key).and_then(value_text))
            .collect();
        Ok(values.into_iter().collect())
    }
}

/// Undated rows only survive an unbounded window.
fn in_window(observed_at: Option<DateTime<Utc>>, range: &DateRange) -> bool {
    match observed_at {
        Some(t) => range.contains(t),
        None => range.is_unbounded(),
    }
}

/// Text form of a property value, as `properties->>key` would render it.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A domain strategy over a fixed set of rows.
///
/// With a timestamp field set, rows are filtered by the caller's range on
/// that field (rows missing it are kept only for an unbounded range).
#[derive(Debug, Clone, Default)]
pub struct StaticStrategy {
    rows: Vec<GeoRow>,
    timestamp_field: Option<String>,
}

impl StaticStrategy {
    pub fn new(rows: Vec<GeoRow>) -> Self {
        Self {
            rows,
            timestamp_field: None,
        }
    }

    pub fn with_timestamp_field(mut self, field: impl Into<String>) -> Self {
        self.timestamp_field = Some(field.into());
        self
    }
}

#[async_trait]
impl DomainStrategy for StaticStrategy {
    async fn fetch(&self, range: &DateRange) -> LayerResult<Vec<GeoRow>> {
        let Some(field) = &self.timestamp_field else {
            return Ok(self.rows.clone());
        };

        Ok(self
            .rows
            .iter()
            .filter(|row| {
                let observed = row
                    .get(field)
                    .and_then(Value::as_str)
                    .and_then(layer_common::time::parse_instant);
                in_window(observed, range)
            })
            .cloned()
            .collect())
    }

    async fn distinct_values(&self, column: &str) -> LayerResult<Vec<String>> {
        let values: BTreeSet<String> = self
            .rows
            .iter()
            .filter_map(|row| row.get(column).and_then(value_text))
            .collect();
        Ok(values.into_iter().collect())
    }
}
