//! Data access strategy resolution.
//!
//! Layers whose data lives in bespoke domain tables are served by a
//! registered [`DomainStrategy`]. Every other layer goes through the
//! [`GenericProvider`], which reads the shared feature store scoped by the
//! layer's catalog id and applies the layer's temporal display policy.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use layer_common::{
    DateRange, GeoRow, LayerDefinition, LayerError, LayerResult, MapDisplay, VisualConfig,
};

use crate::features::{FeatureStore, RowWindow};

/// Retrieval for one specially-modeled layer.
#[async_trait]
pub trait DomainStrategy: Send + Sync {
    /// Rows for the layer, already in draw order.
    async fn fetch(&self, range: &DateRange) -> LayerResult<Vec<GeoRow>>;

    /// Distinct values of a column of the domain table.
    async fn distinct_values(&self, column: &str) -> LayerResult<Vec<String>>;
}

/// Slug to strategy map, built once at startup.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn DomainStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the strategy for a slug.
    pub fn register(&mut self, slug: impl Into<String>, strategy: Arc<dyn DomainStrategy>) {
        self.strategies.insert(slug.into(), strategy);
    }

    pub fn with(mut self, slug: impl Into<String>, strategy: Arc<dyn DomainStrategy>) -> Self {
        self.register(slug, strategy);
        self
    }

    pub fn get(&self, slug: &str) -> Option<&Arc<dyn DomainStrategy>> {
        self.strategies.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.strategies.contains_key(slug)
    }

    /// Registered slugs, sorted.
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }
}

/// Fallback retrieval from the shared generic store.
#[derive(Clone)]
pub struct GenericProvider {
    store: Arc<dyn FeatureStore>,
}

impl GenericProvider {
    pub fn new(store: Arc<dyn FeatureStore>) -> Self {
        Self { store }
    }

    /// Decide which rows a layer shows for a requested range.
    ///
    /// `latest` wins over everything. With date filtering enabled the range
    /// is applied even when both bounds are open. Otherwise the range is
    /// ignored: reference layers must not disappear because the caller is
    /// browsing a date window.
    pub fn window_for(visual: &VisualConfig, range: &DateRange) -> RowWindow {
        if visual.display_mode() == MapDisplay::Latest {
            RowWindow::Latest
        } else if visual.date_filter_enabled() {
            RowWindow::Between(*range)
        } else {
            RowWindow::All
        }
    }

    pub async fn fetch(
        &self,
        definition: &LayerDefinition,
        range: &DateRange,
    ) -> LayerResult<Vec<GeoRow>> {
        let window = Self::window_for(&definition.visual_config, range);
        debug!(slug = %definition.slug, layer_id = %definition.id, ?window, "Generic fetch");
        self.store.fetch_rows(definition.id, window).await
    }

    pub async fn distinct_values(
        &self,
        definition: &LayerDefinition,
        column: &str,
    ) -> LayerResult<Vec<String>> {
        self.store
            .distinct_property_values(definition.id, column)
            .await
    }
}

/// Chooses between a registered domain strategy and the generic provider.
#[derive(Clone)]
pub struct StrategyResolver {
    registry: StrategyRegistry,
    generic: GenericProvider,
}

impl StrategyResolver {
    pub fn new(registry: StrategyRegistry, generic: GenericProvider) -> Self {
        Self { registry, generic }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Raw rows for a layer. Never `None`; an empty layer is an empty list.
    ///
    /// Domain strategies get the caller's range as given. Failures come back
    /// as `RetrievalFailed` naming the layer.
    pub async fn fetch_rows(
        &self,
        definition: &LayerDefinition,
        range: &DateRange,
    ) -> LayerResult<Vec<GeoRow>> {
        let result = match self.registry.get(&definition.slug) {
            Some(strategy) => strategy.fetch(range).await,
            None => self.generic.fetch(definition, range).await,
        };

        result.map_err(|e| match e {
            already @ LayerError::RetrievalFailed { .. } => already,
            other => LayerError::retrieval(&definition.slug, other.to_string()),
        })
    }

    /// Distinct values of a column for a layer, from its domain table or
    /// from the generic property bag.
    pub async fn distinct_values(
        &self,
        definition: &LayerDefinition,
        column: &str,
    ) -> LayerResult<Vec<String>> {
        match self.registry.get(&definition.slug) {
            Some(strategy) => strategy.distinct_values(column).await,
            None => self.generic.distinct_values(definition, column).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn visual(value: serde_json::Value) -> VisualConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_window_latest_beats_date_filter() {
        let v = visual(json!({"mapDisplay": "latest", "dateFilter": true}));
        assert_eq!(
            GenericProvider::window_for(&v, &DateRange::unbounded()),
            RowWindow::Latest
        );
    }

    #[test]
    fn test_window_date_filter_without_bounds() {
        let v = visual(json!({"dateFilter": true}));
        assert_eq!(
            GenericProvider::window_for(&v, &DateRange::unbounded()),
            RowWindow::Between(DateRange::unbounded())
        );
    }

    #[test]
    fn test_window_ignores_range_for_reference_layers() {
        let range = DateRange::from_params(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        assert_eq!(
            GenericProvider::window_for(&VisualConfig::default(), &range),
            RowWindow::All
        );
        let v = visual(json!({"mapDisplay": "date_filter", "dateFilter": false}));
        assert_eq!(GenericProvider::window_for(&v, &range), RowWindow::All);
    }

    #[test]
    fn test_registry_slugs_sorted() {
        let registry = StrategyRegistry::new();
        assert!(registry.slugs().is_empty());
        assert!(!registry.contains("focos_calor"));
    }
}
