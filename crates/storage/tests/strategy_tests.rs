//! Tests for strategy resolution and the generic provider's windows.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use layer_common::{normalize_rows, DateRange, GeoRow, LayerError, LayerId, LayerResult};
use storage::{
    DomainStrategy, GenericFeature, GenericProvider, MemoryFeatureStore, StaticStrategy,
    StrategyRegistry, StrategyResolver,
};
use test_utils::{assert_feature_ids, catalog, hotspot_rows, timed_points};

/// Domain strategy whose backend is down.
struct FailingStrategy;

#[async_trait]
impl DomainStrategy for FailingStrategy {
    async fn fetch(&self, _range: &DateRange) -> LayerResult<Vec<GeoRow>> {
        Err(LayerError::DatabaseError("connection refused".to_string()))
    }

    async fn distinct_values(&self, _column: &str) -> LayerResult<Vec<String>> {
        Err(LayerError::DatabaseError("connection refused".to_string()))
    }
}

fn generic_features(layer: LayerId, count: usize) -> Vec<GenericFeature> {
    timed_points(count, 24)
        .into_iter()
        .map(|p| GenericFeature {
            id: p.id,
            layer_id: layer,
            geometry: p.geometry,
            properties: p.properties,
            observed_at: Some(p.observed_at),
        })
        .collect()
}

fn resolver(registry: StrategyRegistry, features: Vec<GenericFeature>) -> StrategyResolver {
    let store = Arc::new(MemoryFeatureStore::new(features));
    StrategyResolver::new(registry, GenericProvider::new(store))
}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_registered_slug_uses_domain_strategy() {
    let registry = StrategyRegistry::new().with(
        "focos_calor",
        Arc::new(StaticStrategy::new(hotspot_rows(3))),
    );
    let resolver = resolver(registry, Vec::new());

    let rows = resolver
        .fetch_rows(&catalog::fire_hotspots(), &DateRange::unbounded())
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["satelite"], "AQUA_M-T");
}

#[tokio::test]
async fn test_unregistered_slug_uses_generic_store() {
    let layer = catalog::reference_zones();
    let resolver = resolver(StrategyRegistry::new(), generic_features(layer.id, 2));

    let rows = resolver
        .fetch_rows(&layer, &DateRange::unbounded())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["layer_id"], layer.id.0);
    assert!(rows[0]["geojson"].is_object());
}

#[tokio::test]
async fn test_generic_rows_scoped_by_layer_id() {
    let layer = catalog::reference_zones();
    let mut features = generic_features(layer.id, 2);
    features.extend(generic_features(LayerId(999), 4));
    let resolver = resolver(StrategyRegistry::new(), features);

    let rows = resolver
        .fetch_rows(&layer, &DateRange::unbounded())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_empty_layer_is_empty_list() {
    let resolver = resolver(StrategyRegistry::new(), Vec::new());
    let rows = resolver
        .fetch_rows(&catalog::bare_layer(), &DateRange::unbounded())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_domain_failure_names_the_layer() {
    let registry = StrategyRegistry::new().with("focos_calor", Arc::new(FailingStrategy));
    let resolver = resolver(registry, Vec::new());

    let err = resolver
        .fetch_rows(&catalog::fire_hotspots(), &DateRange::unbounded())
        .await
        .unwrap_err();
    match err {
        LayerError::RetrievalFailed { slug, message } => {
            assert_eq!(slug, "focos_calor");
            assert!(message.contains("connection refused"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

// ============================================================================
// Temporal windows
// ============================================================================

#[tokio::test]
async fn test_latest_mode_returns_newest_row_only() {
    let layer = catalog::latest_station();
    let resolver = resolver(StrategyRegistry::new(), generic_features(layer.id, 3));

    // The range is ignored in latest mode
    let range = DateRange::from_params(Some("2000-01-01"), Some("2000-01-02")).unwrap();
    let rows = resolver.fetch_rows(&layer, &range).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 3);
}

#[tokio::test]
async fn test_date_filter_applies_range() {
    let layer = catalog::dated_incidents();
    let resolver = resolver(StrategyRegistry::new(), generic_features(layer.id, 5));

    // Points are one day apart from 2024-03-15T12:00Z
    let range = DateRange::from_params(Some("2024-03-16"), Some("2024-03-17")).unwrap();
    let rows = resolver.fetch_rows(&layer, &range).await.unwrap();
    assert_feature_ids!(normalize_rows(rows), [2, 3]);
}

#[tokio::test]
async fn test_date_filter_unset_ignores_range() {
    let layer = catalog::reference_zones();
    let resolver = resolver(StrategyRegistry::new(), generic_features(layer.id, 5));

    let range = DateRange::from_params(Some("2030-01-01"), None).unwrap();
    let rows = resolver.fetch_rows(&layer, &range).await.unwrap();
    assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn test_domain_strategy_receives_caller_range() {
    let registry = StrategyRegistry::new().with(
        "focos_calor",
        Arc::new(StaticStrategy::new(hotspot_rows(4)).with_timestamp_field("data_hora")),
    );
    let resolver = resolver(registry, Vec::new());

    let range = DateRange::from_params(Some("2024-03-17"), None).unwrap();
    let rows = resolver
        .fetch_rows(&catalog::fire_hotspots(), &range)
        .await
        .unwrap();
    assert_feature_ids!(normalize_rows(rows), [3, 4]);
}

// ============================================================================
// Distinct values
// ============================================================================

#[tokio::test]
async fn test_distinct_values_from_property_bag() {
    let layer = catalog::dated_incidents();
    let features = vec![
        GenericFeature {
            id: 1,
            layer_id: layer.id,
            geometry: json!({"type": "Point", "coordinates": [0.0, 0.0]}),
            properties: json!({"tipo": "Invasão"}).as_object().cloned().unwrap(),
            observed_at: None,
        },
        GenericFeature {
            id: 2,
            layer_id: layer.id,
            geometry: json!({"type": "Point", "coordinates": [1.0, 1.0]}),
            properties: json!({"tipo": "Garimpo"}).as_object().cloned().unwrap(),
            observed_at: None,
        },
    ];
    let resolver = resolver(StrategyRegistry::new(), features);

    let values = resolver.distinct_values(&layer, "tipo").await.unwrap();
    assert_eq!(values, vec!["Garimpo", "Invasão"]);
}
