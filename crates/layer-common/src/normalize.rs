//! Row to FeatureCollection normalization.
//!
//! Retrieval strategies return rows of whatever shape their table has. This
//! module finds the geometry column, validates it, and moves every other
//! column into the feature properties. Rows without a usable geometry are
//! dropped; a bad row never fails the batch.

use serde_json::Value;
use tracing::debug;

use crate::geojson::{FeatureCollection, GeoFeature, GeoRow, Geometry};

/// Geometry-bearing column names, in lookup priority order.
pub const GEOMETRY_FIELDS: [&str; 3] = ["geojson", "geom_geojson", "geometry"];

/// Convert rows into a FeatureCollection, preserving row order.
pub fn normalize_rows(rows: Vec<GeoRow>) -> FeatureCollection {
    let (collection, dropped) = normalize_rows_counted(rows);
    if dropped > 0 {
        debug!(
            dropped = dropped,
            kept = collection.len(),
            "Dropped rows without a valid geometry"
        );
    }
    collection
}

/// Like [`normalize_rows`], also reporting how many rows were dropped.
pub fn normalize_rows_counted(rows: Vec<GeoRow>) -> (FeatureCollection, usize) {
    let mut features = Vec::with_capacity(rows.len());
    let mut dropped = 0;

    for row in rows {
        match row_to_feature(row) {
            Some(feature) => features.push(feature),
            None => dropped += 1,
        }
    }

    (FeatureCollection::new().with_features(features), dropped)
}

/// Convert a single row. Returns `None` when the row has no valid geometry.
pub fn row_to_feature(mut row: GeoRow) -> Option<GeoFeature> {
    let raw = GEOMETRY_FIELDS
        .iter()
        .find_map(|field| row.get(*field).filter(|v| !v.is_null()).cloned())?;

    let geometry = match raw {
        Value::String(text) => Geometry::parse(&text).ok()?,
        structured @ Value::Object(_) => Geometry::from_value(structured)?,
        _ => return None,
    };

    for field in GEOMETRY_FIELDS {
        row.remove(field);
    }

    let id = row.get("id").filter(|v| !v.is_null()).cloned();
    let mut feature = GeoFeature::new(geometry).with_properties(row);
    feature.id = id;
    Some(feature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> GeoRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("row fixture must be an object"),
        }
    }

    #[test]
    fn test_priority_order() {
        let r = row(json!({
            "id": 1,
            "geometry": {"type": "Point", "coordinates": [9.0, 9.0]},
            "geojson": "{\"type\":\"Point\",\"coordinates\":[1.0,2.0]}"
        }));
        let feature = row_to_feature(r).unwrap();
        assert_eq!(feature.geometry.as_map()["coordinates"], json!([1.0, 2.0]));
        assert!(!feature.properties.contains_key("geometry"));
        assert!(!feature.properties.contains_key("geojson"));
    }

    #[test]
    fn test_null_primary_falls_through() {
        let r = row(json!({
            "geojson": null,
            "geom_geojson": "{\"type\":\"LineString\",\"coordinates\":[[0,0],[1,1]]}"
        }));
        let feature = row_to_feature(r).unwrap();
        assert_eq!(feature.geometry.type_name(), "LineString");
    }

    #[test]
    fn test_id_copied_to_feature_and_properties() {
        let r = row(json!({"id": "abc", "geojson": {"type": "Point", "coordinates": [0, 0]}}));
        let feature = row_to_feature(r).unwrap();
        assert_eq!(feature.id, Some(json!("abc")));
        assert_eq!(feature.properties["id"], json!("abc"));
    }

    #[test]
    fn test_bad_rows_dropped() {
        let rows = vec![
            row(json!({"id": 1, "nome": "sem geometria"})),
            row(json!({"id": 2, "geojson": "not json"})),
            row(json!({"id": 3, "geojson": 42})),
            row(json!({"id": 4, "geojson": {"type": "Point", "coordinates": [0, 0]}})),
        ];
        let (fc, dropped) = normalize_rows_counted(rows);
        assert_eq!(dropped, 3);
        assert_eq!(fc.len(), 1);
        assert_eq!(fc.features[0].id, Some(json!(4)));
    }
}
