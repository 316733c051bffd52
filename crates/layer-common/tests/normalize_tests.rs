//! Tests for row normalization into FeatureCollections.

use layer_common::{normalize_rows, normalize_rows_counted, GeoRow};
use serde_json::{json, Value};

fn row(value: Value) -> GeoRow {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

// ============================================================================
// Geometry preservation
// ============================================================================

#[test]
fn test_valid_geometries_preserved_unchanged() {
    let geometries = vec![
        json!({"type": "Point", "coordinates": [-47.93, -15.78]}),
        json!({"type": "LineString", "coordinates": [[-47.0, -15.0], [-46.5, -15.2]]}),
        json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}),
        json!({"type": "GeometryCollection", "geometries": [
            {"type": "Point", "coordinates": [1, 1]}
        ]}),
        json!({"type": "Point", "coordinates": [1.0, 2.0, 850.0], "bbox": [1, 2, 1, 2]}),
    ];

    let rows: Vec<GeoRow> = geometries
        .iter()
        .enumerate()
        .map(|(i, g)| row(json!({"id": i, "municipio": "Formosa", "geojson": g.to_string()})))
        .collect();

    let fc = normalize_rows(rows);
    assert_eq!(fc.len(), geometries.len());

    for (feature, expected) in fc.features.iter().zip(&geometries) {
        let actual = serde_json::to_value(&feature.geometry).unwrap();
        assert_eq!(&actual, expected);
        assert_eq!(feature.properties["municipio"], "Formosa");
        assert!(feature.properties.contains_key("id"));
    }
}

#[test]
fn test_structured_geometry_accepted() {
    let rows = vec![row(json!({
        "id": 10,
        "geometry": {"type": "MultiPolygon", "coordinates": [[[[0, 0], [1, 0], [1, 1], [0, 0]]]]},
        "area_ha": 12.5,
        "dados": {"bioma": "Cerrado"}
    }))];

    let fc = normalize_rows(rows);
    assert_eq!(fc.len(), 1);
    let feature = &fc.features[0];
    assert_eq!(feature.geometry.type_name(), "MultiPolygon");
    assert_eq!(feature.properties["area_ha"], 12.5);
    assert_eq!(feature.properties["dados"]["bioma"], "Cerrado");
}

// ============================================================================
// Malformed rows
// ============================================================================

#[test]
fn test_rows_without_geometry_field_excluded() {
    let rows = vec![
        row(json!({"id": 1, "nome": "A"})),
        row(json!({"id": 2, "geom": "0101000020E6100000"})),
        row(json!({})),
    ];
    let (fc, dropped) = normalize_rows_counted(rows);
    assert!(fc.is_empty());
    assert_eq!(dropped, 3);
}

#[test]
fn test_invalid_geometries_excluded() {
    let rows = vec![
        row(json!({"id": 1, "geojson": "{\"type\":\"Point\"}"})),
        row(json!({"id": 2, "geojson": "{\"coordinates\":[1,2]}"})),
        row(json!({"id": 3, "geojson": "{broken"})),
        row(json!({"id": 4, "geojson": "{\"type\":\"GeometryCollection\"}"})),
        row(json!({"id": 5, "geojson": "{\"type\":\"Point\",\"coordinates\":[5,5]}"})),
    ];
    let fc = normalize_rows(rows);
    assert_eq!(fc.len(), 1);
    assert_eq!(fc.features[0].properties["id"], 5);
}

// ============================================================================
// Ordering and determinism
// ============================================================================

#[test]
fn test_output_order_mirrors_input() {
    let rows: Vec<GeoRow> = (0..20)
        .map(|i| {
            let geojson = if i % 3 == 0 {
                Value::Null
            } else {
                Value::String(format!(r#"{{"type":"Point","coordinates":[{},0]}}"#, i))
            };
            row(json!({"id": i, "geojson": geojson}))
        })
        .collect();

    let fc = normalize_rows(rows.clone());
    let ids: Vec<i64> = fc
        .features
        .iter()
        .map(|f| f.id.as_ref().and_then(Value::as_i64).unwrap())
        .collect();
    let expected: Vec<i64> = (0..20).filter(|i| i % 3 != 0).collect();
    assert_eq!(ids, expected);

    assert_eq!(normalize_rows(rows.clone()), normalize_rows(rows));
}
