//! Common test fixtures for layer tests.
//!
//! This module provides pre-defined data that represents the layers a
//! territorial monitoring deployment typically serves.

/// Sample GeoJSON geometries.
pub mod geometry {
    use serde_json::{json, Value};

    /// Point in Brasília (lon, lat)
    pub const POINT_TEXT: &str = r#"{"type":"Point","coordinates":[-47.8825,-15.7942]}"#;

    pub const LINESTRING_TEXT: &str =
        r#"{"type":"LineString","coordinates":[[-47.9,-15.8],[-47.8,-15.7],[-47.7,-15.75]]}"#;

    pub const POLYGON_TEXT: &str =
        r#"{"type":"Polygon","coordinates":[[[-48.0,-16.0],[-47.0,-16.0],[-47.0,-15.0],[-48.0,-15.0],[-48.0,-16.0]]]}"#;

    /// Not JSON at all
    pub const GARBAGE_TEXT: &str = "POINT(-47.88 -15.79)";

    pub fn point(lon: f64, lat: f64) -> Value {
        json!({"type": "Point", "coordinates": [lon, lat]})
    }

    /// Point carrying altitude and a bbox member
    pub fn point_3d() -> Value {
        json!({
            "type": "Point",
            "coordinates": [-47.8825, -15.7942, 1172.0],
            "bbox": [-47.8825, -15.7942, -47.8825, -15.7942]
        })
    }

    pub fn multi_polygon() -> Value {
        json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[-48.0, -16.0], [-47.5, -16.0], [-47.5, -15.5], [-48.0, -16.0]]],
                [[[-47.0, -15.0], [-46.5, -15.0], [-46.5, -14.5], [-47.0, -15.0]]]
            ]
        })
    }

    pub fn collection() -> Value {
        json!({
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Point", "coordinates": [-47.9, -15.8]},
                {"type": "LineString", "coordinates": [[-47.9, -15.8], [-47.8, -15.7]]}
            ]
        })
    }
}

/// Catalog definitions.
pub mod catalog {
    use layer_common::{LayerDefinition, VisualConfig};
    use serde_json::{json, Value};

    pub fn visual(value: Value) -> VisualConfig {
        serde_json::from_value(value).expect("fixture visual config")
    }

    /// Fire hotspots, a domain layer with a circle base style
    pub fn fire_hotspots() -> LayerDefinition {
        LayerDefinition::new(1, "focos_calor", "Focos de Calor", 50).with_visual_config(visual(
            json!({
                "baseStyle": {"color": "#ff4500", "markerType": "circle", "radius": 5},
                "mapDisplay": "date_filter"
            }),
        ))
    }

    /// Field actions, grouped by category with one icon rule
    pub fn field_actions() -> LayerDefinition {
        LayerDefinition::new(5, "acoes", "Ações de Campo", 40).with_visual_config(visual(json!({
            "baseStyle": {"markerType": "icon", "iconName": "map-pin", "color": "#1e40af"},
            "rules": [
                {"field": "categoria", "values": {"Fiscalização": {"iconName": "shield"}}}
            ]
        })))
    }

    /// Generic layer showing only its newest observation
    pub fn latest_station() -> LayerDefinition {
        LayerDefinition::new(10, "estacao_nivel", "Estação de Nível", 10)
            .with_visual_config(visual(json!({"mapDisplay": "latest", "dateFilter": true})))
    }

    /// Generic layer filtered by the caller's date range
    pub fn dated_incidents() -> LayerDefinition {
        LayerDefinition::new(11, "ocorrencias", "Ocorrências", 20).with_visual_config(visual(
            json!({
                "dateFilter": true,
                "groupByColumn": "tipo",
                "rules": [
                    {"field": "tipo", "values": {"Invasão": {"color": "#dc2626"}}}
                ]
            }),
        ))
    }

    /// Generic reference layer that ignores date ranges
    pub fn reference_zones() -> LayerDefinition {
        LayerDefinition::new(12, "zoneamento", "Zoneamento", 5).with_visual_config(visual(json!({
            "baseStyle": {"color": "#16a34a", "fillOpacity": 0.1},
            "rules": [
                {
                    "field": "zona",
                    "styleProperty": "fillColor",
                    "values": {"ZPA": "#166534", "ZUE": "#facc15"}
                }
            ],
            "legendTitle": "Zonas"
        })))
    }

    /// Generic layer with no visual config at all
    pub fn bare_layer() -> LayerDefinition {
        LayerDefinition::new(13, "sem_estilo", "Sem Estilo", 0)
    }
}

/// Request date parameters.
pub mod dates {
    pub const MARCH_START: &str = "2024-03-01";
    pub const MARCH_END: &str = "2024-03-31";

    /// Reference instant most generated rows are relative to
    pub const REFERENCE_TIME: &str = "2024-03-15T12:00:00Z";

    /// Not a date
    pub const INVALID: &str = "yesterday";
}
