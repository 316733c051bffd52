//! Row generators for creating synthetic layer data.
//!
//! Generated rows are deterministic: ids count up from 1 and coordinates
//! and timestamps step by a fixed amount, so tests can assert exact values.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Map, Value};

use layer_common::GeoRow;

/// Builds a row the way a domain query returns it: properties at top level,
/// geometry as GeoJSON text under `geojson`.
///
/// # Example
///
/// ```
/// use test_utils::point_row;
/// use serde_json::json;
///
/// let row = point_row(7, -47.9, -15.8, json!({"categoria": "Vistoria"}));
/// assert_eq!(row["id"], 7);
/// assert!(row["geojson"].is_string());
/// ```
pub fn point_row(id: i64, lon: f64, lat: f64, properties: Value) -> GeoRow {
    let geometry = json!({"type": "Point", "coordinates": [lon, lat]});
    row_with_geometry(id, "geojson", Value::String(geometry.to_string()), properties)
}

/// Builds a row carrying `geometry` under an arbitrary field name.
pub fn row_with_geometry(id: i64, field: &str, geometry: Value, properties: Value) -> GeoRow {
    let mut row = Map::new();
    row.insert("id".to_string(), json!(id));
    if let Value::Object(props) = properties {
        row.extend(props);
    }
    row.insert(field.to_string(), geometry);
    row
}

/// Start of the generated timelines.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A generated feature of the generic store.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedPoint {
    pub id: i64,
    pub geometry: Value,
    pub properties: Map<String, Value>,
    pub observed_at: DateTime<Utc>,
}

/// `count` points observed `step_hours` apart starting at [`reference_time`],
/// moving east along a parallel. Each carries a `seq` property.
pub fn timed_points(count: usize, step_hours: i64) -> Vec<TimedPoint> {
    let start = reference_time();
    (0..count)
        .map(|i| {
            let mut properties = Map::new();
            properties.insert("seq".to_string(), json!(i));
            TimedPoint {
                id: i as i64 + 1,
                geometry: json!({"type": "Point", "coordinates": [-48.0 + i as f64 * 0.01, -15.8]}),
                properties,
                observed_at: start + Duration::hours(step_hours * i as i64),
            }
        })
        .collect()
}

/// Fire hotspot rows one day apart starting at [`reference_time`], with
/// `data_hora` in RFC 3339.
pub fn hotspot_rows(count: usize) -> Vec<GeoRow> {
    let start = reference_time();
    let satellites = ["AQUA_M-T", "NOAA-20", "GOES-16"];
    (0..count)
        .map(|i| {
            let at = start + Duration::days(i as i64);
            point_row(
                i as i64 + 1,
                -47.0 - i as f64 * 0.05,
                -12.0,
                json!({
                    "data_hora": at.to_rfc3339_opts(SecondsFormat::Secs, true),
                    "satelite": satellites[i % satellites.len()],
                    "frp": 10.0 + i as f64,
                }),
            )
        })
        .collect()
}

/// Field action rows, one per category given.
pub fn action_rows(categories: &[&str]) -> Vec<GeoRow> {
    categories
        .iter()
        .enumerate()
        .map(|(i, categoria)| {
            point_row(
                i as i64 + 1,
                -47.5,
                -15.5 + i as f64 * 0.01,
                json!({"titulo": format!("Ação {}", i + 1), "categoria": categoria}),
            )
        })
        .collect()
}
