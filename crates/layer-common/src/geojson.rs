//! GeoJSON types for layer responses.
//!
//! Layers are always served as a `FeatureCollection`. Geometries are kept as
//! the JSON object they arrived as (after validation), so coordinates of any
//! dimension, `bbox` members and foreign members survive untouched.
//!
//! See: <https://datatracker.ietf.org/doc/html/rfc7946>

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LayerError;

/// A raw row produced by a retrieval strategy: column name to value.
///
/// One column carries the geometry (as GeoJSON text or an already-parsed
/// object); every other column ends up in the feature's properties.
pub type GeoRow = Map<String, Value>;

/// The GeoJSON geometry types recognised by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(Self::Point),
            "MultiPoint" => Some(Self::MultiPoint),
            "LineString" => Some(Self::LineString),
            "MultiLineString" => Some(Self::MultiLineString),
            "Polygon" => Some(Self::Polygon),
            "MultiPolygon" => Some(Self::MultiPolygon),
            "GeometryCollection" => Some(Self::GeometryCollection),
            _ => None,
        }
    }
}

/// A validated GeoJSON geometry object.
///
/// Valid means: a string `type` member plus either a non-null `coordinates`
/// member or, for collections, a `geometries` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Geometry(Map<String, Value>);

impl Geometry {
    /// Validate a JSON value as a geometry, returning `None` when it is not one.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Self::try_from(map).ok(),
            _ => None,
        }
    }

    /// Parse GeoJSON geometry text.
    pub fn parse(text: &str) -> Result<Self, LayerError> {
        let value: Value = serde_json::from_str(text.trim())
            .map_err(|e| LayerError::GeometryParse(e.to_string()))?;
        match value {
            Value::Object(map) => Self::try_from(map),
            other => Err(LayerError::GeometryParse(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Create a point geometry.
    pub fn point(lon: f64, lat: f64) -> Self {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::from("Point"));
        map.insert("coordinates".to_string(), Value::from(vec![lon, lat]));
        Self(map)
    }

    /// The GeoJSON `type` member.
    pub fn type_name(&self) -> &str {
        self.0.get("type").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn kind(&self) -> Option<GeometryKind> {
        GeometryKind::from_type_name(self.type_name())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Map<String, Value>> for Geometry {
    type Error = LayerError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        if !matches!(map.get("type"), Some(Value::String(_))) {
            return Err(LayerError::GeometryParse(
                "geometry has no string 'type' member".to_string(),
            ));
        }

        let has_coordinates = map.get("coordinates").is_some_and(|c| !c.is_null());
        let has_geometries = matches!(map.get("geometries"), Some(Value::Array(_)));

        if !has_coordinates && !has_geometries {
            return Err(LayerError::GeometryParse(
                "geometry has neither 'coordinates' nor 'geometries'".to_string(),
            ));
        }

        Ok(Self(map))
    }
}

impl From<Geometry> for Map<String, Value> {
    fn from(geometry: Geometry) -> Self {
        geometry.0
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoFeature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    /// Optional feature identifier, mirrored from the row's `id` column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    pub geometry: Geometry,

    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl GeoFeature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            type_: "Feature".to_string(),
            id: None,
            geometry,
            properties: Map::new(),
        }
    }

    /// Set the feature ID.
    pub fn with_id(mut self, id: Value) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the properties.
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }
}

/// A GeoJSON FeatureCollection. Feature order is draw order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<GeoFeature>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    /// Add multiple features to the collection.
    pub fn with_features(mut self, features: Vec<GeoFeature>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_point_text() {
        let geom = Geometry::parse(r#"{"type":"Point","coordinates":[-47.9,-15.8]}"#).unwrap();
        assert_eq!(geom.kind(), Some(GeometryKind::Point));
    }

    #[test]
    fn test_collection_requires_geometries_array() {
        let ok = json!({"type": "GeometryCollection", "geometries": []});
        assert!(Geometry::from_value(ok).is_some());

        let bad = json!({"type": "GeometryCollection", "geometries": "nope"});
        assert!(Geometry::from_value(bad).is_none());
    }

    #[test]
    fn test_missing_type_is_rejected() {
        assert!(Geometry::from_value(json!({"coordinates": [1.0, 2.0]})).is_none());
        assert!(Geometry::from_value(json!({"type": "Point", "coordinates": null})).is_none());
    }

    #[test]
    fn test_parse_non_object_text() {
        let err = Geometry::parse("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_feature_collection_serialization() {
        let fc = FeatureCollection::new().with_features(vec![GeoFeature::new(Geometry::point(
            1.0, 2.0,
        ))
        .with_id(json!(7))]);

        let value = serde_json::to_value(&fc).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["id"], 7);
        assert_eq!(value["features"][0]["geometry"]["coordinates"], json!([1.0, 2.0]));
    }

    #[test]
    fn test_geometry_deserialize_validates() {
        let result: Result<Geometry, _> = serde_json::from_value(json!({"type": "Point"}));
        assert!(result.is_err());
    }
}
