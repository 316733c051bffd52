//! Layer catalog definitions and the per-layer response shape.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::geojson::FeatureCollection;

/// Opaque numeric handle of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub i64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted layer definition (one catalog row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDefinition {
    pub id: LayerId,

    /// Unique, URL-safe key of the layer
    pub slug: String,

    /// Human-readable name
    pub name: String,

    /// Presentation order
    pub ordering: i32,

    /// Description of expected property fields, passed through untouched
    #[serde(default)]
    pub schema_config: Value,

    #[serde(default)]
    pub visual_config: VisualConfig,
}

impl LayerDefinition {
    pub fn new(id: i64, slug: impl Into<String>, name: impl Into<String>, ordering: i32) -> Self {
        Self {
            id: LayerId(id),
            slug: slug.into(),
            name: name.into(),
            ordering,
            schema_config: Value::Null,
            visual_config: VisualConfig::default(),
        }
    }

    pub fn with_visual_config(mut self, visual_config: VisualConfig) -> Self {
        self.visual_config = visual_config;
        self
    }

    pub fn with_schema_config(mut self, schema_config: Value) -> Self {
        self.schema_config = schema_config;
        self
    }
}

/// Temporal display policy of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapDisplay {
    /// Only the most recently timestamped feature
    Latest,
    /// Features within the requested date range
    DateFilter,
    /// Everything, regardless of any requested range
    #[default]
    #[serde(other)]
    All,
}

/// Declarative styling configuration of a layer.
///
/// Every member is optional; keys this type does not model are kept in
/// `extra` and serialized back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_style: Option<StyleProps>,

    /// Ordered rule cascade; later rules overwrite earlier ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<StyleRule>,

    #[serde(
        default,
        deserialize_with = "lenient_map_display",
        skip_serializing_if = "Option::is_none"
    )]
    pub map_display: Option<MapDisplay>,

    #[serde(
        default,
        deserialize_with = "lenient_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_filter: Option<bool>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_by_column: Option<String>,

    /// Legacy marker descriptor predating `baseStyle.markerType`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_marker: Option<MapMarker>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VisualConfig {
    /// Build from a stored JSON document, falling back to defaults when the
    /// document is absent or does not have the expected shape.
    pub fn from_stored(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::default(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring malformed visual config");
                Self::default()
            }),
        }
    }

    pub fn display_mode(&self) -> MapDisplay {
        self.map_display.unwrap_or_default()
    }

    /// Whether caller-supplied date ranges apply to this layer.
    ///
    /// An explicit `dateFilter` wins; otherwise it follows `mapDisplay`.
    pub fn date_filter_enabled(&self) -> bool {
        self.date_filter
            .unwrap_or(self.display_mode() == MapDisplay::DateFilter)
    }
}

/// One entry of the rule cascade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    /// Feature property the rule reads
    pub field: String,

    /// Match key to override. With `style_property` set, values are scalars.
    #[serde(default)]
    pub values: Map<String, Value>,

    /// Restrict the override to this single style property
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub style_property: Option<String>,
}

/// A (partial) style object, used for `baseStyle` and rule overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProps {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,

    #[serde(

        default,

        deserialize_with = "lenient_string",

        skip_serializing_if = "Option::is_none"

    )]
    pub fill_color: Option<String>,

    #[serde(

        default,

        deserialize_with = "lenient_f64",

        skip_serializing_if = "Option::is_none"

    )]
    pub weight: Option<f64>,

    #[serde(

        default,

        deserialize_with = "lenient_f64",

        skip_serializing_if = "Option::is_none"

    )]
    pub opacity: Option<f64>,

    #[serde(

        default,

        deserialize_with = "lenient_f64",

        skip_serializing_if = "Option::is_none"

    )]
    pub fill_opacity: Option<f64>,

    #[serde(

        default,

        deserialize_with = "lenient_string",

        skip_serializing_if = "Option::is_none"

    )]
    pub dash_array: Option<String>,

    /// "icon", "circle", or anything else for the default marker
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub marker_type: Option<String>,

    #[serde(

        default,

        deserialize_with = "lenient_string",

        skip_serializing_if = "Option::is_none"

    )]
    pub icon_name: Option<String>,

    #[serde(

        default,

        deserialize_with = "lenient_f64",

        skip_serializing_if = "Option::is_none"

    )]
    pub radius: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StyleProps {
    /// Shallow merge: every property present in `other` replaces ours.
    pub fn merge(&mut self, other: &StyleProps) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }

        take(&mut self.color, &other.color);
        take(&mut self.fill_color, &other.fill_color);
        take(&mut self.weight, &other.weight);
        take(&mut self.opacity, &other.opacity);
        take(&mut self.fill_opacity, &other.fill_opacity);
        take(&mut self.dash_array, &other.dash_array);
        take(&mut self.marker_type, &other.marker_type);
        take(&mut self.icon_name, &other.icon_name);
        take(&mut self.radius, &other.radius);

        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Overwrite a single property by its camelCase name.
    ///
    /// `null` clears the property. A value of the wrong kind (say `"thick"`
    /// for `weight`) leaves the current value in place.
    pub fn set_property(&mut self, name: &str, value: &Value) {
        fn set<T>(slot: &mut Option<T>, value: &Value, coerce: fn(&Value) -> Option<T>) {
            if value.is_null() {
                *slot = None;
            } else if let Some(coerced) = coerce(value) {
                *slot = Some(coerced);
            }
        }

        match name {
            "color" => set(&mut self.color, value, value_as_string),
            "fillColor" => set(&mut self.fill_color, value, value_as_string),
            "weight" => set(&mut self.weight, value, value_as_f64),
            "opacity" => set(&mut self.opacity, value, value_as_f64),
            "fillOpacity" => set(&mut self.fill_opacity, value, value_as_f64),
            "dashArray" => set(&mut self.dash_array, value, value_as_string),
            "markerType" => set(&mut self.marker_type, value, value_as_string),
            "iconName" => set(&mut self.icon_name, value, value_as_string),
            "radius" => set(&mut self.radius, value, value_as_f64),
            other => {
                self.extra.insert(other.to_string(), value.clone());
            }
        }
    }
}

/// Legacy marker descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    #[serde(rename = "type", default = "default_marker_type")]
    pub kind: String,

    #[serde(

        default,

        deserialize_with = "lenient_string",

        skip_serializing_if = "Option::is_none"

    )]
    pub icon: Option<String>,

    #[serde(

        default,

        deserialize_with = "lenient_string",

        skip_serializing_if = "Option::is_none"

    )]
    pub color: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_marker_type() -> String {
    "point".to_string()
}

impl MapMarker {
    pub fn point() -> Self {
        Self {
            kind: default_marker_type(),
            icon: None,
            color: None,
            extra: Map::new(),
        }
    }
}

/// One distinct value of a layer's group-by column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGroup {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Fully assembled layer as served to the map client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerResponse {
    pub id: LayerId,
    pub slug: String,
    pub name: String,
    pub ordering: i32,
    pub visual_config: VisualConfig,
    pub schema_config: Value,
    pub data: FeatureCollection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<LayerGroup>>,
}

// ============================================================================
// Lenient field decoding
//
// Catalog rows are hand-edited through the admin UI; numbers arrive as
// strings and flags as "true". Values that cannot be interpreted decode as
// absent instead of failing the whole document.
// ============================================================================

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(value_as_string(&value))
}

fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(value_as_f64(&value))
}

fn lenient_bool<'de, D: Deserializer<'de>>(de: D) -> Result<Option<bool>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(match value {
        Value::Bool(b) => Some(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    })
}

fn lenient_map_display<'de, D: Deserializer<'de>>(de: D) -> Result<Option<MapDisplay>, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(serde_json::from_value(other).unwrap_or_default()),
    })
}
