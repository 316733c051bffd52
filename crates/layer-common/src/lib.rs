//! Common types and utilities shared across the territory layer services.

pub mod error;
pub mod geojson;
pub mod layer;
pub mod normalize;
pub mod time;

pub use error::{LayerError, LayerResult};
pub use geojson::{FeatureCollection, GeoFeature, GeoRow, Geometry, GeometryKind};
pub use layer::{
    LayerDefinition, LayerGroup, LayerId, LayerResponse, MapDisplay, MapMarker, StyleProps,
    StyleRule, VisualConfig,
};
pub use normalize::{normalize_rows, normalize_rows_counted, row_to_feature, GEOMETRY_FIELDS};
pub use time::DateRange;
