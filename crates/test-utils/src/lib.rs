//! Shared test utilities for the territory layers workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Sample geometries in every shape the normalizer accepts
//! - Catalog definitions covering each display mode and styling style
//! - Row generators for domain and generic-store data
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{catalog, point_row, assert_feature_ids};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

#[doc(hidden)]
pub use serde_json;

/// Assert the `id`s of a feature collection, in order.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_feature_ids;
///
/// assert_feature_ids!(collection, [1, 2, 3]);
/// ```
#[macro_export]
macro_rules! assert_feature_ids {
    ($collection:expr, [$($id:expr),* $(,)?]) => {{
        let actual: Vec<$crate::serde_json::Value> = $collection
            .features
            .iter()
            .map(|f| f.id.clone().unwrap_or($crate::serde_json::Value::Null))
            .collect();
        let expected: Vec<$crate::serde_json::Value> = vec![$($crate::serde_json::json!($id)),*];
        assert_eq!(actual, expected, "feature ids differ");
    }};
}

#[cfg(test)]
mod tests {
    use layer_common::{FeatureCollection, GeoFeature, Geometry};
    use serde_json::json;

    #[test]
    fn test_assert_feature_ids_passes() {
        let collection = FeatureCollection::new().with_features(vec![
            GeoFeature::new(Geometry::point(0.0, 0.0)).with_id(json!(1)),
            GeoFeature::new(Geometry::point(1.0, 1.0)).with_id(json!(2)),
        ]);
        assert_feature_ids!(collection, [1, 2]);
    }

    #[test]
    #[should_panic(expected = "feature ids differ")]
    fn test_assert_feature_ids_fails() {
        let collection = FeatureCollection::new()
            .with_features(vec![GeoFeature::new(Geometry::point(0.0, 0.0))]);
        assert_feature_ids!(collection, [1]);
    }
}
