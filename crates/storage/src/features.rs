//! The shared generic feature store.
//!
//! Layers without a bespoke domain table keep their features in one table
//! (`layer_features`) keyed by the catalog id: a geometry, a JSON property
//! bag and an optional observation timestamp.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use layer_common::{DateRange, GeoRow, LayerId, LayerResult};

use crate::db_error;

/// Which rows of a layer the generic store should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowWindow {
    /// Only the most recently observed row
    Latest,
    /// Rows observed inside the range (open bounds allowed)
    Between(DateRange),
    /// Every row of the layer
    All,
}

/// Query access to the generic store.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Rows of one layer. `Between` and `All` return oldest first.
    async fn fetch_rows(&self, layer_id: LayerId, window: RowWindow) -> LayerResult<Vec<GeoRow>>;

    /// Distinct values of one key of the property bag.
    async fn distinct_property_values(&self, layer_id: LayerId, key: &str)
        -> LayerResult<Vec<String>>;
}

/// Assemble a generic-store row in the shape the normalizer expects.
///
/// Fixed columns come first; property bag keys are merged in after them and
/// never replace a fixed column.
pub fn generic_row(
    id: i64,
    layer_id: LayerId,
    geojson: Value,
    properties: Map<String, Value>,
    observed_at: Option<DateTime<Utc>>,
) -> GeoRow {
    let mut row = GeoRow::new();
    row.insert("id".to_string(), Value::from(id));
    row.insert("layer_id".to_string(), Value::from(layer_id.0));
    row.insert("geojson".to_string(), geojson);
    row.insert(
        "observed_at".to_string(),
        observed_at
            .map(|t| Value::String(t.to_rfc3339_opts(SecondsFormat::Secs, true)))
            .unwrap_or(Value::Null),
    );

    for (key, value) in properties {
        if !row.contains_key(&key) {
            row.insert(key, value);
        }
    }
    row
}

/// PostGIS implementation of [`FeatureStore`].
#[derive(Clone)]
pub struct PgFeatureStore {
    pool: PgPool,
}

impl PgFeatureStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct FeatureRow {
    id: i64,
    layer_id: i64,
    geojson: Option<String>,
    properties: Option<Value>,
    observed_at: Option<DateTime<Utc>>,
}

impl From<FeatureRow> for GeoRow {
    fn from(row: FeatureRow) -> Self {
        let properties = match row.properties {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        generic_row(
            row.id,
            LayerId(row.layer_id),
            row.geojson.map(Value::String).unwrap_or(Value::Null),
            properties,
            row.observed_at,
        )
    }
}

const FEATURE_COLUMNS: &str =
    "SELECT id, layer_id, ST_AsGeoJSON(geom) AS geojson, properties, observed_at \
     FROM layer_features WHERE layer_id = $1";

#[async_trait]
impl FeatureStore for PgFeatureStore {
    async fn fetch_rows(&self, layer_id: LayerId, window: RowWindow) -> LayerResult<Vec<GeoRow>> {
        let rows = match window {
            RowWindow::Latest => {
                let sql = format!(
                    "{} ORDER BY observed_at DESC NULLS LAST, id DESC LIMIT 1",
                    FEATURE_COLUMNS
                );
                sqlx::query_as::<_, FeatureRow>(&sql)
                    .bind(layer_id.0)
                    .fetch_all(&self.pool)
                    .await
            }
            RowWindow::Between(range) => {
                let sql = format!(
                    "{} AND ($2::timestamptz IS NULL OR observed_at >= $2) \
                     AND ($3::timestamptz IS NULL OR observed_at <= $3) \
                     ORDER BY observed_at ASC NULLS FIRST, id ASC",
                    FEATURE_COLUMNS
                );
                sqlx::query_as::<_, FeatureRow>(&sql)
                    .bind(layer_id.0)
                    .bind(range.start)
                    .bind(range.end)
                    .fetch_all(&self.pool)
                    .await
            }
            RowWindow::All => {
                let sql = format!("{} ORDER BY id ASC", FEATURE_COLUMNS);
                sqlx::query_as::<_, FeatureRow>(&sql)
                    .bind(layer_id.0)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_error("Feature query failed", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn distinct_property_values(
        &self,
        layer_id: LayerId,
        key: &str,
    ) -> LayerResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT properties->>$2 AS value FROM layer_features \
             WHERE layer_id = $1 AND properties->>$2 IS NOT NULL \
             ORDER BY value ASC",
        )
        .bind(layer_id.0)
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Group query failed", e))
    }
}
