//! Table-backed domain strategies.
//!
//! Each specially-modeled layer reads its own PostGIS table. A
//! [`DomainTable`] describes that table; [`TableStrategy`] turns the
//! description into queries. Adding a domain layer means adding a descriptor
//! to [`BUILTIN_DOMAINS`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use layer_common::{DateRange, GeoRow, LayerError, LayerResult};

use crate::db_error;
use crate::strategy::{DomainStrategy, StrategyRegistry};

/// Slug of the field-actions layer, which has forced grouping and icon
/// heuristics.
pub const FIELD_ACTIONS_SLUG: &str = "acoes";

/// Static description of a domain table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainTable {
    /// Catalog slug served by this table
    pub slug: &'static str,
    pub table: &'static str,
    /// Columns copied into feature properties
    pub columns: &'static [&'static str],
    pub geometry_column: &'static str,
    /// Column the caller's date range filters on; `None` for static layers
    pub timestamp_column: Option<&'static str>,
    /// ORDER BY clause; draw order follows it
    pub order_by: &'static str,
    /// Columns legends may group by
    pub group_columns: &'static [&'static str],
}

/// Domain layers known to the service.
pub const BUILTIN_DOMAINS: &[DomainTable] = &[
    DomainTable {
        slug: "focos_calor",
        table: "focos_calor",
        columns: &["id", "data_hora", "satelite", "municipio", "bioma", "frp"],
        geometry_column: "geom",
        timestamp_column: Some("data_hora"),
        // Oldest first so the newest hotspots are drawn on top
        order_by: "data_hora ASC, id ASC",
        group_columns: &["satelite", "municipio", "bioma"],
    },
    DomainTable {
        slug: "desmatamento",
        table: "alertas_desmatamento",
        columns: &["id", "data_deteccao", "area_ha", "fonte", "classe", "municipio"],
        geometry_column: "geom",
        timestamp_column: Some("data_deteccao"),
        order_by: "data_deteccao ASC, id ASC",
        group_columns: &["fonte", "classe", "municipio"],
    },
    DomainTable {
        slug: "propriedades",
        table: "propriedades",
        columns: &["id", "nome", "cod_car", "proprietario", "area_ha", "situacao", "municipio"],
        geometry_column: "geom",
        timestamp_column: None,
        order_by: "id ASC",
        group_columns: &["situacao", "municipio"],
    },
    DomainTable {
        slug: "estradas",
        table: "estradas",
        columns: &["id", "nome", "tipo", "jurisdicao", "pavimentada"],
        geometry_column: "geom",
        timestamp_column: None,
        order_by: "id ASC",
        group_columns: &["tipo", "jurisdicao"],
    },
    DomainTable {
        slug: FIELD_ACTIONS_SLUG,
        table: "acoes_campo",
        columns: &["id", "titulo", "categoria", "descricao", "responsavel", "status", "data_acao"],
        geometry_column: "geom",
        timestamp_column: Some("data_acao"),
        order_by: "data_acao ASC, id ASC",
        group_columns: &["categoria", "status", "responsavel"],
    },
];

impl DomainTable {
    pub fn find(slug: &str) -> Option<&'static DomainTable> {
        BUILTIN_DOMAINS.iter().find(|d| d.slug == slug)
    }

    /// SELECT producing one JSON object per row. Temporal tables take the
    /// range bounds as `$1`/`$2`.
    pub fn select_sql(&self) -> String {
        let filter = match self.timestamp_column {
            Some(ts) => format!(
                " WHERE ($1::timestamptz IS NULL OR {ts} >= $1) \
                 AND ($2::timestamptz IS NULL OR {ts} <= $2)",
                ts = ts
            ),
            None => String::new(),
        };

        format!(
            "SELECT row_to_json(t)::jsonb FROM (\
             SELECT {columns}, ST_AsGeoJSON({geom}) AS geojson FROM {table}{filter} \
             ORDER BY {order}) t",
            columns = self.columns.join(", "),
            geom = self.geometry_column,
            table = self.table,
            filter = filter,
            order = self.order_by,
        )
    }

    /// SELECT of the distinct values of a group column, or an error if the
    /// column is not declared groupable.
    pub fn distinct_sql(&self, column: &str) -> LayerResult<String> {
        if !self.group_columns.contains(&column) {
            return Err(LayerError::InvalidParameter {
                param: "column".to_string(),
                message: format!("'{}' cannot be grouped on layer '{}'", column, self.slug),
            });
        }

        Ok(format!(
            "SELECT DISTINCT {column}::text AS value FROM {table} \
             WHERE {column} IS NOT NULL ORDER BY value ASC",
            column = column,
            table = self.table,
        ))
    }
}

/// A [`DomainStrategy`] reading a [`DomainTable`].
pub struct TableStrategy {
    pool: PgPool,
    table: DomainTable,
}

impl TableStrategy {
    pub fn new(pool: PgPool, table: DomainTable) -> Self {
        Self { pool, table }
    }
}

#[async_trait]
impl DomainStrategy for TableStrategy {
    async fn fetch(&self, range: &DateRange) -> LayerResult<Vec<GeoRow>> {
        let sql = self.table.select_sql();
        let mut query = sqlx::query_scalar::<_, Value>(&sql);
        if self.table.timestamp_column.is_some() {
            query = query.bind(range.start).bind(range.end);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Domain query failed", e))?;

        Ok(rows
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }

    async fn distinct_values(&self, column: &str) -> LayerResult<Vec<String>> {
        let sql = self.table.distinct_sql(column)?;
        sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Group query failed", e))
    }
}

/// Registry with a [`TableStrategy`] for every built-in domain.
pub fn builtin_registry(pool: &PgPool) -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    for table in BUILTIN_DOMAINS {
        registry.register(table.slug, Arc::new(TableStrategy::new(pool.clone(), *table)));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_slugs_unique() {
        let mut slugs: Vec<&str> = BUILTIN_DOMAINS.iter().map(|d| d.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), BUILTIN_DOMAINS.len());
    }

    #[test]
    fn test_temporal_select_has_bounds() {
        let sql = DomainTable::find("focos_calor").unwrap().select_sql();
        assert!(sql.contains("data_hora >= $1"));
        assert!(sql.contains("data_hora <= $2"));
        assert!(sql.contains("ORDER BY data_hora ASC"));
        assert!(sql.contains("ST_AsGeoJSON(geom) AS geojson"));
    }

    #[test]
    fn test_static_select_has_no_params() {
        let sql = DomainTable::find("estradas").unwrap().select_sql();
        assert!(!sql.contains('$'));
    }

    #[test]
    fn test_group_columns_whitelisted() {
        let acoes = DomainTable::find(FIELD_ACTIONS_SLUG).unwrap();
        assert!(acoes.distinct_sql("categoria").is_ok());
        assert!(matches!(
            acoes.distinct_sql("categoria; DROP TABLE acoes_campo"),
            Err(LayerError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_group_columns_are_selected_columns() {
        for table in BUILTIN_DOMAINS {
            for column in table.group_columns {
                assert!(table.columns.contains(column), "{}.{}", table.table, column);
            }
        }
    }
}
