//! Layer catalog backed by PostgreSQL.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use layer_common::{LayerDefinition, LayerId, LayerResult, VisualConfig};

use crate::db_error;

/// Read access to persisted layer definitions.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up one layer by slug.
    async fn get_entry(&self, slug: &str) -> LayerResult<Option<LayerDefinition>>;

    /// All layers, `ordering` descending (ties by id ascending).
    async fn list_entries(&self) -> LayerResult<Vec<LayerDefinition>>;
}

/// Database connection pool and catalog queries.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Create a new catalog connection from database URL.
    pub async fn connect(database_url: &str, max_connections: u32) -> LayerResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| db_error("Connection failed", e))?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, shared with the feature store and domain strategies.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> LayerResult<()> {
        // Split SQL statements and execute them individually
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| db_error("Migration failed", e))?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn get_entry(&self, slug: &str) -> LayerResult<Option<LayerDefinition>> {
        let row = sqlx::query_as::<_, CatalogRow>(
            "SELECT id, slug, name, ordering, schema_config, visual_config \
             FROM layer_catalog WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Query failed", e))?;

        Ok(row.map(Into::into))
    }

    async fn list_entries(&self) -> LayerResult<Vec<LayerDefinition>> {
        let rows = sqlx::query_as::<_, CatalogRow>(
            "SELECT id, slug, name, ordering, schema_config, visual_config \
             FROM layer_catalog ORDER BY ordering DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Query failed", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Internal row type for catalog queries.
#[derive(FromRow)]
struct CatalogRow {
    id: i64,
    slug: String,
    name: String,
    ordering: i32,
    schema_config: Option<Value>,
    visual_config: Option<Value>,
}

impl From<CatalogRow> for LayerDefinition {
    fn from(row: CatalogRow) -> Self {
        LayerDefinition {
            id: LayerId(row.id),
            slug: row.slug,
            name: row.name,
            ordering: row.ordering,
            schema_config: row.schema_config.unwrap_or(Value::Null),
            visual_config: VisualConfig::from_stored(row.visual_config),
        }
    }
}

/// Database schema SQL.
///
/// The catalog and the generic store are owned here. The domain tables are
/// written by the ingestion jobs; their DDL is included so a fresh database
/// can serve every built-in layer.
const SCHEMA_SQL: &str = r#"
CREATE EXTENSION IF NOT EXISTS postgis;

CREATE TABLE IF NOT EXISTS layer_catalog (
    id BIGSERIAL PRIMARY KEY,
    slug VARCHAR(100) NOT NULL UNIQUE,
    name VARCHAR(200) NOT NULL,
    ordering INTEGER NOT NULL DEFAULT 0,
    schema_config JSONB,
    visual_config JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS layer_features (
    id BIGSERIAL PRIMARY KEY,
    layer_id BIGINT NOT NULL REFERENCES layer_catalog(id) ON DELETE CASCADE,
    geom GEOMETRY(Geometry, 4326) NOT NULL,
    properties JSONB NOT NULL DEFAULT '{}'::jsonb,
    observed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_layer_features_layer_time ON layer_features(layer_id, observed_at DESC);

CREATE TABLE IF NOT EXISTS focos_calor (
    id BIGSERIAL PRIMARY KEY,
    data_hora TIMESTAMPTZ NOT NULL,
    satelite VARCHAR(50),
    municipio VARCHAR(120),
    bioma VARCHAR(60),
    frp DOUBLE PRECISION,
    geom GEOMETRY(Point, 4326) NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_focos_calor_data_hora ON focos_calor(data_hora);

CREATE TABLE IF NOT EXISTS alertas_desmatamento (
    id BIGSERIAL PRIMARY KEY,
    data_deteccao TIMESTAMPTZ NOT NULL,
    area_ha DOUBLE PRECISION,
    fonte VARCHAR(50),
    classe VARCHAR(80),
    municipio VARCHAR(120),
    geom GEOMETRY(MultiPolygon, 4326) NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_alertas_desmatamento_data ON alertas_desmatamento(data_deteccao);

CREATE TABLE IF NOT EXISTS propriedades (
    id BIGSERIAL PRIMARY KEY,
    nome VARCHAR(200),
    cod_car VARCHAR(60),
    proprietario VARCHAR(200),
    area_ha DOUBLE PRECISION,
    situacao VARCHAR(60),
    municipio VARCHAR(120),
    geom GEOMETRY(MultiPolygon, 4326) NOT NULL
);

CREATE TABLE IF NOT EXISTS estradas (
    id BIGSERIAL PRIMARY KEY,
    nome VARCHAR(200),
    tipo VARCHAR(60),
    jurisdicao VARCHAR(60),
    pavimentada BOOLEAN,
    geom GEOMETRY(MultiLineString, 4326) NOT NULL
);

CREATE TABLE IF NOT EXISTS acoes_campo (
    id BIGSERIAL PRIMARY KEY,
    titulo VARCHAR(200) NOT NULL,
    categoria VARCHAR(100),
    descricao TEXT,
    responsavel VARCHAR(200),
    status VARCHAR(40),
    data_acao TIMESTAMPTZ NOT NULL,
    geom GEOMETRY(Point, 4326) NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_acoes_campo_data ON acoes_campo(data_acao)
"#;
