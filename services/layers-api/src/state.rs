//! Application state for the layer API.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use storage::{
    builtin_registry, CatalogStore, FeatureStore, GenericProvider, PgCatalog, PgFeatureStore,
    StrategyRegistry, StrategyResolver,
};

use crate::assembly::LayerAssembler;
use crate::config::{FixtureSet, ServiceConfig};

/// Shared application state.
pub struct AppState {
    /// Layer assembly over the catalog and data strategies.
    pub assembler: LayerAssembler,
}

impl AppState {
    /// Wire the assembler from explicit backends.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        registry: StrategyRegistry,
        features: Arc<dyn FeatureStore>,
        config: ServiceConfig,
    ) -> Self {
        let resolver = StrategyResolver::new(registry, GenericProvider::new(features));
        Self {
            assembler: LayerAssembler::new(catalog, resolver, config),
        }
    }

    /// Connect to PostgreSQL and register the built-in domain tables.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        migrate: bool,
        config: ServiceConfig,
    ) -> Result<Self> {
        let catalog = PgCatalog::connect(database_url, max_connections)
            .await
            .context("Failed to connect to catalog database")?;

        if migrate {
            catalog.migrate().await.context("Failed to run migrations")?;
            info!("Database schema migrated");
        }

        let pool = catalog.pool().clone();
        let registry = builtin_registry(&pool);
        info!(domains = ?registry.slugs(), "Registered domain strategies");

        Ok(Self::new(
            Arc::new(catalog),
            registry,
            Arc::new(PgFeatureStore::new(pool)),
            config,
        ))
    }

    /// Serve from in-memory fixtures instead of a database.
    pub fn from_fixtures(fixtures: FixtureSet, config: ServiceConfig) -> Self {
        let (catalog, features, registry) = fixtures.into_backends();
        info!(domains = ?registry.slugs(), "Serving from fixtures");
        Self::new(Arc::new(catalog), registry, Arc::new(features), config)
    }
}
