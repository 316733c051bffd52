//! Storage abstractions for the territory layer services.
//!
//! Provides unified interfaces for:
//! - The layer catalog (persisted layer definitions)
//! - The shared generic feature store, scoped by layer id
//! - Bespoke per-domain retrieval strategies and their registry
//! - Distinct-value grouping for legends and filters
//!
//! Each interface has a PostgreSQL/PostGIS backend and an in-memory one.

pub mod catalog;
pub mod domains;
pub mod features;
pub mod grouping;
pub mod memory;
pub mod strategy;

pub use catalog::{CatalogStore, PgCatalog};
pub use domains::{
    builtin_registry, DomainTable, TableStrategy, BUILTIN_DOMAINS, FIELD_ACTIONS_SLUG,
};
pub use features::{FeatureStore, PgFeatureStore, RowWindow};
pub use grouping::{FailureHook, GroupingCalculator};
pub use memory::{GenericFeature, MemoryCatalog, MemoryFeatureStore, StaticStrategy};
pub use strategy::{DomainStrategy, GenericProvider, StrategyRegistry, StrategyResolver};

use layer_common::LayerError;

/// Map a sqlx error onto the shared error type.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> LayerError {
    LayerError::DatabaseError(format!("{}: {}", context, err))
}
