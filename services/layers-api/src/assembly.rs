//! Layer assembly.
//!
//! A [`LayerAssembler`] turns one catalog entry plus a date range into a
//! [`LayerResponse`]: rows from the strategy resolver, normalized features,
//! the visual config with its resolved flags, and legend groups. The batch
//! listing assembles every layer concurrently and drops the ones that fail.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use layer_common::{
    normalize_rows_counted, DateRange, LayerDefinition, LayerError, LayerGroup, LayerResponse,
    LayerResult, VisualConfig,
};
use storage::{CatalogStore, GroupingCalculator, StrategyResolver, FIELD_ACTIONS_SLUG};

use crate::config::ServiceConfig;
use crate::legacy::LegacyDefaults;
use crate::metrics;

/// Group-by column the field-actions layer always uses.
pub const FIELD_ACTIONS_GROUP_COLUMN: &str = "categoria";

/// Builds layer responses from the catalog and the data strategies.
pub struct LayerAssembler {
    catalog: Arc<dyn CatalogStore>,
    resolver: StrategyResolver,
    grouping: GroupingCalculator,
    legacy: LegacyDefaults,
    config: ServiceConfig,
}

impl LayerAssembler {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        resolver: StrategyResolver,
        config: ServiceConfig,
    ) -> Self {
        Self {
            catalog,
            grouping: GroupingCalculator::new(resolver.clone())
                .with_failure_hook(Arc::new(|_: &LayerError| metrics::record_grouping_failure())),
            resolver,
            legacy: LegacyDefaults::new(config.legacy_defaults),
            config,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Look up a catalog entry.
    pub async fn definition(&self, slug: &str) -> LayerResult<Option<LayerDefinition>> {
        let definition = self.catalog.get_entry(slug).await?;
        if definition.is_none() {
            info!(slug = %slug, "Layer not in catalog");
        }
        Ok(definition)
    }

    /// Assemble one layer. `Ok(None)` when the slug has no catalog entry;
    /// retrieval failures propagate.
    #[instrument(skip(self, range))]
    pub async fn get_layer(
        &self,
        slug: &str,
        range: &DateRange,
    ) -> LayerResult<Option<LayerResponse>> {
        let Some(definition) = self.definition(slug).await? else {
            return Ok(None);
        };

        match self.assemble(definition, range).await {
            Ok(response) => Ok(Some(response)),
            Err(e) => {
                metrics::record_assembly_failure();
                Err(e)
            }
        }
    }

    /// Assemble every catalog layer, sorted ascending by `ordering`.
    ///
    /// Layers are assembled concurrently and each outcome is collected on its
    /// own: a failing layer is logged and left out. A catalog that cannot be
    /// listed yields an empty batch.
    pub async fn get_all_layers(&self, range: &DateRange) -> Vec<LayerResponse> {
        let definitions = match self.catalog.list_entries().await {
            Ok(definitions) => definitions,
            Err(e) => {
                warn!(error = %e, "Failed to list catalog");
                return Vec::new();
            }
        };
        let total = definitions.len();

        let outcomes: Vec<(String, LayerResult<LayerResponse>)> = stream::iter(definitions)
            .map(|definition| async move {
                let slug = definition.slug.clone();
                (slug, self.assemble(definition, range).await)
            })
            .buffer_unordered(self.config.max_concurrent_layers.max(1))
            .collect()
            .await;

        let mut layers = Vec::with_capacity(total);
        for (slug, outcome) in outcomes {
            match outcome {
                Ok(layer) => layers.push(layer),
                Err(e) => {
                    warn!(slug = %slug, error = %e, "Dropping layer from batch");
                    metrics::record_assembly_failure();
                }
            }
        }

        // Completion order is arbitrary; ties keep catalog id order
        layers.sort_by(|a, b| a.ordering.cmp(&b.ordering).then(a.id.cmp(&b.id)));

        debug!(total = total, assembled = layers.len(), "Batch assembled");
        layers
    }

    /// Assemble a layer from its catalog entry.
    pub async fn assemble(
        &self,
        definition: LayerDefinition,
        range: &DateRange,
    ) -> LayerResult<LayerResponse> {
        let start = Instant::now();
        debug!(slug = %definition.slug, "Assembling layer");

        let rows = self.resolver.fetch_rows(&definition, range).await?;
        let row_count = rows.len();
        let (data, dropped) = normalize_rows_counted(rows);

        let group_column = Self::group_column(&definition);
        let groups = match &group_column {
            Some(column) => Some(self.groups(&definition, column).await),
            None => None,
        };

        let visual_config = self.visual_config(&definition, group_column);

        debug!(
            slug = %definition.slug,
            rows = row_count,
            features = data.len(),
            dropped = dropped,
            "Layer assembled"
        );
        metrics::record_assembly(&definition.slug, data.len(), start.elapsed());

        Ok(LayerResponse {
            id: definition.id,
            slug: definition.slug,
            name: definition.name,
            ordering: definition.ordering,
            visual_config,
            schema_config: definition.schema_config,
            data,
            groups,
        })
    }

    /// The visual config as served: stored config with the date-filter flag
    /// and group-by column resolved, then legacy gaps filled.
    pub fn visual_config(
        &self,
        definition: &LayerDefinition,
        group_column: Option<String>,
    ) -> VisualConfig {
        let mut visual = definition.visual_config.clone();
        visual.date_filter = Some(definition.visual_config.date_filter_enabled());
        visual.group_by_column = group_column;
        self.legacy.apply(&definition.slug, &mut visual);
        visual
    }

    /// Groups of one column. A failed query yields no groups.
    pub async fn groups(&self, definition: &LayerDefinition, column: &str) -> Vec<LayerGroup> {
        self.grouping.groups_for(definition, column).await
    }

    /// Column a layer's legend groups by: forced for field actions,
    /// otherwise whatever the visual config names.
    pub fn group_column(definition: &LayerDefinition) -> Option<String> {
        if definition.slug == FIELD_ACTIONS_SLUG {
            return Some(FIELD_ACTIONS_GROUP_COLUMN.to_string());
        }
        definition
            .visual_config
            .group_by_column
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_column_forced_for_field_actions() {
        let definition = LayerDefinition::new(1, FIELD_ACTIONS_SLUG, "Ações", 0);
        assert_eq!(
            LayerAssembler::group_column(&definition).as_deref(),
            Some("categoria")
        );

        // Stored config cannot override the forced column
        let definition = definition.with_visual_config(
            serde_json::from_value(json!({"groupByColumn": "status"})).unwrap(),
        );
        assert_eq!(
            LayerAssembler::group_column(&definition).as_deref(),
            Some("categoria")
        );
    }

    #[test]
    fn test_group_column_from_config() {
        let definition = LayerDefinition::new(2, "ocorrencias", "Ocorrências", 0);
        assert_eq!(LayerAssembler::group_column(&definition), None);

        let definition = definition.with_visual_config(
            serde_json::from_value(json!({"groupByColumn": " tipo "})).unwrap(),
        );
        assert_eq!(
            LayerAssembler::group_column(&definition).as_deref(),
            Some("tipo")
        );
    }
}
