//! Layer endpoints.
//!
//! - `GET /api/layers` - every layer, assembled for an optional date range
//! - `GET /api/layers/:slug` - one layer
//! - `GET /api/layers/:slug/groups` - legend groups of one column
//! - `POST /api/layers/:slug/style` - resolve the style of one feature

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use layer_common::{DateRange, LayerDefinition, LayerError, LayerGroup, LayerResponse};
use layer_style::{
    choose_point_renderer, resolve_properties, to_draw_style, DrawStyle, PointRenderer,
    ResolvedStyle,
};

use crate::assembly::LayerAssembler;
use crate::handlers::ApiError;
use crate::metrics;
use crate::state::AppState;

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateQuery {
    pub fn range(&self) -> Result<DateRange, ApiError> {
        Ok(DateRange::from_params(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )?)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GroupsQuery {
    pub column: Option<String>,
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupsResponse {
    pub slug: String,
    pub column: String,
    pub groups: Vec<LayerGroup>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StyleRequest {
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StyleResponse {
    pub style: ResolvedStyle,
    pub draw: DrawStyle,
    pub point: PointRenderer,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/layers
#[instrument(skip(state))]
pub async fn list_layers_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<LayerResponse>>, ApiError> {
    metrics::record_request("layers");
    let range = query.range()?;
    Ok(Json(state.assembler.get_all_layers(&range).await))
}

/// GET /api/layers/:slug
#[instrument(skip(state))]
pub async fn get_layer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<LayerResponse>, ApiError> {
    metrics::record_request("layer");
    let range = query.range()?;

    match state.assembler.get_layer(&slug, &range).await? {
        Some(layer) => Ok(Json(layer)),
        None => Err(LayerError::LayerNotFound(slug).into()),
    }
}

/// GET /api/layers/:slug/groups?column=
///
/// Without `column`, the layer's own group-by column is used.
#[instrument(skip(state))]
pub async fn groups_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<GroupsQuery>,
) -> Result<Json<GroupsResponse>, ApiError> {
    metrics::record_request("groups");
    let definition = require_definition(&state, &slug).await?;

    let column = query
        .column
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .or_else(|| LayerAssembler::group_column(&definition))
        .ok_or_else(|| LayerError::InvalidParameter {
            param: "column".to_string(),
            message: format!("layer '{}' has no group-by column", slug),
        })?;

    let groups = state.assembler.groups(&definition, &column).await;
    Ok(Json(GroupsResponse {
        slug,
        column,
        groups,
    }))
}

/// POST /api/layers/:slug/style
///
/// Resolves a feature's style with the same engine the map client uses.
#[instrument(skip(state, body))]
pub async fn style_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
    body: Result<Json<StyleRequest>, JsonRejection>,
) -> Result<Json<StyleResponse>, ApiError> {
    metrics::record_request("style");
    let Json(request) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let definition = require_definition(&state, &slug).await?;

    let visual = state
        .assembler
        .visual_config(&definition, LayerAssembler::group_column(&definition));
    let style = resolve_properties(&visual, &request.properties);
    let draw = to_draw_style(&style);
    let point = choose_point_renderer(&style, state.assembler.config().point_radius);

    Ok(Json(StyleResponse { style, draw, point }))
}

async fn require_definition(state: &AppState, slug: &str) -> Result<LayerDefinition, ApiError> {
    state
        .assembler
        .definition(slug)
        .await?
        .ok_or_else(|| LayerError::LayerNotFound(slug.to_string()).into())
}
