//! Router construction.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the service router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Layers
        .route("/api/layers", get(handlers::layers::list_layers_handler))
        .route("/api/layers/:slug", get(handlers::layers::get_layer_handler))
        .route(
            "/api/layers/:slug/groups",
            get(handlers::layers::groups_handler),
        )
        .route(
            "/api/layers/:slug/style",
            post(handlers::layers::style_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
