//! Health and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub catalog: String,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /ready - Readiness check (verifies the catalog can be listed)
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let catalog = match state.assembler.catalog().list_entries().await {
        Ok(_) => "ok".to_string(),
        Err(e) => format!("error: {}", e),
    };
    let ready = catalog == "ok";

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadyResponse { ready, catalog })).into_response()
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(handle: Option<Extension<PrometheusHandle>>) -> Response {
    match handle {
        Some(Extension(handle)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
