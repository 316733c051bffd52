//! HTTP request handlers.

pub mod health;
pub mod layers;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use layer_common::LayerError;

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Errors surfaced by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Layer(e) => StatusCode::from_u16(e.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Layer(e) => e.error_code(),
            ApiError::InvalidBody(_) => "InvalidRequestBody",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let not_found = ApiError::from(LayerError::LayerNotFound("x".to_string()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.code(), "LayerNotFound");

        let retrieval = ApiError::from(LayerError::retrieval("x", "boom"));
        assert_eq!(retrieval.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = ApiError::InvalidBody("expected object".to_string());
        assert_eq!(body.status(), StatusCode::BAD_REQUEST);
    }
}
