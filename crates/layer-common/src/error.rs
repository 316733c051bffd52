//! Error types for the layer services.

use thiserror::Error;

/// Result type alias using LayerError.
pub type LayerResult<T> = Result<T, LayerError>;

/// Primary error type for layer catalog and assembly operations.
#[derive(Debug, Error)]
pub enum LayerError {
    // === Request Errors ===
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    // === Data Errors ===
    #[error("Failed to retrieve data for layer '{slug}': {message}")]
    RetrievalFailed { slug: String, message: String },

    #[error("Invalid geometry: {0}")]
    GeometryParse(String),

    // === Storage Errors ===
    #[error("Database error: {0}")]
    DatabaseError(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl LayerError {
    /// Shorthand for a retrieval failure scoped to one layer.
    pub fn retrieval(slug: impl Into<String>, message: impl Into<String>) -> Self {
        LayerError::RetrievalFailed {
            slug: slug.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code used in error response bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            LayerError::LayerNotFound(_) => "LayerNotFound",
            LayerError::InvalidParameter { .. } => "InvalidParameterValue",
            LayerError::InvalidDateRange(_) => "InvalidDateRange",
            LayerError::RetrievalFailed { .. } => "RetrievalFailed",
            LayerError::GeometryParse(_) => "InvalidGeometry",
            LayerError::DatabaseError(_) => "DatabaseError",
            LayerError::InternalError(_) => "NoApplicableCode",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            LayerError::InvalidParameter { .. } | LayerError::InvalidDateRange(_) => 400,

            LayerError::LayerNotFound(_) => 404,

            _ => 500,
        }
    }
}

impl From<serde_json::Error> for LayerError {
    fn from(err: serde_json::Error) -> Self {
        LayerError::InternalError(format!("JSON error: {}", err))
    }
}
