//! Error types for the churn risk pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the inference pipeline.
///
/// Each variant is a distinct, caller-visible failure; nothing in the
/// pipeline retries or swallows them.
#[derive(Error, Debug)]
pub enum ChurnError {
    /// A client record violated its declared type, range or enumeration
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required model artifact (predictor or feature schema) is missing
    #[error("Model bundle not found: {0}")]
    BundleNotFound(String),

    /// Prediction requested before a model bundle was loaded
    #[error("Model not loaded")]
    ModelNotLoaded,

    /// Batch prediction requested with zero records
    #[error("Empty batch: at least one client record is required")]
    EmptyBatch,

    /// An artifact exists but its content is inconsistent or malformed
    #[error("Invalid artifact {artifact}: {message}")]
    InvalidArtifact { artifact: String, message: String },

    /// The predictor failed to produce an output
    #[error("Inference error: {0}")]
    Inference(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ChurnError {
    /// Shorthand for an [`ChurnError::InvalidArtifact`]
    pub fn invalid_artifact(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        ChurnError::InvalidArtifact {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChurnError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ChurnError::EmptyBatch => StatusCode::BAD_REQUEST,
            ChurnError::ModelNotLoaded | ChurnError::BundleNotFound(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ChurnError::InvalidArtifact { .. }
            | ChurnError::Inference(_)
            | ChurnError::Io(_)
            | ChurnError::Serialization(_)
            | ChurnError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ChurnError::Validation(_) => "VALIDATION_ERROR",
            ChurnError::BundleNotFound(_) => "BUNDLE_NOT_FOUND",
            ChurnError::ModelNotLoaded => "MODEL_NOT_LOADED",
            ChurnError::EmptyBatch => "EMPTY_BATCH",
            ChurnError::InvalidArtifact { .. } => "INVALID_ARTIFACT",
            ChurnError::Inference(_) => "INFERENCE_ERROR",
            ChurnError::Io(_) => "IO_ERROR",
            ChurnError::Serialization(_) => "SERIALIZATION_ERROR",
            ChurnError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl IntoResponse for ChurnError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request rejected"
            );
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for ChurnError {
    fn from(err: serde_json::Error) -> Self {
        ChurnError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ChurnError {
    fn from(err: config::ConfigError) -> Self {
        ChurnError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ChurnError>;
