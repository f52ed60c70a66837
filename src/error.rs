use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} model not loaded")]
    ModelUnavailable(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("prediction failed: {0}")]
    PredictionFailed(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::ModelUnavailable(_) | ServiceError::PredictionFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PredictError> for ServiceError {
    fn from(err: PredictError) -> Self {
        ServiceError::PredictionFailed(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ServiceError::ModelUnavailable(_) => serde_json::json!({
                "error": self.to_string(),
            }),
            ServiceError::InvalidInput(reason) => {
                tracing::debug!(%reason, "rejecting request payload");
                serde_json::json!({
                    "error": "Invalid input data",
                })
            }
            ServiceError::PredictionFailed(details) => serde_json::json!({
                "error": "Prediction failed",
                "details": details,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Failure raised by a predictor while producing a value.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
    #[error("feature '{field}' is not numeric: {value}")]
    NotNumeric { field: String, value: String },
    #[error("model produced a non-finite value")]
    NonFinite,
    #[error("{0}")]
    Model(String),
}

/// Failure to bring a model artifact into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid artifact: {0}")]
    Invalid(String),
    #[error("artifact features do not match endpoint schema: {0}")]
    SchemaMismatch(String),
}
