use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};
use utoipa::ToSchema;
use validator::ValidationErrors;

use health_score_domain::services::HealthScoreServiceError;

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create a payload too large error response
    pub fn too_large(message: &str) -> Self {
        Self {
            error: "payload_too_large".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<HealthScoreServiceError> for ErrorResponse {
    fn from(err: HealthScoreServiceError) -> Self {
        match err {
            HealthScoreServiceError::InvalidInput(invalid) => {
                warn!("Rejected biomarker record: {}", invalid);
                ErrorResponse::validation_error(
                    &invalid.to_string(),
                    Some(json!({
                        "field": invalid.field,
                        "reason": invalid.reason.to_string(),
                    })),
                )
            }
            HealthScoreServiceError::Preprocessing(message) => {
                warn!("Rejected preprocessing options: {}", message);
                ErrorResponse::validation_error(&message, None)
            }
            HealthScoreServiceError::Profile(e) => {
                error!("Scoring profile unavailable: {}", e);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl From<ValidationErrors> for ErrorResponse {
    fn from(errors: ValidationErrors) -> Self {
        warn!("Request validation failed: {}", errors);
        ErrorResponse::validation_error("Request validation failed", serde_json::to_value(&errors).ok())
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Malformed request body: {}", rejection.body_text());
        ErrorResponse::bad_request(&rejection.body_text())
    }
}
