//! Error handling for the REST API server.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cardscan_core::{CardScanError, ErrorCode};
use serde::Serialize;
use std::fmt;
use tracing::error;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::ValInvalidInput.as_str(),
            message,
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

// Convert from cardscan-core errors
impl From<CardScanError> for ApiError {
    fn from(err: CardScanError) -> Self {
        let code = err.code().as_str();

        match err {
            CardScanError::Validation {
                message, missing, ..
            } => {
                let api = ApiError::new(StatusCode::BAD_REQUEST, code, message);
                if missing.is_empty() {
                    api
                } else {
                    api.with_details(serde_json::json!({ "missing": missing }))
                }
            }
            CardScanError::StorageUnavailable { message, .. } => {
                error!(code, "Storage error: {}", message);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
            }
            other => {
                error!(code, "Unexpected error: {}", other);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, code, other.reason())
            }
        }
    }
}

// Malformed, mistyped, oversized or non-JSON bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::bad_request(rejection.body_text())
            }
            status => ApiError::new(
                status,
                ErrorCode::ValInvalidInput.as_str(),
                rejection.body_text(),
            ),
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use cardscan_core::CardField;

    #[test]
    fn test_validation_maps_to_400_with_missing() {
        let api: ApiError =
            CardScanError::missing_fields(vec![CardField::PolicyNumber, CardField::Insurer]).into();

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, "VAL_002");
        assert_eq!(
            api.details,
            Some(serde_json::json!({ "missing": ["policyNumber", "insurer"] }))
        );
    }

    #[test]
    fn test_storage_maps_to_500() {
        let api: ApiError = CardScanError::storage("disk full").into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.code, "STO_002");
        assert_eq!(api.message, "disk full");
    }

    #[test]
    fn test_display() {
        let api = ApiError::bad_request("nope");
        assert_eq!(api.to_string(), "[400 Bad Request] VAL_001: nope");
    }
}
