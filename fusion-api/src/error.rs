//! Error types for fusion-api
//!
//! Every error renders as the standard response envelope. Causes of 5xx
//! errors are logged here and never sent to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fusion_common::api::ApiResponse;
use thiserror::Error;

use crate::services::FusionError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400); the message is shown to the caller
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Fused record could not be produced (500)
    #[error(transparent)]
    Fusion(#[from] FusionError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// fusion-common error (500)
    #[error("Common error: {0}")]
    Common(#[from] fusion_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiResponse::failure(msg, None)),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::failure("Unauthorized", None),
            ),
            ApiError::Fusion(ref err) => {
                tracing::error!(error = %err, "Fusion request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::failure(
                        INTERNAL_ERROR_MESSAGE,
                        Some("Could not retrieve fused data".to_string()),
                    ),
                )
            }
            ApiError::Internal(ref msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::failure(INTERNAL_ERROR_MESSAGE, None),
                )
            }
            ApiError::Common(ref err) => {
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::failure(INTERNAL_ERROR_MESSAGE, None),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_bad_request_shows_message() {
        let (status, body) = render(ApiError::BadRequest("\"data\" is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "\"data\" is required");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_internal_hides_cause() {
        let (status, body) = render(ApiError::Internal("disk full at /var/db".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert!(!body.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn test_fusion_failure_envelope() {
        let err = FusionError::CreationFailed("Error fetching person 3: timeout".into());
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["message"], "Could not retrieve fused data");
        assert!(!body.to_string().contains("person 3"));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (status, body) = render(ApiError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }
}
