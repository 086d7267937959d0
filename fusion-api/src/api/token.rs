//! Token issuance and caller verification
//!
//! POST /auth/token is a development convenience and is only routed when
//! `enable_token_endpoint` is set.

use axum::{body::Bytes, extract::State, Extension, Json};
use fusion_common::api::{ApiResponse, AuthClaims};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest {
    user_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub token_type: &'static str,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// POST /auth/token with `{userId, email?}`
pub async fn issue_token(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<ApiResponse<IssuedToken>>> {
    let request: TokenRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("\"userId\" is required".to_string()))?;

    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest(
            "\"userId\" is not allowed to be empty".to_string(),
        ));
    }

    let lifetime = chrono::Duration::hours(state.token_ttl_hours);
    let token = fusion_common::api::issue_token(
        &state.jwt_secret,
        user_id,
        request.email.as_deref(),
        lifetime,
    )
    .map_err(|e| ApiError::Internal(format!("Token signing failed: {}", e)))?;

    tracing::info!(user_id = %user_id, "Issued token");

    Ok(Json(ApiResponse::ok(
        IssuedToken {
            token,
            token_type: "Bearer",
            expires_in: lifetime.num_seconds(),
        },
        "Token issued successfully",
    )))
}

/// GET /auth/verify: claims of the authenticated caller
pub async fn verify_caller(
    Extension(claims): Extension<AuthClaims>,
) -> Json<ApiResponse<AuthClaims>> {
    Json(ApiResponse::ok(claims, "Token is valid"))
}
