//! POST /custom

use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use fusion_common::api::{ApiResponse, AuthClaims};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{parse_store_request, CustomRecord};
use crate::AppState;

/// Identity of a stored custom record
#[derive(Debug, Serialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub timestamp: i64,
}

/// Validate, enrich with the caller's identity, and persist a custom record
pub async fn store_custom_record(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ApiResponse<StoredRecord>>)> {
    let request = parse_store_request(&body).map_err(|msg| {
        tracing::debug!(user_id = %claims.user_id, error = %msg, "Rejected custom record");
        ApiError::BadRequest(msg)
    })?;

    let record = CustomRecord::new(request, &claims.user_id, claims.email.as_deref());
    state.store.save_custom(&record).await?;

    tracing::info!(id = %record.id, user_id = %claims.user_id, "Stored custom record");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            StoredRecord {
                id: record.id,
                timestamp: record.timestamp,
            },
            "Data stored successfully",
        )),
    ))
}
