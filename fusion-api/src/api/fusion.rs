//! GET /fusion

use axum::{extract::State, Json};
use fusion_common::api::ApiResponse;

use crate::error::ApiResult;
use crate::models::FusedRecord;
use crate::AppState;

/// Cached or freshly built fused record
pub async fn get_fused_record(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<FusedRecord>>> {
    let record = state.engine.produce_fused_record().await?;

    Ok(Json(ApiResponse::ok(
        record,
        "Fused data retrieved successfully",
    )))
}
