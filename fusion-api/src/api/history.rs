//! GET /history?page&limit&type

use axum::{
    extract::{Query, State},
    Json,
};
use fusion_common::api::ApiResponse;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::models::HistoryCollection;
use crate::pagination::PageRequest;
use crate::AppState;

/// Raw query parameters; validated by [`PageRequest::parse`]
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "type")]
    pub collection: Option<String>,
}

/// One page of fusion (default) or custom history, newest first
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Value>>>> {
    let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref())
        .map_err(ApiError::BadRequest)?;
    let collection = HistoryCollection::from_query(query.collection.as_deref());

    let history = state.store.history(collection, page).await?;

    tracing::debug!(
        collection = collection.table_name(),
        page = page.page,
        limit = page.limit,
        total = history.total,
        "Fetched history page"
    );

    let pagination = page.info(history.total);
    Ok(Json(
        ApiResponse::ok(history.items, "History retrieved successfully")
            .with_pagination(pagination),
    ))
}
