//! fusion-api library - character, planet and weather fusion service
//!
//! Serves a cached "fused" record built from a random Star Wars character,
//! its home planet and the current weather in a stand-in Earth city, plus
//! JWT-protected custom record storage and history browsing.

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod services;

use db::RecordStore;
use services::FusionEngine;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FusionEngine>,
    pub store: Arc<dyn RecordStore>,
    /// HS256 signing key for bearer tokens
    pub jwt_secret: Arc<str>,
    pub token_ttl_hours: i64,
    pub enable_token_endpoint: bool,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        engine: Arc<FusionEngine>,
        store: Arc<dyn RecordStore>,
        jwt_secret: impl Into<Arc<str>>,
        token_ttl_hours: i64,
        enable_token_endpoint: bool,
    ) -> Self {
        Self {
            engine,
            store,
            jwt_secret: jwt_secret.into(),
            token_ttl_hours,
            enable_token_endpoint,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// `/fusion` and `/health` are public; everything else requires a bearer
/// token. `POST /auth/token` is only mounted when enabled.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/custom", post(api::store_custom_record))
        .route("/history", get(api::get_history))
        .route("/auth/verify", get(api::verify_caller))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let mut public = Router::new()
        .route("/fusion", get(api::get_fused_record))
        .merge(api::health_routes());

    if state.enable_token_endpoint {
        public = public.route("/auth/token", post(api::issue_token));
    }

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
