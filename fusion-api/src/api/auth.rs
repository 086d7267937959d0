//! Bearer token middleware
//!
//! The token is read from `Authorization: Bearer <token>`, or from the
//! `token` query parameter when the header is absent. Verified claims are
//! attached to the request as an [`AuthClaims`] extension.

use axum::{
    extract::{Query, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use fusion_common::api::{verify_token, AuthClaims};
use serde::Deserialize;
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Reject requests without a valid bearer token (401, no detail)
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_token(&request) else {
        warn!(path = %request.uri().path(), "Request without token");
        return Err(ApiError::Unauthorized);
    };

    let claims = verify_token(&state.jwt_secret, &token).map_err(|e| {
        warn!(path = %request.uri().path(), error = %e, "Token verification failed");
        ApiError::Unauthorized
    })?;

    tracing::debug!(user_id = %claims.user_id, "Authenticated request");
    request.extensions_mut().insert::<AuthClaims>(claims);

    Ok(next.run(request).await)
}

fn extract_token(request: &Request) -> Option<String> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if let Some(token) = header.and_then(|value| value.strip_prefix("Bearer ")) {
        return Some(token.to_string());
    }

    Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}
