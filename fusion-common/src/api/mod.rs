//! API module for shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY pure functions and shared types with no HTTP
//! framework dependencies. The service crate wraps these with axum
//! extractors and middleware.

pub mod auth;
pub mod types;

pub use auth::{
    issue_token, sign_claims, verify_token, verify_token_at, AuthClaims, TokenError, TOKEN_ISSUER,
};
pub use types::{ApiResponse, PaginationInfo};
