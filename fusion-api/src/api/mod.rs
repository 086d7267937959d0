//! HTTP API handlers

pub mod auth;
pub mod custom;
pub mod fusion;
pub mod health;
pub mod history;
pub mod token;

pub use auth::auth_middleware;
pub use custom::store_custom_record;
pub use fusion::get_fused_record;
pub use health::health_routes;
pub use history::get_history;
pub use token::{issue_token, verify_caller};
