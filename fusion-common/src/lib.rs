//! # Fusion Common Library
//!
//! Shared code for the fusion service crates:
//! - Error and result types
//! - Configuration loading (CLI → ENV → TOML → defaults)
//! - API response envelope and bearer-token authentication
//! - Time and retry utilities

pub mod api;
pub mod config;
pub mod error;
pub mod retry;
pub mod time;

pub use error::{Error, Result};
