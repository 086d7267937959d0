//! Configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the service logs a warning and
//! starts with defaults. A TOML file that exists but does not parse is a
//! configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BIND: &str = "127.0.0.1:5780";
pub const DEFAULT_SWAPI_BASE_URL: &str = "https://swapi.py4e.com/api";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_CACHE_TTL_MINUTES: i64 = 30;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Development signing secret used when none is configured
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Environment variable names
pub const ENV_SWAPI_BASE_URL: &str = "SWAPI_BASE_URL";
pub const ENV_WEATHER_BASE_URL: &str = "WEATHER_BASE_URL";
pub const ENV_WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";

/// Contents of `fusion-api.toml`
///
/// Every field is optional; absent fields fall through to environment and
/// compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub bind: Option<String>,
    pub database_path: Option<PathBuf>,
    pub swapi_base_url: Option<String>,
    pub weather_base_url: Option<String>,
    pub weather_api_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: Option<i64>,
    pub cache_ttl_minutes: Option<i64>,
    pub http_timeout_secs: Option<u64>,
    pub enable_token_endpoint: Option<bool>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Command-line overrides (already merged with their env fallbacks by clap)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub database_path: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: String,
    pub database_path: PathBuf,
    pub swapi_base_url: String,
    pub weather_base_url: String,
    pub weather_api_key: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub cache_ttl_minutes: i64,
    pub http_timeout: Duration,
    pub enable_token_endpoint: bool,
    pub log_level: String,
}

impl ServiceConfig {
    /// Compiled defaults for the current platform
    pub fn compiled_defaults() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            database_path: default_database_path(),
            swapi_base_url: DEFAULT_SWAPI_BASE_URL.to_string(),
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            weather_api_key: String::new(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            cache_ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            enable_token_endpoint: false,
            log_level: default_log_level(),
        }
    }

    /// Load configuration from `config_path` (or the default location),
    /// the process environment and `overrides`
    pub fn load(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);
        let toml_config = read_toml_config(&path)?;

        let config = Self::resolve(overrides, toml_config, |key| std::env::var(key).ok());

        if config.jwt_secret == DEV_JWT_SECRET {
            warn!("No JWT secret configured; using the development secret");
        }
        if config.weather_api_key.is_empty() {
            warn!("No weather API key configured; weather lookups will be rejected upstream");
        }

        Ok(config)
    }

    /// Merge the four configuration tiers
    ///
    /// `env` looks up an environment variable by name.
    pub fn resolve<F>(overrides: ConfigOverrides, toml_config: Option<TomlConfig>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::compiled_defaults();
        let toml_config = toml_config.unwrap_or_default();
        let env_non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        Self {
            bind: overrides
                .bind
                .or(toml_config.bind)
                .unwrap_or(defaults.bind),
            database_path: overrides
                .database_path
                .or(toml_config.database_path)
                .unwrap_or(defaults.database_path),
            swapi_base_url: env_non_empty(ENV_SWAPI_BASE_URL)
                .or(toml_config.swapi_base_url)
                .unwrap_or(defaults.swapi_base_url),
            weather_base_url: env_non_empty(ENV_WEATHER_BASE_URL)
                .or(toml_config.weather_base_url)
                .unwrap_or(defaults.weather_base_url),
            weather_api_key: env_non_empty(ENV_WEATHER_API_KEY)
                .or(toml_config.weather_api_key)
                .unwrap_or(defaults.weather_api_key),
            jwt_secret: env_non_empty(ENV_JWT_SECRET)
                .or(toml_config.jwt_secret.filter(|s| !s.is_empty()))
                .unwrap_or(defaults.jwt_secret),
            token_ttl_hours: toml_config
                .token_ttl_hours
                .filter(|h| *h > 0)
                .unwrap_or(defaults.token_ttl_hours),
            cache_ttl_minutes: toml_config
                .cache_ttl_minutes
                .filter(|m| *m > 0)
                .unwrap_or(defaults.cache_ttl_minutes),
            http_timeout: toml_config
                .http_timeout_secs
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            enable_token_endpoint: toml_config
                .enable_token_endpoint
                .unwrap_or(defaults.enable_token_endpoint),
            log_level: toml_config.logging.level,
        }
    }
}

/// Read and parse a TOML config file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        warn!(
            "Config file not found: {} (using environment and defaults)",
            path.display()
        );
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))?;

    info!("Loaded TOML configuration from {}", path.display());
    Ok(Some(config))
}

/// Default configuration file path: `<config dir>/fusion/fusion-api.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("fusion").join("fusion-api.toml"))
        .unwrap_or_else(|| PathBuf::from("fusion-api.toml"))
}

/// Default database path: `<local data dir>/fusion/fusion.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fusion").join("fusion.db"))
        .unwrap_or_else(|| PathBuf::from("./fusion_data/fusion.db"))
}
