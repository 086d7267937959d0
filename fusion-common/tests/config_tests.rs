//! Configuration loading against real files and the process environment
//!
//! Tests that manipulate environment variables are marked #[serial] so they
//! never race each other.

use fusion_common::config::{
    read_toml_config, ConfigOverrides, ServiceConfig, ENV_JWT_SECRET, ENV_SWAPI_BASE_URL,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp config");
    file
}

#[test]
fn test_missing_file_is_not_an_error() {
    let result = read_toml_config(&PathBuf::from("/nonexistent/fusion-api.toml"));
    assert!(matches!(result, Ok(None)));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let file = write_config("bind = [this is not toml");
    let result = read_toml_config(file.path());
    assert!(matches!(result, Err(fusion_common::Error::Config(_))));
}

#[test]
#[serial]
fn test_load_reads_file_and_environment() {
    let file = write_config(
        r#"
        database_path = "/tmp/from-file.db"
        swapi_base_url = "http://file.swapi"
        jwt_secret = "file-secret"
        "#,
    );

    env::set_var(ENV_SWAPI_BASE_URL, "http://env.swapi");
    env::remove_var(ENV_JWT_SECRET);

    let config = ServiceConfig::load(Some(file.path()), ConfigOverrides::default())
        .expect("config should load");

    env::remove_var(ENV_SWAPI_BASE_URL);

    assert_eq!(config.database_path, PathBuf::from("/tmp/from-file.db"));
    assert_eq!(config.swapi_base_url, "http://env.swapi");
    assert_eq!(config.jwt_secret, "file-secret");
}

#[test]
#[serial]
fn test_load_without_file_uses_defaults() {
    env::remove_var(ENV_SWAPI_BASE_URL);
    env::remove_var(ENV_JWT_SECRET);

    let overrides = ConfigOverrides {
        bind: Some("127.0.0.1:6000".to_string()),
        database_path: None,
    };
    let config = ServiceConfig::load(Some(&PathBuf::from("/nonexistent/fusion.toml")), overrides)
        .expect("missing config file should fall back to defaults");

    assert_eq!(config.bind, "127.0.0.1:6000");
    assert_eq!(config.swapi_base_url, fusion_common::config::DEFAULT_SWAPI_BASE_URL);
    assert_eq!(config.jwt_secret, fusion_common::config::DEV_JWT_SECRET);
}
