//! fusion-api - Character / planet / weather fusion service
//!
//! Startup order: tracing, build identification, configuration, database,
//! upstream clients, fusion engine, HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fusion_common::config::{ConfigOverrides, ServiceConfig};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use fusion_api::db::{self, SqliteStore};
use fusion_api::services::{FusionEngine, SwapiClient, WeatherClient};
use fusion_api::{build_router, AppState};

/// Command-line arguments for fusion-api
#[derive(Parser, Debug)]
#[command(name = "fusion-api")]
#[command(about = "Star Wars character, planet and weather fusion service")]
#[command(version)]
struct Args {
    /// Address to listen on (host:port)
    #[arg(long, env = "FUSION_BIND")]
    bind: Option<String>,

    /// SQLite database file
    #[arg(long, env = "FUSION_DATABASE")]
    database: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, env = "FUSION_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a signed bearer token and exit
    IssueToken {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        email: Option<String>,

        /// Token lifetime (defaults to the configured token TTL)
        #[arg(long)]
        hours: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins; otherwise the configured level is applied once loaded
    let rust_log = EnvFilter::try_from_default_env().ok();
    let has_rust_log = rust_log.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(rust_log.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting fusion-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let overrides = ConfigOverrides {
        bind: args.bind,
        database_path: args.database,
    };
    let config = ServiceConfig::load(args.config.as_deref(), overrides)
        .context("Failed to load configuration")?;

    if !has_rust_log {
        filter_handle
            .reload(EnvFilter::new(&config.log_level))
            .context("Failed to apply configured log level")?;
    }

    if let Some(Command::IssueToken {
        user_id,
        email,
        hours,
    }) = args.command
    {
        let hours = hours.unwrap_or(config.token_ttl_hours);
        let token = fusion_common::api::issue_token(
            &config.jwt_secret,
            &user_id,
            email.as_deref(),
            chrono::Duration::hours(hours),
        )
        .context("Failed to sign token")?;
        println!("{}", token);
        return Ok(());
    }

    info!("Database path: {}", config.database_path.display());
    let pool = match db::init_database_pool(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };
    let store = Arc::new(SqliteStore::new(pool));

    info!(
        swapi = %config.swapi_base_url,
        weather = %config.weather_base_url,
        timeout_secs = config.http_timeout.as_secs(),
        "Configuring upstream clients"
    );
    let swapi = SwapiClient::new(&config.swapi_base_url, config.http_timeout)
        .context("Failed to build SWAPI client")?;
    let weather = WeatherClient::new(
        &config.weather_base_url,
        &config.weather_api_key,
        config.http_timeout,
    )
    .context("Failed to build weather client")?;

    let engine = Arc::new(FusionEngine::new(
        Arc::new(swapi),
        Arc::new(weather),
        store.clone(),
        config.cache_ttl_minutes,
    ));

    let state = AppState::new(
        engine,
        store,
        config.jwt_secret.as_str(),
        config.token_ttl_hours,
        config.enable_token_endpoint,
    );
    if config.enable_token_endpoint {
        info!("Token endpoint enabled: POST /auth/token");
    }
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;
    info!("fusion-api listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
