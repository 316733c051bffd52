//! Layer API Server
//!
//! Serves the territorial monitoring layer catalog: features, resolved
//! visual configuration and legend groups per layer.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Extension;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use layers_api::config::{FixtureSet, ServiceConfig};
use layers_api::routes;
use layers_api::state::AppState;

/// Layer API Server
#[derive(Parser, Debug)]
#[command(name = "layers-api")]
#[command(about = "Layer catalog and assembly server for territorial monitoring maps")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8084", env = "LAYERS_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "LAYERS_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// PostgreSQL connection URL; without it the service serves fixtures
    /// from the config directory
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum database connections
    #[arg(long, default_value = "10", env = "LAYERS_DB_MAX_CONNECTIONS")]
    max_connections: u32,

    /// Run schema migrations at startup
    #[arg(long, env = "LAYERS_MIGRATE")]
    migrate: bool,

    /// Directory holding service.yaml (and fixtures.yaml)
    #[arg(long, default_value = "config/layers", env = "LAYERS_CONFIG_DIR")]
    config_dir: String,
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .expect("Failed to create Tokio runtime");

    runtime.block_on(async move {
        if let Err(e) = run_server(args).await {
            tracing::error!("Server failed: {:#}", e);
            std::process::exit(1);
        }
    });
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting layer API server");

    let config = ServiceConfig::load_from_dir(&args.config_dir)?;

    // Initialize application state
    let state = match &args.database_url {
        Some(url) => AppState::connect(url, args.max_connections, args.migrate, config).await?,
        None => {
            info!("DATABASE_URL not set, serving fixtures from {}", args.config_dir);
            AppState::from_fixtures(FixtureSet::load_from_dir(&args.config_dir)?, config)
        }
    };

    let app = routes::router(Arc::new(state)).layer(Extension(prometheus_handle));

    // Parse listen address
    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Layer API listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
