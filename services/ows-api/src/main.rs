//! OWS API Server
//!
//! OGC Web Service gateway serving WCS coverage descriptions and OpenSearch
//! result feeds.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use ows_api::config::OwsConfig;
use ows_api::routes;
use ows_api::state::AppState;

/// OWS API Server
#[derive(Parser, Debug)]
#[command(name = "ows-api")]
#[command(about = "OGC Web Service gateway for WCS and OpenSearch")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "OWS_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "OWS_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Service configuration file
    #[arg(short, long, default_value = "config/ows.yaml", env = "OWS_CONFIG")]
    config: String,

    /// Public base URL for links (e.g. https://maps.example.com). Set this
    /// behind a proxy; otherwise links follow the request Host header.
    #[arg(long, env = "OWS_BASE_URL")]
    base_url: Option<String>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;
    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting OWS API server");

    let config = OwsConfig::load_from_file(&args.config)?;
    let state = Arc::new(AppState::new(&config, args.base_url.clone())?);
    info!(
        capabilities = state.dispatcher.registry().len(),
        coverages = state.catalog.len(),
        "Application state initialized"
    );

    let app = routes::router(state, prometheus_handle);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;
    info!("OWS API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
