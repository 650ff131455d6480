//! Application entry point. Initializes tracing, loads configuration from
//! the environment, wires the readiness controller and shared-state client
//! into the Axum router, and starts the HTTP server with graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kubeling::config::{AppConfig, DEFAULT_LOG_FILTER};
use kubeling::http::start_server;
use kubeling::readiness::ReadinessController;
use kubeling::routes::create_router;
use kubeling::state::AppState;
use kubeling::store::{RedisStore, SharedState};

/// kubeling: a minimal HTTP service for Kubernetes orchestration demos
#[derive(Parser, Debug)]
#[command(name = "kubeling", version, about)]
struct Args {
    /// Listen host (overrides HTTP_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides HTTP_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level filter (e.g., "kubeling=debug")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.http.host = host;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }

    // Log filter priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        app = %config.app_name,
        instance = %config.instance,
        "loaded configuration"
    );
    tracing::info!(
        host = %config.store.host,
        port = config.store.port,
        has_password = config.store.password.is_some(),
        "store configured"
    );

    // The store connects lazily; an unreachable store degrades the
    // store-dependent endpoints without blocking startup.
    let store = RedisStore::new(&config.store)?;
    let shared = SharedState::new(
        Arc::new(store),
        config.instance.clone(),
        Duration::from_secs(config.session_ttl_seconds),
    );

    let state = AppState::new(config.clone(), ReadinessController::new(), shared);
    let app = create_router(state);

    start_server(app, &config).await?;

    Ok(())
}
