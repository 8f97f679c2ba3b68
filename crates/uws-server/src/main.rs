//! UWS Server
//!
//! An async Rust server implementing the IVOA Universal Worker Service
//! pattern for managing asynchronous execution of jobs on a service.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uws_server::{
    config::AppConfig, routes::build_router, service::UwsService, state::AppState,
    store::MemoryStore, worker::NoopWorker,
};

/// Initialize tracing/logging.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,uws_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting UWS server");

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    tracing::info!(
        host = %config.host,
        port = config.port,
        max_wait_time = config.max_wait_time,
        default_expiry = config.default_expiry,
        "Configuration loaded"
    );

    let store = Arc::new(MemoryStore::new(config.default_expiry, config.max_expiry));
    let worker = Arc::new(NoopWorker);
    let service = UwsService::new(store, worker, &config);

    let addr: SocketAddr = config.bind_address().parse()?;
    let state = AppState::new(service, config);
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
