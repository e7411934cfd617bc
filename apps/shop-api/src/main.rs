//! # Cruffs Shop API
//!
//! HTTP backend for the freeze-dried candy storefront.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          shop-api Process                               │
//! │                                                                         │
//! │  Storefront ──► HTTP (8787) ──► handlers ──► managed PostgreSQL        │
//! │                                    │         (place_order,             │
//! │                                    │          admin_release_stock)     │
//! │                                    ▼                                    │
//! │                              email relay                                │
//! │                            (fire-and-forget)                            │
//! │                                                                         │
//! │  stock feed task: LISTEN stock_changed ──► refetch ──► in-proc cache   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cruffs_notify::Notifier;
use cruffs_store::{run_stock_feed, StockCache, Store, StoreConfig};

use crate::config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Cruffs Shop API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        db_url = %config.database_url.chars().take(30).collect::<String>(),
        relay = %config.relay_base_url,
        "Configuration loaded"
    );

    // Connect to the managed store
    let store = Store::connect(&StoreConfig::new(&config.database_url)).await?;
    info!("Connected to PostgreSQL");

    // Stock cache + change feed task
    let cache = StockCache::new();
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let feed = tokio::spawn(run_stock_feed(
        cache.clone(),
        Arc::new(store.stock()),
        store.pool().clone(),
        shutdown_rx,
    ));

    // Email relay queue
    let (notifier, notify_worker) = Notifier::spawn(config.relay_base_url.clone());

    // Shared application state
    let state = AppState::new(
        &config,
        cache,
        Arc::new(store.gateway()),
        store.orders(),
        store.stock(),
        notifier,
    );

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin.parse()?))
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    };

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the feed task, then let the notification queue drain. The last
    // Notifier handle died with the router, so the worker exits once empty.
    let _ = shutdown_tx.send(true);
    let _ = feed.await;
    let _ = notify_worker.await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
