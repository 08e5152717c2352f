//! Server initialization and main run loop

use super::builder::build_orchestrator;
use super::loader::load_config;
use super::shutdown::wait_for_shutdown_signal;
use anyhow::{Context, Result};
use axum::{routing::get, Extension, Router};
use coven_core::Orchestrator;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Assemble every route around a shared orchestrator
pub fn app(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .merge(crate::api::api_router())
        .merge(crate::websocket::websocket_router())
        .route("/", get(|| async { "Coven persona router" }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(Extension(orchestrator)),
        )
}

/// Run the server
pub async fn run() -> Result<()> {
    info!("Starting Coven v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("Failed to load configuration")?;
    info!("Configuration loaded");

    let orchestrator = build_orchestrator(&config, false)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);
    info!("WebSocket chat at ws://{}/ws/chat", addr);

    axum::serve(listener, app(orchestrator))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Coven shutdown complete");
    Ok(())
}
