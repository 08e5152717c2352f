//! Health check endpoint

use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use coven_core::Orchestrator;
use serde::Serialize;
use std::sync::Arc;

/// Health response with the registered personas
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub personas: Vec<String>,
}

async fn health_check(Extension(orchestrator): Extension<Arc<Orchestrator>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: orchestrator.provider_name().to_string(),
        personas: orchestrator
            .registry()
            .iter()
            .map(|p| p.id().to_string())
            .collect(),
    })
}

/// Health routes
pub fn health_routes() -> Router {
    Router::new().route("/api/health", get(health_check))
}
