//! Learning metrics endpoint

use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use coven_core::{Orchestrator, PersonaMetricsSummary};

use super::ApiResponse;

async fn list_metrics(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
) -> Json<ApiResponse<Vec<PersonaMetricsSummary>>> {
    // Memory files are small and read whole
    let metrics = tokio::task::spawn_blocking(move || orchestrator.metrics())
        .await
        .unwrap_or_default();
    ApiResponse::ok(metrics)
}

/// Metrics routes
pub fn metrics_routes() -> Router {
    Router::new().route("/api/metrics", get(list_metrics))
}
