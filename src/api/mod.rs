//! Web API module for Coven
//!
//! Provides REST API endpoints for:
//! - Health and registered personas
//! - Persona catalog
//! - Learning metrics

pub mod health;
pub mod metrics;
pub mod personas;

use axum::Json;
use axum::Router;
use serde::Serialize;

pub use health::health_routes;
pub use metrics::metrics_routes;
pub use personas::personas_routes;

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new()
        .merge(health_routes())
        .merge(personas_routes())
        .merge(metrics_routes())
}

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub(crate) fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}
