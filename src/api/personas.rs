//! Persona catalog endpoints

use std::sync::Arc;

use axum::{
    extract::Path, http::StatusCode, response::IntoResponse, routing::get, Extension, Json, Router,
};
use coven_core::{Orchestrator, Persona, PersonaRole};
use serde::Serialize;

use super::ApiResponse;

/// Persona entry as shown to clients
#[derive(Debug, Serialize)]
pub struct PersonaSummary {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub role: PersonaRole,
    pub specialty: String,
    pub description: String,
    pub expertise: Vec<String>,
    pub is_default: bool,
}

impl PersonaSummary {
    fn from_persona(persona: &Persona, default_id: &str) -> Self {
        Self {
            id: persona.id().to_string(),
            name: persona.name().to_string(),
            icon: persona.info.icon.clone(),
            role: persona.role(),
            specialty: persona.info.specialty.clone(),
            description: persona.info.description.clone(),
            expertise: persona.info.expertise.clone(),
            is_default: persona.id() == default_id,
        }
    }
}

async fn list_personas(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
) -> Json<ApiResponse<Vec<PersonaSummary>>> {
    let registry = orchestrator.registry();
    let default_id = registry.default_persona().id();
    ApiResponse::ok(
        registry
            .iter()
            .map(|p| PersonaSummary::from_persona(p, default_id))
            .collect(),
    )
}

async fn get_persona(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let registry = orchestrator.registry();
    match registry.get(&id.to_lowercase()) {
        Some(persona) => {
            let summary = PersonaSummary::from_persona(persona, registry.default_persona().id());
            ApiResponse::ok(summary).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "error": format!("Persona '{}' not found", id)
            })),
        )
            .into_response(),
    }
}

/// Persona routes
pub fn personas_routes() -> Router {
    Router::new()
        .route("/api/personas", get(list_personas))
        .route("/api/personas/:id", get(get_persona))
}
