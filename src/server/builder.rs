//! Orchestrator builder shared by the server and the CLI

use super::config::AppConfig;
use super::providers::resolve_llm_provider;
use anyhow::{Context, Result};
use coven_core::{
    InMemoryBackend, JsonFileBackend, MemoryBackend, MemoryLimits, ModelClient, Orchestrator,
    OrchestratorConfig, PersonaMemoryStore, PersonaRegistry,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Build the orchestrator from configuration
///
/// `ephemeral` keeps memory in-process instead of on disk.
pub fn build_orchestrator(config: &AppConfig, ephemeral: bool) -> Result<Arc<Orchestrator>> {
    let personas_dir = config.personas.dir.as_ref().map(PathBuf::from);
    let registry = PersonaRegistry::with_overrides(
        personas_dir.as_deref(),
        &config.orchestrator.default_persona,
    )
    .context("Failed to load personas")?;
    info!(count = registry.len(), "Personas loaded");

    let provider = resolve_llm_provider(&config.llm, registry.default_persona().id())?;
    let mut model = ModelClient::new(provider)
        .with_max_tokens(config.llm.max_tokens)
        .with_temperature(config.llm.temperature)
        .with_timeout(config.llm.timeout());
    if let Some(name) = &config.llm.model {
        model = model.with_model(name.clone());
    }
    info!(provider = %model.provider_name(), "LLM provider initialized");

    let memory = PersonaMemoryStore::new(memory_backend(config, ephemeral)).with_limits(MemoryLimits {
        max_patterns: config.memory.max_patterns,
        max_learnings: config.memory.max_learnings,
    });

    let orchestrator = Orchestrator::new(Arc::new(registry), model, memory).with_config(
        OrchestratorConfig::new()
            .with_max_iterations(config.orchestrator.max_iterations)
            .with_review_by_default(config.orchestrator.review_mode),
    );

    Ok(Arc::new(orchestrator))
}

fn memory_backend(config: &AppConfig, ephemeral: bool) -> Arc<dyn MemoryBackend> {
    if ephemeral {
        info!("Memory store: in-process (ephemeral)");
        return Arc::new(InMemoryBackend::new());
    }

    let backend = match config.memory.dir() {
        Some(dir) => JsonFileBackend::with_path(dir),
        None => JsonFileBackend::new(),
    };
    info!("Memory directory: {}", backend.data_dir().display());
    Arc::new(backend)
}
