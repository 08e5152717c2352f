//! Classifier - routes free text to a persona
//!
//! One model call with a fixed instructional prompt built from the registry.
//! Anything other than a registered persona name in the reply, and any call
//! failure, falls back to the registry's default persona.

use crate::model::ModelClient;
use crate::persona::PersonaRegistry;
use std::fmt::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Request-to-persona classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    registry: Arc<PersonaRegistry>,
    model: ModelClient,
}

impl Classifier {
    /// Create a classifier over `registry`
    #[must_use]
    pub fn new(registry: Arc<PersonaRegistry>, model: ModelClient) -> Self {
        Self { registry, model }
    }

    /// Pick a persona id for `request`; never fails
    pub async fn classify(&self, request: &str, cancel: &CancellationToken) -> String {
        let prompt = self.routing_prompt(request);
        let fallback = self.registry.default_persona().id().to_string();

        match self.model.invoke(&prompt, cancel).await {
            Ok(reply) => {
                let token = reply.trim().to_uppercase();
                match self.registry.resolve(&token) {
                    Some(persona) => {
                        info!(persona = %persona.id(), "Request classified");
                        persona.id().to_string()
                    }
                    None => {
                        warn!(reply = %token, fallback = %fallback, "Unrecognized persona in classifier reply");
                        fallback
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, fallback = %fallback, "Classifier call failed");
                fallback
            }
        }
    }

    /// Instructional prompt enumerating every persona with keywords and an example
    #[must_use]
    pub fn routing_prompt(&self, request: &str) -> String {
        let names: Vec<String> = self
            .registry
            .iter()
            .map(|p| p.id().to_uppercase())
            .collect();

        let mut prompt = String::new();
        prompt.push_str("Analyze this developer request and decide which specialist to route it to:\n\n");
        let _ = writeln!(prompt, "REQUEST: {}\n", request);

        prompt.push_str("SPECIALISTS:\n");
        for persona in self.registry.iter() {
            let _ = writeln!(
                prompt,
                "- {}: {}",
                persona.id().to_uppercase(),
                persona.routing.keywords.join(", ")
            );
        }

        let _ = writeln!(
            prompt,
            "\nRespond with ONLY the agent name: {}",
            join_with_or(&names)
        );

        let examples: Vec<_> = self
            .registry
            .iter()
            .filter_map(|p| p.routing.example.as_ref().map(|e| (e, p.id())))
            .collect();
        if !examples.is_empty() {
            prompt.push_str("\nExamples:\n");
            for (example, id) in examples {
                let _ = writeln!(prompt, "\"{}\" -> {}", example, id.to_uppercase());
            }
        }

        prompt
    }
}

fn join_with_or(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
    }
}
