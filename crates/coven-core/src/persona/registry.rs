//! Immutable persona registry

use super::{Persona, PersonaLoader, PersonaRole};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Fullstack generalist used when classification fails
pub const DEFAULT_PERSONA: &str = "freddy";

/// Presets compiled into the binary, in catalog order
const BUILTIN_PRESETS: &[&str] = &[
    include_str!("../../../../config/personas/annabelle.toml"),
    include_str!("../../../../config/personas/chucky.toml"),
    include_str!("../../../../config/personas/freddy.toml"),
    include_str!("../../../../config/personas/jason.toml"),
    include_str!("../../../../config/personas/pennywise.toml"),
    include_str!("../../../../config/personas/ghostface.toml"),
    include_str!("../../../../config/personas/valak.toml"),
    include_str!("../../../../config/personas/pinhead.toml"),
];

/// Read-only mapping from persona id to preset
///
/// Built once at startup and shared behind an `Arc`; there is no mutation API.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
    index: HashMap<String, usize>,
    default_persona: String,
}

impl PersonaRegistry {
    /// Build a registry from presets
    ///
    /// # Errors
    /// - Duplicate ids
    /// - `default_persona` missing or not a worker
    pub fn new(personas: Vec<Persona>, default_persona: &str) -> Result<Self> {
        let mut index = HashMap::with_capacity(personas.len());
        for (i, persona) in personas.iter().enumerate() {
            if index.insert(persona.id().to_string(), i).is_some() {
                return Err(Error::Configuration(format!(
                    "duplicate persona id: {}",
                    persona.id()
                )));
            }
        }

        let default_persona = default_persona.trim().to_lowercase();
        match index.get(&default_persona).map(|&i| &personas[i]) {
            Some(p) if p.is_worker() => {}
            Some(_) => {
                return Err(Error::Configuration(format!(
                    "default persona {} must be a worker",
                    default_persona
                )))
            }
            None => return Err(Error::UnknownPersona(default_persona)),
        }

        Ok(Self {
            personas,
            index,
            default_persona,
        })
    }

    /// The compiled-in presets with `freddy` as default
    pub fn builtin() -> Result<Self> {
        Self::new(Self::builtin_presets()?, DEFAULT_PERSONA)
    }

    /// Compiled-in presets, replaced or extended by any presets found in `dir`
    pub fn with_overrides(dir: Option<&Path>, default_persona: &str) -> Result<Self> {
        let mut personas = Self::builtin_presets()?;

        if let Some(dir) = dir {
            for persona in PersonaLoader::with_path(dir).load_all()? {
                match personas.iter_mut().find(|p| p.id() == persona.id()) {
                    Some(slot) => {
                        info!(persona = %persona.id(), "Persona preset overridden");
                        *slot = persona;
                    }
                    None => personas.push(persona),
                }
            }
        }

        Self::new(personas, default_persona)
    }

    fn builtin_presets() -> Result<Vec<Persona>> {
        BUILTIN_PRESETS.iter().map(|src| Persona::from_toml(src)).collect()
    }

    /// Look up a persona by exact id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.index.get(id).map(|&i| &self.personas[i])
    }

    /// Normalize a free-form token (`" Freddy\n"`) to a registered id
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<&Persona> {
        let normalized = token.trim().trim_matches(|c| c == '"' || c == '.').to_lowercase();
        let found = self.get(&normalized);
        if found.is_none() && !normalized.is_empty() {
            warn!(token = %token.trim(), "Token does not name a registered persona");
        }
        found
    }

    /// Persona used when classification fails
    #[must_use]
    pub fn default_persona(&self) -> &Persona {
        // Checked in `new`
        &self.personas[self.index[&self.default_persona]]
    }

    /// First registered reviewer, if any
    #[must_use]
    pub fn reviewer(&self) -> Option<&Persona> {
        self.personas
            .iter()
            .find(|p| p.role() == PersonaRole::Reviewer)
    }

    /// All personas in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    /// Number of registered personas
    #[must_use]
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Whether the registry is empty (never true for a constructed registry)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}
