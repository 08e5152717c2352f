//! Persona TOML Loader
//!
//! Loads override presets from a directory such as `config/personas/`.

use super::Persona;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Persona TOML Loader
#[derive(Debug)]
pub struct PersonaLoader {
    config_dir: PathBuf,
}

impl PersonaLoader {
    /// Create loader for `path`
    #[must_use]
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Return configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load all presets, sorted by id
    ///
    /// A missing directory yields an empty list. Files that fail to parse
    /// are warned about and skipped.
    pub fn load_all(&self) -> Result<Vec<Persona>> {
        let mut personas = Vec::new();

        if !self.config_dir.exists() {
            warn!(dir = ?self.config_dir, "Persona directory not found");
            return Ok(personas);
        }

        let entries = std::fs::read_dir(&self.config_dir).map_err(|e| {
            Error::Configuration(format!(
                "Failed to read persona directory {:?}: {}",
                self.config_dir, e
            ))
        })?;

        for entry in entries.flatten() {
            let path = entry.path();

            if !Self::is_toml_file(&path) {
                continue;
            }

            match Self::load_file(&path) {
                Ok(persona) => {
                    info!(persona = %persona.id(), role = persona.role().as_str(), "Loaded persona");
                    personas.push(persona);
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "Failed to load persona");
                }
            }
        }

        personas.sort_by(|a, b| a.id().cmp(b.id()));

        debug!(
            count = personas.len(),
            dir = ?self.config_dir,
            "Loaded persona overrides"
        );
        Ok(personas)
    }

    fn load_file(path: &Path) -> Result<Persona> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("Failed to read {:?}: {}", path, e)))?;

        Persona::from_toml(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse {:?}: {}", path, e)))
    }

    fn is_toml_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "toml")
    }
}
