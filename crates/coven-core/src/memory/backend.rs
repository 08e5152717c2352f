//! Persistence backends for persona memory

use super::record::PersonaMemory;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Default memory directory, relative to the home directory
const DEFAULT_MEMORY_DIR: &str = ".coven/memory";

/// Whole-document storage of persona memory records
#[cfg_attr(test, mockall::automock)]
pub trait MemoryBackend: Send + Sync {
    /// Load the record for `persona`, `None` if it was never saved
    fn load(&self, persona: &str) -> Result<Option<PersonaMemory>>;

    /// Replace the stored record
    fn save(&self, memory: &PersonaMemory) -> Result<()>;
}

/// One pretty-printed JSON file per persona: `{persona}_memory.json`
#[derive(Debug)]
pub struct JsonFileBackend {
    data_dir: PathBuf,
}

impl JsonFileBackend {
    /// Create backend with default path (`~/.coven/memory/`)
    #[must_use]
    pub fn new() -> Self {
        let data_dir = dirs::home_dir()
            .map(|h| h.join(DEFAULT_MEMORY_DIR))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEMORY_DIR));

        Self { data_dir }
    }

    /// Create backend with custom path
    #[must_use]
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            data_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Return data directory path
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, persona: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}_memory.json", persona.to_lowercase()))
    }
}

impl Default for JsonFileBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend for JsonFileBackend {
    fn load(&self, persona: &str) -> Result<Option<PersonaMemory>> {
        let path = self.path_for(persona);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Persistence(format!("Failed to read {:?}: {}", path, e)))?;

        let memory = serde_json::from_str(&content)
            .map_err(|e| Error::Persistence(format!("Failed to parse {:?}: {}", path, e)))?;

        debug!(persona = %persona, "Memory loaded");
        Ok(Some(memory))
    }

    fn save(&self, memory: &PersonaMemory) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| {
            Error::Persistence(format!(
                "Failed to create memory directory {:?}: {}",
                self.data_dir, e
            ))
        })?;

        let path = self.path_for(&memory.persona);
        let content = serde_json::to_string_pretty(memory)
            .map_err(|e| Error::Persistence(format!("Failed to serialize memory: {}", e)))?;

        std::fs::write(&path, content)
            .map_err(|e| Error::Persistence(format!("Failed to write {:?}: {}", path, e)))?;

        info!(
            persona = %memory.persona,
            total = memory.total_interactions,
            path = ?path,
            "Memory saved"
        );
        Ok(())
    }
}

/// Process-local backend for tests and `--ephemeral` runs
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    records: Mutex<HashMap<String, PersonaMemory>>,
}

impl InMemoryBackend {
    /// Empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryBackend for InMemoryBackend {
    fn load(&self, persona: &str) -> Result<Option<PersonaMemory>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(persona)
            .cloned())
    }

    fn save(&self, memory: &PersonaMemory) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(memory.persona.clone(), memory.clone());
        Ok(())
    }
}
