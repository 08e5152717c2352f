//! Persona preset data structures

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Placeholder replaced by the error text in failure messages
const ERROR_PLACEHOLDER: &str = "{error}";

/// What a persona is allowed to do in the review loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaRole {
    /// Produces work that may be reviewed and revised
    Worker,
    /// Answers once; never reviewed
    Advisor,
    /// Judges worker output
    Reviewer,
}

impl PersonaRole {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Advisor => "advisor",
            Self::Reviewer => "reviewer",
        }
    }
}

/// Identity and catalog metadata (`[persona]` table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaInfo {
    /// Lowercase identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Display icon
    #[serde(default)]
    pub icon: String,
    /// Role in the review loop
    pub role: PersonaRole,
    /// One-line specialty
    #[serde(default)]
    pub specialty: String,
    /// Catalog description
    #[serde(default)]
    pub description: String,
    /// Expertise tags
    #[serde(default)]
    pub expertise: Vec<String>,
}

/// Hints for the classifier (`[routing]` table)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingHints {
    /// Topics that should route here
    #[serde(default)]
    pub keywords: Vec<String>,
    /// One example request that routes here
    #[serde(default)]
    pub example: Option<String>,
}

/// Prompt material (`[prompt]` table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaPrompt {
    /// Behavioral template placed first in every prompt
    pub template: String,
    /// Extra instructions appended after a fresh request
    #[serde(default)]
    pub task_instructions: Option<String>,
    /// Persona-specific line appended to revision prompts
    #[serde(default)]
    pub revision_instruction: Option<String>,
    /// Fail-soft reply; `{error}` is replaced by the error text
    pub failure: String,
}

/// Persona preset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Identity and catalog metadata
    #[serde(rename = "persona")]
    pub info: PersonaInfo,
    /// Classifier hints
    #[serde(default)]
    pub routing: RoutingHints,
    /// Prompt material
    pub prompt: PersonaPrompt,
}

impl Persona {
    /// Parse a preset from TOML text and validate it
    pub fn from_toml(content: &str) -> Result<Self> {
        let persona: Self = toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("invalid persona preset: {}", e)))?;
        persona.validate()?;
        Ok(persona)
    }

    /// Identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.info.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Role
    #[must_use]
    pub fn role(&self) -> PersonaRole {
        self.info.role
    }

    /// Whether this persona's output enters the review loop
    #[must_use]
    pub fn is_worker(&self) -> bool {
        self.info.role == PersonaRole::Worker
    }

    /// Render the fail-soft reply for `error`
    #[must_use]
    pub fn failure_message(&self, error: &str) -> String {
        if self.prompt.failure.contains(ERROR_PLACEHOLDER) {
            self.prompt.failure.replace(ERROR_PLACEHOLDER, error)
        } else {
            format!("{} {}", self.prompt.failure, error)
        }
    }

    fn validate(&self) -> Result<()> {
        let id = &self.info.id;
        if id.is_empty()
            || !id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(Error::Configuration(format!(
                "persona id must be lowercase ascii, got {:?}",
                id
            )));
        }
        if self.info.name.trim().is_empty() {
            return Err(Error::Configuration(format!("persona {} has no name", id)));
        }
        if self.prompt.template.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "persona {} has an empty prompt template",
                id
            )));
        }
        Ok(())
    }
}
