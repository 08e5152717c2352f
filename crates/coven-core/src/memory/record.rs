//! Persona memory record

use crate::session::Verdict;
use chrono::{DateTime, Utc};
use coven_llm::util::truncate_chars;
use serde::{Deserialize, Serialize};

use super::category::categorize_request;

/// Max characters of the request kept in patterns and learnings
pub const REQUEST_SNIPPET_CHARS: usize = 200;

/// Max characters of response or feedback text kept
pub const RESPONSE_SNIPPET_CHARS: usize = 500;

/// List caps; the oldest entries are evicted first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLimits {
    /// Max successful patterns kept
    pub max_patterns: usize,
    /// Max feedback learnings kept
    pub max_learnings: usize,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            max_patterns: 50,
            max_learnings: 30,
        }
    }
}

/// An approved interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessfulPattern {
    /// Request category at record time
    pub category: String,
    /// Request prefix
    pub request_snippet: String,
    /// Response prefix
    pub response_snippet: String,
    /// When it was recorded
    pub timestamp: DateTime<Utc>,
    /// Rating (5.0 when none was supplied)
    pub rating: f64,
}

/// Reviewer feedback on work that was not approved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackLearning {
    /// Request prefix
    pub request_snippet: String,
    /// Feedback prefix
    pub feedback_snippet: String,
    /// `needs_work` or `rejected`
    pub verdict: Verdict,
    /// When it was recorded
    pub timestamp: DateTime<Utc>,
}

/// Running metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Fraction of interactions approved, in `[0, 1]`
    pub approval_rate: f64,
    /// Mean rating
    pub average_rating: f64,
}

/// One finished session, as seen by the memory
#[derive(Debug, Clone, Copy)]
pub struct Interaction<'a> {
    /// Original request
    pub request: &'a str,
    /// Final persona response
    pub response: &'a str,
    /// Final verdict, if the work was reviewed or implicitly approved
    pub verdict: Option<Verdict>,
    /// Reviewer feedback
    pub feedback: Option<&'a str>,
    /// Rating
    pub rating: Option<f64>,
}

/// Everything a persona has learned so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaMemory {
    /// Persona id
    pub persona: String,
    /// Interactions ever recorded
    pub total_interactions: u64,
    /// Approved interactions, oldest first
    #[serde(default)]
    pub successful_patterns: Vec<SuccessfulPattern>,
    /// Rejected or revised interactions, oldest first
    #[serde(default)]
    pub feedback_learnings: Vec<FeedbackLearning>,
    /// Running metrics
    #[serde(default)]
    pub metrics: PerformanceMetrics,
    /// Last mutation
    pub last_updated: DateTime<Utc>,
}

impl PersonaMemory {
    /// Empty record
    #[must_use]
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            total_interactions: 0,
            successful_patterns: Vec::new(),
            feedback_learnings: Vec::new(),
            metrics: PerformanceMetrics::default(),
            last_updated: Utc::now(),
        }
    }

    /// Fold one interaction into the record
    pub fn record(&mut self, interaction: &Interaction<'_>, limits: &MemoryLimits) {
        let now = Utc::now();
        self.total_interactions += 1;

        if interaction.verdict == Some(Verdict::Approved) {
            self.successful_patterns.push(SuccessfulPattern {
                category: categorize_request(interaction.request).to_string(),
                request_snippet: snippet(interaction.request, REQUEST_SNIPPET_CHARS),
                response_snippet: snippet(interaction.response, RESPONSE_SNIPPET_CHARS),
                timestamp: now,
                rating: interaction.rating.unwrap_or(5.0),
            });
            evict_oldest(&mut self.successful_patterns, limits.max_patterns);
        }

        if let (Some(verdict @ (Verdict::NeedsWork | Verdict::Rejected)), Some(feedback)) =
            (interaction.verdict, interaction.feedback.filter(|f| !f.is_empty()))
        {
            self.feedback_learnings.push(FeedbackLearning {
                request_snippet: snippet(interaction.request, REQUEST_SNIPPET_CHARS),
                feedback_snippet: snippet(feedback, RESPONSE_SNIPPET_CHARS),
                verdict,
                timestamp: now,
            });
            evict_oldest(&mut self.feedback_learnings, limits.max_learnings);
        }

        self.update_metrics(interaction.verdict, interaction.rating);
        self.last_updated = now;
    }

    // Both running means divide by the total interaction count, so
    // interactions recorded without a rating still dilute `average_rating`.
    // Stored records depend on this arithmetic; do not "fix" it in place.
    fn update_metrics(&mut self, verdict: Option<Verdict>, rating: Option<f64>) {
        let n = self.total_interactions as f64;

        if let Some(verdict) = verdict {
            let approved = if verdict == Verdict::Approved { 1.0 } else { 0.0 };
            self.metrics.approval_rate = (self.metrics.approval_rate * (n - 1.0) + approved) / n;
        }

        if let Some(rating) = rating {
            self.metrics.average_rating = (self.metrics.average_rating * (n - 1.0) + rating) / n;
        }
    }
}

fn snippet(text: &str, max_chars: usize) -> String {
    truncate_chars(text, max_chars).to_string()
}

fn evict_oldest<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(..excess);
    }
}
