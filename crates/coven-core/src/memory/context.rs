//! Learning context rendering

use super::category::categorize_request;
use super::record::PersonaMemory;
use std::fmt::Write;

/// Most recent same-category successes shown
const MAX_SUCCESSES: usize = 3;
/// Most recent feedback learnings shown
const MAX_MISTAKES: usize = 5;

/// Render `memory` as a block to prepend to a prompt about `request`
///
/// Returns an empty string iff the persona has no recorded interactions.
#[must_use]
pub fn format_learning_context(memory: &PersonaMemory, request: &str) -> String {
    if memory.total_interactions == 0 {
        return String::new();
    }

    let category = categorize_request(request);
    let successes: Vec<_> = memory
        .successful_patterns
        .iter()
        .filter(|p| p.category == category)
        .collect();
    let successes = &successes[successes.len().saturating_sub(MAX_SUCCESSES)..];
    let mistakes = &memory.feedback_learnings
        [memory.feedback_learnings.len().saturating_sub(MAX_MISTAKES)..];

    let mut out = String::new();

    if !successes.is_empty() {
        out.push_str("🧠 PAST SUCCESSES (Learn from these):\n");
        for (i, pattern) in successes.iter().enumerate() {
            let _ = writeln!(out, "{}. Request: {}", i + 1, pattern.request_snippet);
            let _ = writeln!(out, "   Successful approach: {}", pattern.response_snippet);
        }
    }

    if !mistakes.is_empty() {
        out.push_str("\n⚠️ PAST MISTAKES (Avoid these):\n");
        for (i, learning) in mistakes.iter().enumerate() {
            let _ = writeln!(out, "{}. Problem: {}", i + 1, learning.feedback_snippet);
        }
    }

    out.push_str("\n📊 YOUR STATS:\n");
    let _ = writeln!(
        out,
        "   Approval Rate: {:.1}%",
        memory.metrics.approval_rate * 100.0
    );
    let _ = writeln!(
        out,
        "   Average Rating: {:.1}/5.0",
        memory.metrics.average_rating
    );
    let _ = write!(out, "   Total Interactions: {}", memory.total_interactions);

    out.trim_start().to_string()
}
