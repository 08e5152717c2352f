//! Prompt assembly for personas and the reviewer

use crate::persona::Persona;
use crate::session::SessionState;

const FRESH_CLOSING: &str = "Respond in character with helpful code and advice.";
const LEARNING_NUDGE: &str =
    "Apply your past learnings above to provide the best possible solution.";

/// Prompt for a persona run
///
/// Order: template, learning context, then the fresh request or the revision
/// block (original request, previous work, feedback, revision instruction).
#[must_use]
pub fn build_persona_prompt(
    persona: &Persona,
    learning_context: &str,
    state: &SessionState,
    reviewer_name: &str,
) -> String {
    let mut sections = vec![persona.prompt.template.trim().to_string()];

    if !learning_context.is_empty() {
        sections.push(learning_context.to_string());
    }

    if state.is_revision() {
        sections.push(format!("ORIGINAL REQUEST: {}", state.request()));
        sections.push(format!(
            "YOUR PREVIOUS WORK:\n{}",
            state.work_output.as_deref().unwrap_or_default()
        ));
        sections.push(format!(
            "{}'S REVIEW FEEDBACK:\n{}",
            reviewer_name.to_uppercase(),
            state.review_feedback.as_deref().unwrap_or_default()
        ));

        let mut closing = format!(
            "This is revision #{}. Address the feedback and improve your work.",
            state.iteration_count
        );
        if let Some(instruction) = &persona.prompt.revision_instruction {
            closing.push('\n');
            closing.push_str(instruction.trim());
        }
        if !learning_context.is_empty() {
            closing.push_str(
                "\nUse your past learnings above to avoid previous mistakes and apply successful patterns.",
            );
        }
        closing.push_str("\nRespond in character with the improved code and explanation.");
        sections.push(closing);
    } else {
        sections.push(format!("USER REQUEST: {}", state.request()));

        match &persona.prompt.task_instructions {
            Some(instructions) => sections.push(instructions.trim().to_string()),
            None if !learning_context.is_empty() => {
                sections.push(format!("{}\n{}", LEARNING_NUDGE, FRESH_CLOSING))
            }
            None => sections.push(FRESH_CLOSING.to_string()),
        }
    }

    sections.join("\n\n")
}

/// Prompt for the reviewer judging the latest work
#[must_use]
pub fn build_review_prompt(reviewer: &Persona, state: &SessionState) -> String {
    let work = state
        .work_output
        .as_deref()
        .or(state.response.as_deref())
        .unwrap_or_default();

    format!(
        "{template}\n\n\
         ORIGINAL REQUEST: {request}\n\n\
         WORK TO REVIEW:\n{work}\n\n\
         Review this work and provide:\n\
         1. Architectural Review (rating out of 5)\n\
         2. What works well\n\
         3. What needs improvement\n\
         4. Security concerns\n\
         5. Performance concerns\n\
         6. Final verdict: APPROVED, NEEDS_WORK, or REJECTED\n\n\
         Respond in character with your review.",
        template = reviewer.prompt.template.trim(),
        request = state.request(),
    )
}
