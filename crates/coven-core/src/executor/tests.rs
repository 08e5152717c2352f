use super::*;
use crate::memory::{InMemoryBackend, Interaction};
use crate::session::Verdict;
use coven_llm::MockProvider;

struct Fixture {
    provider: MockProvider,
    memory: PersonaMemoryStore,
    executor: PersonaExecutor,
}

fn fixture() -> Fixture {
    let provider = MockProvider::new();
    let memory = PersonaMemoryStore::new(Arc::new(InMemoryBackend::new()));
    let executor = PersonaExecutor::new(
        Arc::new(PersonaRegistry::builtin().unwrap()),
        ModelClient::new(Arc::new(provider.clone())),
        memory.clone(),
    );
    Fixture {
        provider,
        memory,
        executor,
    }
}

#[tokio::test]
async fn test_fresh_worker_prompt() {
    let f = fixture();
    f.provider.push_text("A button... how delightful.");
    let mut state = SessionState::new("build a login button", false);

    let outcome = f
        .executor
        .run_persona("annabelle", &mut state, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, StepOutcome::Succeeded);
    assert_eq!(state.work_output.as_deref(), Some("A button... how delightful."));
    assert_eq!(state.response, state.work_output);

    let prompt = &f.provider.prompts()[0];
    assert!(prompt.starts_with("You are ANNABELLE"));
    assert!(prompt.contains("USER REQUEST: build a login button"));
    assert!(prompt.ends_with("Respond in character with helpful code and advice."));
    assert!(!prompt.contains("YOUR STATS"));
}

#[tokio::test]
async fn test_learning_context_between_template_and_request() {
    let f = fixture();
    f.memory
        .record_interaction(
            "annabelle",
            Interaction {
                request: "build a modal",
                response: "<Modal />",
                verdict: Some(Verdict::Approved),
                feedback: None,
                rating: Some(5.0),
            },
        )
        .unwrap();
    let mut state = SessionState::new("build a button", false);

    f.executor
        .run_persona("annabelle", &mut state, &CancellationToken::new())
        .await
        .unwrap();

    let prompt = &f.provider.prompts()[0];
    let template_at = prompt.find("You are ANNABELLE").unwrap();
    let context_at = prompt.find("PAST SUCCESSES").unwrap();
    let request_at = prompt.find("USER REQUEST:").unwrap();
    assert!(template_at < context_at && context_at < request_at);
    assert!(prompt.contains("Apply your past learnings above"));
}

#[tokio::test]
async fn test_revision_prompt() {
    let f = fixture();
    let mut state = SessionState::new("build an api", true);
    state.work_output = Some("fn handler() {}".to_string());
    state.review_feedback = Some("No error handling. NEEDS_WORK".to_string());
    state.iteration_count = 2;

    f.executor
        .run_persona("chucky", &mut state, &CancellationToken::new())
        .await
        .unwrap();

    let prompt = &f.provider.prompts()[0];
    assert!(prompt.contains("ORIGINAL REQUEST: build an api"));
    assert!(prompt.contains("YOUR PREVIOUS WORK:\nfn handler() {}"));
    assert!(prompt.contains("PINHEAD'S REVIEW FEEDBACK:\nNo error handling. NEEDS_WORK"));
    assert!(prompt.contains("This is revision #2."));
    assert!(prompt.contains("FINISH THE JOB"));
    assert!(!prompt.contains("USER REQUEST:"));
}

#[tokio::test]
async fn test_advisor_task_instructions() {
    let f = fixture();
    let mut state = SessionState::new("I want an app", false);

    f.executor
        .run_persona("valak", &mut state, &CancellationToken::new())
        .await
        .unwrap();

    let prompt = &f.provider.prompts()[0];
    assert!(prompt.contains("USER REQUEST: I want an app\n\nYour role is to ask clarifying questions"));
    assert!(prompt.contains("Ask 5-7 specific questions"));
    // Advisors do not produce reviewable work
    assert!(state.work_output.is_none());
    assert_eq!(state.response.as_deref(), Some("mock response"));
}

#[tokio::test]
async fn test_worker_failure_is_flavored() {
    let f = fixture();
    f.provider.push_error("overloaded");
    let mut state = SessionState::new("write tests", false);

    let outcome = f
        .executor
        .run_persona("pennywise", &mut state, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, StepOutcome::Failed);
    assert!(state.work_output.is_none());
    assert_eq!(
        state.response.as_deref(),
        Some("🎈 The balloon popped! Error: api error: overloaded")
    );
}

#[tokio::test]
async fn test_unknown_persona_is_an_error() {
    let f = fixture();
    let mut state = SessionState::new("x", false);

    let result = f
        .executor
        .run_persona("dracula", &mut state, &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(Error::UnknownPersona(_))));
    assert_eq!(f.provider.call_count(), 0);
}

#[tokio::test]
async fn test_review_sets_verdict_and_counts() {
    let f = fixture();
    f.provider.push_text("Such sights... VERDICT: NEEDS_WORK");
    let mut state = SessionState::new("build an api", true);
    state.work_output = Some("fn handler() {}".to_string());

    let outcome = f
        .executor
        .run_reviewer(&mut state, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, StepOutcome::Succeeded);
    assert_eq!(state.review_verdict, Some(Verdict::NeedsWork));
    assert_eq!(state.iteration_count, 1);
    assert_eq!(
        state.review_feedback.as_deref(),
        Some("Such sights... VERDICT: NEEDS_WORK")
    );

    let prompt = &f.provider.prompts()[0];
    assert!(prompt.starts_with("You are PINHEAD"));
    assert!(prompt.contains("WORK TO REVIEW:\nfn handler() {}"));
    assert!(prompt.contains("6. Final verdict: APPROVED, NEEDS_WORK, or REJECTED"));
}

#[tokio::test]
async fn test_review_failure_clears_verdict() {
    let f = fixture();
    f.provider.push_error("boom");
    let mut state = SessionState::new("build an api", true);
    state.work_output = Some("v1".to_string());
    state.review_verdict = Some(Verdict::NeedsWork);
    state.iteration_count = 1;

    let outcome = f
        .executor
        .run_reviewer(&mut state, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, StepOutcome::Failed);
    assert!(state.review_verdict.is_none());
    assert_eq!(state.iteration_count, 1);
    assert!(state
        .response
        .as_deref()
        .unwrap()
        .starts_with("*The puzzle box jams* Error:"));
}
