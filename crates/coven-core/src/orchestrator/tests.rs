use super::machine::{transition, Effect, Event, Node, TransitionContext};
use super::*;
use crate::error::Error;
use crate::executor::StepOutcome;
use crate::memory::{InMemoryBackend, MockMemoryBackend, PersonaMemoryStore};
use crate::model::ModelClient;
use crate::persona::PersonaRegistry;
use crate::session::{Phase, SessionState, Verdict};
use coven_llm::{MockProvider, MockReply};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const ROUTING_PREFIX: &str = "Analyze this developer request";

/// Answers classifier prompts by keyword, like a well-behaved model would
fn routing_provider() -> MockProvider {
    MockProvider::new().with_responder(|prompt| {
        if !prompt.starts_with(ROUTING_PREFIX) {
            return None;
        }
        let request = prompt
            .lines()
            .find_map(|l| l.strip_prefix("REQUEST: "))
            .unwrap_or_default()
            .to_lowercase();
        let persona = if request.contains("button") || request.contains("css") {
            "ANNABELLE"
        } else if request.contains("database") || request.contains("api") {
            "CHUCKY"
        } else if request.contains("test") {
            "PENNYWISE"
        } else {
            "NOBODY"
        };
        Some(persona.to_string())
    })
}

fn orchestrator_with(provider: &MockProvider, memory: PersonaMemoryStore) -> Orchestrator {
    Orchestrator::new(
        Arc::new(PersonaRegistry::builtin().unwrap()),
        ModelClient::new(Arc::new(provider.clone())),
        memory,
    )
}

fn in_memory() -> PersonaMemoryStore {
    PersonaMemoryStore::new(Arc::new(InMemoryBackend::new()))
}

async fn run_collect(
    orchestrator: &Orchestrator,
    input: OrchestratorInput,
    cancel: CancellationToken,
) -> (crate::error::Result<SessionState>, Vec<SessionEvent>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let result = orchestrator.run(input, &tx, cancel).await;
    drop(tx);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (result, events)
}

fn kinds(events: &[SessionEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|e| match e {
            SessionEvent::Thinking { .. } => "thinking",
            SessionEvent::Stream { .. } => "stream",
            SessionEvent::Complete { .. } => "complete",
            SessionEvent::Error { .. } => "error",
        })
        .collect()
}

fn worker_prompts(provider: &MockProvider, marker: &str) -> usize {
    provider
        .prompts()
        .iter()
        .filter(|p| p.starts_with(marker))
        .count()
}

// ---------------------------------------------------------------------------
// Transition table

fn ctx(worker: bool, review: bool, iteration: u32) -> TransitionContext<'static> {
    TransitionContext {
        selected_persona: Some("chucky"),
        persona_is_worker: worker,
        review_enabled: review,
        iteration_count: iteration,
        max_iterations: 3,
    }
}

#[test]
fn test_entry_routes_on_preselection() {
    let t = transition(
        &Node::Entry,
        &Event::Start {
            preselected: Some("annabelle".into()),
        },
        &ctx(false, false, 0),
    )
    .unwrap();
    assert_eq!(t.next, Node::Persona("annabelle".into()));
    assert!(t.effects.contains(&Effect::SelectPersona("annabelle".into())));
    assert!(t.effects.contains(&Effect::EnterPhase(Phase::Working)));

    let t = transition(
        &Node::Entry,
        &Event::Start { preselected: None },
        &ctx(false, false, 0),
    )
    .unwrap();
    assert_eq!(t.next, Node::Classifying);
}

#[test]
fn test_worker_goes_to_review_only_in_review_mode() {
    let done = Event::WorkDone(StepOutcome::Succeeded);
    let persona = Node::Persona("chucky".into());

    let t = transition(&persona, &done, &ctx(true, true, 0)).unwrap();
    assert_eq!(t.next, Node::Reviewing);
    assert!(!t.effects.contains(&Effect::RecordInteraction));

    let t = transition(&persona, &done, &ctx(true, false, 0)).unwrap();
    assert_eq!(t.next, Node::Terminal);
    assert!(t.effects.contains(&Effect::RecordInteraction));

    // Advisors never enter review and are never recorded
    let t = transition(&persona, &done, &ctx(false, true, 0)).unwrap();
    assert_eq!(t.next, Node::Terminal);
    assert!(!t.effects.contains(&Effect::RecordInteraction));
}

#[test]
fn test_failed_work_terminates_and_records_workers() {
    let failed = Event::WorkDone(StepOutcome::Failed);
    let persona = Node::Persona("chucky".into());

    let t = transition(&persona, &failed, &ctx(true, true, 0)).unwrap();
    assert_eq!(t.next, Node::Terminal);
    assert_eq!(
        t.effects,
        vec![Effect::EnterPhase(Phase::Complete), Effect::RecordInteraction]
    );

    let t = transition(&persona, &failed, &ctx(false, false, 0)).unwrap();
    assert_eq!(t.next, Node::Terminal);
    assert_eq!(t.effects, vec![Effect::EnterPhase(Phase::Complete)]);
}

#[test]
fn test_review_outcomes() {
    let reviewed = |v| Event::Reviewed(Some(v));

    let t = transition(&Node::Reviewing, &reviewed(Verdict::NeedsWork), &ctx(true, true, 1)).unwrap();
    assert_eq!(t.next, Node::Persona("chucky".into()));

    let t = transition(&Node::Reviewing, &reviewed(Verdict::NeedsWork), &ctx(true, true, 3)).unwrap();
    assert_eq!(t.next, Node::Terminal);

    let t = transition(&Node::Reviewing, &reviewed(Verdict::Rejected), &ctx(true, true, 1)).unwrap();
    assert_eq!(t.next, Node::Terminal);
    assert!(t.effects.contains(&Effect::RecordInteraction));

    let t = transition(&Node::Reviewing, &reviewed(Verdict::Approved), &ctx(true, true, 1)).unwrap();
    assert_eq!(t.next, Node::Terminal);

    let t = transition(&Node::Reviewing, &reviewed(Verdict::NeedsWork), &ctx(false, true, 1)).unwrap();
    assert_eq!(t.next, Node::Terminal);

    let t = transition(&Node::Reviewing, &Event::Reviewed(None), &ctx(true, true, 1)).unwrap();
    assert_eq!(t.next, Node::Terminal);
}

#[test]
fn test_invalid_transitions() {
    assert!(transition(&Node::Terminal, &Event::Classified("x".into()), &ctx(true, true, 0)).is_err());
    assert!(transition(
        &Node::Classifying,
        &Event::WorkDone(StepOutcome::Succeeded),
        &ctx(true, true, 0)
    )
    .is_err());

    let no_persona = TransitionContext {
        selected_persona: None,
        ..ctx(true, true, 1)
    };
    let result = transition(
        &Node::Reviewing,
        &Event::Reviewed(Some(Verdict::NeedsWork)),
        &no_persona,
    );
    assert!(matches!(result, Err(Error::Internal(_))));
}

// ---------------------------------------------------------------------------
// Sessions

#[tokio::test]
async fn test_no_review_single_complete() {
    let provider = routing_provider();
    provider.push_text("Sweet dreams... here is your feature");
    let memory = in_memory();
    let orchestrator = orchestrator_with(&provider, memory.clone());

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("build something big").with_persona("freddy"),
        CancellationToken::new(),
    )
    .await;

    let state = result.unwrap();
    assert_eq!(kinds(&events), vec!["thinking", "stream", "complete"]);
    assert_eq!(state.iteration_count, 0);
    assert_eq!(state.phase, Phase::Complete);
    assert!(state.review_verdict.is_none());

    match events.last().unwrap() {
        SessionEvent::Complete {
            persona,
            content,
            iteration,
            verdict,
            ..
        } => {
            assert_eq!(persona, "freddy");
            assert_eq!(content, "Sweet dreams... here is your feature");
            assert_eq!(*iteration, 0);
            assert!(verdict.is_none());
        }
        other => panic!("unexpected {other:?}"),
    }

    // Recorded as approved without a rating
    let record = memory.get_memory("freddy").unwrap();
    assert_eq!(record.total_interactions, 1);
    assert_eq!(record.successful_patterns.len(), 1);
    assert_eq!(record.metrics.approval_rate, 1.0);
    assert_eq!(record.metrics.average_rating, 0.0);
}

#[tokio::test]
async fn test_login_button_routes_to_frontend() {
    let provider = routing_provider();
    let orchestrator = orchestrator_with(&provider, in_memory());

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("build a login button"),
        CancellationToken::new(),
    )
    .await;

    let state = result.unwrap();
    assert_eq!(state.selected_persona.as_deref(), Some("annabelle"));
    assert!(matches!(
        &events[0],
        SessionEvent::Thinking { persona, .. } if persona == CLASSIFIER_NAME
    ));
    assert_eq!(kinds(&events), vec!["thinking", "stream", "complete"]);
}

#[tokio::test]
async fn test_unknown_classification_falls_back_to_default() {
    let provider = routing_provider();
    let orchestrator = orchestrator_with(&provider, in_memory());

    let (result, _) = run_collect(
        &orchestrator,
        OrchestratorInput::new("tell me a story"),
        CancellationToken::new(),
    )
    .await;
    assert_eq!(result.unwrap().selected_persona.as_deref(), Some("freddy"));
}

#[tokio::test]
async fn test_unknown_explicit_persona_is_classified() {
    let provider = routing_provider();
    let orchestrator = orchestrator_with(&provider, in_memory());

    let (result, _) = run_collect(
        &orchestrator,
        OrchestratorInput::new("speed up my database").with_persona("dracula"),
        CancellationToken::new(),
    )
    .await;
    assert_eq!(result.unwrap().selected_persona.as_deref(), Some("chucky"));
    assert_eq!(worker_prompts(&provider, ROUTING_PREFIX), 1);
}

#[tokio::test]
async fn test_two_revisions_then_approved() {
    let provider = routing_provider();
    for reply in [
        "v1",
        "Such sights. VERDICT: NEEDS_WORK",
        "v2",
        "Closer. VERDICT: NEEDS_WORK",
        "v3",
        "The box opens. VERDICT: APPROVED",
    ] {
        provider.push_text(reply);
    }
    let memory = in_memory();
    let orchestrator = orchestrator_with(&provider, memory.clone());

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("design the api layer")
            .with_persona("chucky")
            .with_review(true),
        CancellationToken::new(),
    )
    .await;

    let state = result.unwrap();
    assert_eq!(state.iteration_count, 3);
    assert_eq!(state.review_verdict, Some(Verdict::Approved));
    assert_eq!(state.work_output.as_deref(), Some("v3"));
    assert_eq!(
        kinds(&events),
        vec!["thinking", "stream", "stream", "stream", "stream", "stream", "stream", "complete"]
    );
    // One fresh run plus two loop-backs
    assert_eq!(worker_prompts(&provider, "You are CHUCKY"), 3);

    let prompts = provider.prompts();
    assert!(prompts[2].contains("This is revision #1."));
    assert!(prompts[2].contains("YOUR PREVIOUS WORK:\nv1"));
    assert!(prompts[4].contains("This is revision #2."));
    assert!(prompts[4].contains("Closer. VERDICT: NEEDS_WORK"));

    // Streams alternate worker and reviewer with the phase after each step
    match &events[2] {
        SessionEvent::Stream {
            persona,
            phase,
            iteration,
            verdict,
            ..
        } => {
            assert_eq!(persona, "pinhead");
            assert_eq!(*phase, Phase::Reviewing);
            assert_eq!(*iteration, 1);
            assert_eq!(*verdict, Some(Verdict::NeedsWork));
        }
        other => panic!("unexpected {other:?}"),
    }

    let record = memory.get_memory("chucky").unwrap();
    assert_eq!(record.total_interactions, 1);
    assert_eq!(record.successful_patterns.len(), 1);
    assert_eq!(record.successful_patterns[0].response_snippet, "v3");
    assert_eq!(record.metrics.average_rating, 5.0);
}

#[tokio::test]
async fn test_revision_loop_is_capped() {
    let provider = routing_provider();
    for i in 0..5 {
        provider.push_text(format!("attempt {i}"));
        provider.push_text("Pathetic. VERDICT: NEEDS_WORK");
    }
    let memory = in_memory();
    let orchestrator = orchestrator_with(&provider, memory.clone());

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("write tests")
            .with_persona("pennywise")
            .with_review(true),
        CancellationToken::new(),
    )
    .await;

    let state = result.unwrap();
    assert_eq!(state.iteration_count, 3);
    assert_eq!(state.review_verdict, Some(Verdict::NeedsWork));
    assert_eq!(worker_prompts(&provider, "You are PENNYWISE"), 3);
    assert_eq!(worker_prompts(&provider, "You are PINHEAD"), 3);
    assert_eq!(kinds(&events).iter().filter(|k| **k == "complete").count(), 1);

    let record = memory.get_memory("pennywise").unwrap();
    assert_eq!(record.feedback_learnings.len(), 1);
    assert_eq!(record.metrics.average_rating, 3.0);
    assert_eq!(record.metrics.approval_rate, 0.0);
}

#[tokio::test]
async fn test_custom_iteration_cap() {
    let provider = routing_provider();
    provider.push_text("v1");
    provider.push_text("VERDICT: NEEDS_WORK");
    let orchestrator = orchestrator_with(&provider, in_memory())
        .with_config(OrchestratorConfig::new().with_max_iterations(1));

    let (result, _) = run_collect(
        &orchestrator,
        OrchestratorInput::new("x").with_persona("freddy").with_review(true),
        CancellationToken::new(),
    )
    .await;

    assert_eq!(result.unwrap().iteration_count, 1);
    assert_eq!(worker_prompts(&provider, "You are FREDDY"), 1);
}

#[test]
fn test_iteration_cap_is_clamped() {
    assert_eq!(OrchestratorConfig::new().with_max_iterations(0).max_iterations, 1);
    assert_eq!(OrchestratorConfig::new().with_max_iterations(2).max_iterations, 2);
    assert_eq!(
        OrchestratorConfig::new().with_max_iterations(10).max_iterations,
        DEFAULT_MAX_ITERATIONS
    );
}

#[tokio::test]
async fn test_rejected_never_redispatches() {
    let provider = routing_provider();
    provider.push_text("v1");
    provider.push_text("Burn it. VERDICT: REJECTED");
    let memory = in_memory();
    let orchestrator = orchestrator_with(&provider, memory.clone());

    let (result, _) = run_collect(
        &orchestrator,
        OrchestratorInput::new("secure my auth")
            .with_persona("ghostface")
            .with_review(true),
        CancellationToken::new(),
    )
    .await;

    let state = result.unwrap();
    assert_eq!(state.review_verdict, Some(Verdict::Rejected));
    assert_eq!(state.iteration_count, 1);
    assert_eq!(worker_prompts(&provider, "You are GHOSTFACE"), 1);

    let record = memory.get_memory("ghostface").unwrap();
    assert_eq!(record.feedback_learnings[0].verdict, Verdict::Rejected);
    assert_eq!(record.metrics.average_rating, 1.0);
}

#[tokio::test]
async fn test_advisor_skips_review_and_memory() {
    let provider = routing_provider();
    provider.push_text("Who are your souls?");
    let memory = in_memory();
    let orchestrator = orchestrator_with(&provider, memory.clone());

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("I have a vague idea")
            .with_persona("valak")
            .with_review(true),
        CancellationToken::new(),
    )
    .await;

    let state = result.unwrap();
    assert_eq!(kinds(&events), vec!["thinking", "stream", "complete"]);
    assert_eq!(state.iteration_count, 0);
    assert_eq!(provider.call_count(), 1);
    assert_eq!(memory.get_memory("valak").unwrap().total_interactions, 0);
}

#[tokio::test]
async fn test_worker_failure_completes_with_flavor() {
    let provider = routing_provider();
    provider.push_error("overloaded");
    let memory = in_memory();
    let orchestrator = orchestrator_with(&provider, memory.clone());

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("fix my css")
            .with_persona("annabelle")
            .with_review(true),
        CancellationToken::new(),
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(kinds(&events), vec!["thinking", "stream", "complete"]);
    match events.last().unwrap() {
        SessionEvent::Complete { content, .. } => {
            assert!(content.starts_with("*Doll eyes glaze over*"));
        }
        other => panic!("unexpected {other:?}"),
    }
    // Reviewed session that never produced work: counted, no verdict
    let record = memory.get_memory("annabelle").unwrap();
    assert_eq!(record.total_interactions, 1);
    assert!(record.successful_patterns.is_empty());
    assert!(record.feedback_learnings.is_empty());
}

#[tokio::test]
async fn test_worker_failure_without_review_is_recorded_as_approved() {
    let provider = routing_provider();
    provider.push_error("overloaded");
    let memory = in_memory();
    let orchestrator = orchestrator_with(&provider, memory.clone());

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("fix my css").with_persona("annabelle"),
        CancellationToken::new(),
    )
    .await;

    let state = result.unwrap();
    assert_eq!(state.phase, Phase::Complete);
    assert_eq!(kinds(&events), vec!["thinking", "stream", "complete"]);

    let record = memory.get_memory("annabelle").unwrap();
    assert_eq!(record.total_interactions, 1);
    assert_eq!(record.successful_patterns.len(), 1);
    assert!(record.successful_patterns[0]
        .response_snippet
        .starts_with("*Doll eyes glaze over*"));
}

#[tokio::test]
async fn test_failed_revision_keeps_review_feedback() {
    let provider = routing_provider();
    provider.push_text("v1");
    provider.push_text("Sloppy. VERDICT: NEEDS_WORK");
    provider.push_error("overloaded");
    let memory = in_memory();
    let orchestrator = orchestrator_with(&provider, memory.clone());

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("optimize my queries")
            .with_persona("freddy")
            .with_review(true),
        CancellationToken::new(),
    )
    .await;

    let state = result.unwrap();
    assert_eq!(state.iteration_count, 1);
    assert_eq!(state.review_verdict, Some(Verdict::NeedsWork));
    assert_eq!(kinds(&events).last(), Some(&"complete"));

    let record = memory.get_memory("freddy").unwrap();
    assert_eq!(record.total_interactions, 1);
    assert_eq!(record.feedback_learnings.len(), 1);
    assert_eq!(record.feedback_learnings[0].verdict, Verdict::NeedsWork);
    assert!(record.feedback_learnings[0].feedback_snippet.contains("Sloppy"));
    assert_eq!(record.metrics.average_rating, 3.0);
}

#[tokio::test]
async fn test_reviewer_failure_terminates_without_verdict() {
    let provider = routing_provider();
    provider.push_text("v1");
    provider.push_error("boom");
    let memory = in_memory();
    let orchestrator = orchestrator_with(&provider, memory.clone());

    let (result, _) = run_collect(
        &orchestrator,
        OrchestratorInput::new("x").with_persona("freddy").with_review(true),
        CancellationToken::new(),
    )
    .await;

    let state = result.unwrap();
    assert!(state.review_verdict.is_none());
    assert_eq!(state.iteration_count, 0);

    let record = memory.get_memory("freddy").unwrap();
    assert_eq!(record.total_interactions, 1);
    assert!(record.successful_patterns.is_empty());
}

#[tokio::test]
async fn test_blank_request_is_an_error_event() {
    let provider = routing_provider();
    let orchestrator = orchestrator_with(&provider, in_memory());

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("   "),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(Error::InvalidRequest(_))));
    assert_eq!(kinds(&events), vec!["error"]);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_cancellation_ends_with_error() {
    let provider = routing_provider();
    provider.push(MockReply::Delayed(Duration::from_secs(3600), "never".into()));
    let memory = in_memory();
    let orchestrator = orchestrator_with(&provider, memory.clone());

    let cancel = CancellationToken::new();
    cancel.cancel();

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("x").with_persona("chucky"),
        cancel,
    )
    .await;

    assert!(matches!(
        result,
        Err(Error::Llm(coven_llm::Error::Cancelled))
    ));
    assert_eq!(kinds(&events), vec!["thinking", "error"]);
    assert_eq!(memory.get_memory("chucky").unwrap().total_interactions, 0);
}

#[tokio::test]
async fn test_persistence_failure_does_not_abort() {
    let provider = routing_provider();
    provider.push_text("done");

    let mut backend = MockMemoryBackend::new();
    backend.expect_load().returning(|_| Ok(None));
    backend
        .expect_save()
        .times(1)
        .returning(|_| Err(Error::Persistence("read-only filesystem".into())));
    let orchestrator = orchestrator_with(&provider, PersonaMemoryStore::new(Arc::new(backend)));

    let (result, events) = run_collect(
        &orchestrator,
        OrchestratorInput::new("x").with_persona("freddy"),
        CancellationToken::new(),
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(kinds(&events), vec!["thinking", "stream", "complete"]);
}

#[tokio::test]
async fn test_stepper_exposes_each_transition() {
    let provider = routing_provider();
    provider.push_text("v1");
    provider.push_text("VERDICT: APPROVED");
    let orchestrator = orchestrator_with(&provider, in_memory());
    let cancel = CancellationToken::new();

    let mut machine = orchestrator
        .session(OrchestratorInput::new("add a css animation").with_review(true))
        .unwrap();
    assert_eq!(machine.node(), &Node::Entry);

    // Entry -> Classifying: nothing to show yet
    assert!(machine.step(&cancel).await.unwrap().is_none());
    assert_eq!(machine.node(), &Node::Classifying);
    assert_eq!(machine.state().phase, Phase::Unclassified);

    // Classifying -> Persona
    let delta = machine.step(&cancel).await.unwrap().unwrap();
    assert!(matches!(delta, SessionEvent::Stream { ref persona, .. } if persona == "annabelle"));
    assert_eq!(machine.state().phase, Phase::Working);

    // Persona -> Reviewing
    machine.step(&cancel).await.unwrap();
    assert_eq!(machine.node(), &Node::Reviewing);
    assert_eq!(machine.state().review_verdict, Some(Verdict::Approved));

    // Reviewing -> Terminal
    let delta = machine.step(&cancel).await.unwrap().unwrap();
    assert!(delta.is_final());
    assert!(machine.is_complete());
    assert_eq!(machine.state().phase, Phase::Complete);

    assert!(matches!(
        machine.step(&cancel).await,
        Err(Error::Internal(_))
    ));
}

#[test]
fn test_metrics_cover_every_persona() {
    let provider = routing_provider();
    let orchestrator = orchestrator_with(&provider, in_memory());

    let metrics = orchestrator.metrics();
    assert_eq!(metrics.len(), 8);
    assert_eq!(metrics[0].persona, "annabelle");
    assert!(metrics.iter().all(|m| m.total_interactions == 0));
}

#[test]
fn test_session_event_wire_format() {
    let state = SessionState::new("x", false);
    let json = serde_json::to_value(SessionEvent::complete(&state)).unwrap();
    assert_eq!(json["type"], "complete");
    assert_eq!(json["phase"], "unclassified");
    assert!(json["verdict"].is_null());
}
