//! Review-loop state machine
//!
//! [`transition`] is pure: it looks up the rule for the current node and the
//! guard derived from the incoming event, and returns the next node plus the
//! effects to apply to the session. Running personas is the driver's job.

use crate::error::{Error, Result};
use crate::executor::StepOutcome;
use crate::session::{Phase, Verdict};

/// Machine node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Before any routing
    Entry,
    /// Waiting for the classifier
    Classifying,
    /// Running a persona
    Persona(String),
    /// Running the reviewer on the selected worker's output
    Reviewing,
    /// Done
    Terminal,
}

impl Node {
    /// Discriminant used as the table key
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Entry => NodeKind::Entry,
            Self::Classifying => NodeKind::Classifying,
            Self::Persona(_) => NodeKind::Persona,
            Self::Reviewing => NodeKind::Reviewing,
            Self::Terminal => NodeKind::Terminal,
        }
    }
}

/// Node discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// [`Node::Entry`]
    Entry,
    /// [`Node::Classifying`]
    Classifying,
    /// [`Node::Persona`]
    Persona,
    /// [`Node::Reviewing`]
    Reviewing,
    /// [`Node::Terminal`]
    Terminal,
}

/// Input to the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Session started, with a validated explicit persona if one was given
    Start {
        /// Persona id chosen by the caller
        preselected: Option<String>,
    },
    /// Classifier picked a persona
    Classified(String),
    /// Persona run finished
    WorkDone(StepOutcome),
    /// Reviewer run finished; `None` when the reviewer call failed
    Reviewed(Option<Verdict>),
}

/// Facts about the session the guards need
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    /// Persona currently selected
    pub selected_persona: Option<&'a str>,
    /// Whether the selected persona is a worker
    pub persona_is_worker: bool,
    /// Review mode requested and a reviewer exists
    pub review_enabled: bool,
    /// Completed review cycles
    pub iteration_count: u32,
    /// Review cycle cap
    pub max_iterations: u32,
}

/// Which condition fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Caller chose a persona
    Preselected,
    /// Caller did not choose a persona
    NeedsClassification,
    /// Classifier answered
    Classified,
    /// Persona call failed
    WorkFailed,
    /// Worker succeeded and review mode is on
    WorkerReview,
    /// Worker succeeded and review mode is off
    WorkerDone,
    /// Non-worker persona answered
    NonWorkerDone,
    /// Reviewer call failed
    ReviewFailed,
    /// Reviewer approved
    Approved,
    /// Cap reached before approval
    BudgetExhausted,
    /// Revision requested and budget remains
    Revise,
    /// Revision requested but the persona cannot revise
    ReviseNonWorker,
    /// Reviewer rejected
    Rejected,
}

/// Where a rule leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// [`Node::Classifying`]
    Classifying,
    /// [`Node::Persona`] with the persona named by the event
    EventPersona,
    /// [`Node::Persona`] with the already selected persona
    SamePersona,
    /// [`Node::Reviewing`]
    Reviewing,
    /// [`Node::Terminal`]
    Terminal,
}

/// Session change requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Set `selected_persona`
    SelectPersona(String),
    /// Set `phase`
    EnterPhase(Phase),
    /// Record the outcome in the selected worker's memory
    RecordInteraction,
}

/// Result of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Next node
    pub next: Node,
    /// Effects to apply before the next node runs
    pub effects: Vec<Effect>,
}

struct Rule {
    from: NodeKind,
    guard: Guard,
    to: Target,
    phase: Phase,
    record: bool,
}

const fn rule(from: NodeKind, guard: Guard, to: Target, phase: Phase, record: bool) -> Rule {
    Rule {
        from,
        guard,
        to,
        phase,
        record,
    }
}

#[rustfmt::skip]
const RULES: &[Rule] = &[
    rule(NodeKind::Entry,       Guard::Preselected,         Target::EventPersona, Phase::Working,      false),
    rule(NodeKind::Entry,       Guard::NeedsClassification, Target::Classifying,  Phase::Unclassified, false),
    rule(NodeKind::Classifying, Guard::Classified,          Target::EventPersona, Phase::Working,      false),
    rule(NodeKind::Persona,     Guard::WorkFailed,          Target::Terminal,     Phase::Complete,     true),
    rule(NodeKind::Persona,     Guard::WorkerReview,        Target::Reviewing,    Phase::Reviewing,    false),
    rule(NodeKind::Persona,     Guard::WorkerDone,          Target::Terminal,     Phase::Complete,     true),
    rule(NodeKind::Persona,     Guard::NonWorkerDone,       Target::Terminal,     Phase::Complete,     false),
    rule(NodeKind::Reviewing,   Guard::ReviewFailed,        Target::Terminal,     Phase::Complete,     true),
    rule(NodeKind::Reviewing,   Guard::Approved,            Target::Terminal,     Phase::Complete,     true),
    rule(NodeKind::Reviewing,   Guard::BudgetExhausted,     Target::Terminal,     Phase::Complete,     true),
    rule(NodeKind::Reviewing,   Guard::Revise,              Target::SamePersona,  Phase::Working,      false),
    rule(NodeKind::Reviewing,   Guard::ReviseNonWorker,     Target::Terminal,     Phase::Complete,     false),
    rule(NodeKind::Reviewing,   Guard::Rejected,            Target::Terminal,     Phase::Complete,     true),
];

fn guard(node: NodeKind, event: &Event, ctx: &TransitionContext<'_>) -> Option<Guard> {
    let guard = match (node, event) {
        (NodeKind::Entry, Event::Start { preselected: Some(_) }) => Guard::Preselected,
        (NodeKind::Entry, Event::Start { preselected: None }) => Guard::NeedsClassification,
        (NodeKind::Classifying, Event::Classified(_)) => Guard::Classified,
        (NodeKind::Persona, Event::WorkDone(StepOutcome::Failed)) => Guard::WorkFailed,
        (NodeKind::Persona, Event::WorkDone(StepOutcome::Succeeded)) => {
            match (ctx.persona_is_worker, ctx.review_enabled) {
                (true, true) => Guard::WorkerReview,
                (true, false) => Guard::WorkerDone,
                (false, _) => Guard::NonWorkerDone,
            }
        }
        (NodeKind::Reviewing, Event::Reviewed(None)) => Guard::ReviewFailed,
        (NodeKind::Reviewing, Event::Reviewed(Some(Verdict::Approved))) => Guard::Approved,
        (NodeKind::Reviewing, Event::Reviewed(Some(_)))
            if ctx.iteration_count >= ctx.max_iterations =>
        {
            Guard::BudgetExhausted
        }
        (NodeKind::Reviewing, Event::Reviewed(Some(Verdict::NeedsWork))) => {
            if ctx.persona_is_worker {
                Guard::Revise
            } else {
                Guard::ReviseNonWorker
            }
        }
        (NodeKind::Reviewing, Event::Reviewed(Some(Verdict::Rejected))) => Guard::Rejected,
        _ => return None,
    };
    Some(guard)
}

/// Compute the next node and effects for `event` arriving at `node`
///
/// # Errors
/// `Internal` when the event is not valid for the node (e.g. anything after
/// `Terminal`) or a loop-back is requested with no selected persona.
pub fn transition(node: &Node, event: &Event, ctx: &TransitionContext<'_>) -> Result<Transition> {
    let invalid = || Error::Internal(format!("no transition from {:?} on {:?}", node, event));

    let guard = guard(node.kind(), event, ctx).ok_or_else(invalid)?;
    let rule = RULES
        .iter()
        .find(|r| r.from == node.kind() && r.guard == guard)
        .ok_or_else(invalid)?;

    let mut effects = Vec::with_capacity(3);
    let next = match rule.to {
        Target::Classifying => Node::Classifying,
        Target::Reviewing => Node::Reviewing,
        Target::Terminal => Node::Terminal,
        Target::EventPersona => {
            let id = match event {
                Event::Start {
                    preselected: Some(id),
                }
                | Event::Classified(id) => id.clone(),
                _ => return Err(invalid()),
            };
            effects.push(Effect::SelectPersona(id.clone()));
            Node::Persona(id)
        }
        Target::SamePersona => {
            let id = ctx.selected_persona.ok_or_else(invalid)?;
            Node::Persona(id.to_string())
        }
    };

    effects.push(Effect::EnterPhase(rule.phase));
    if rule.record && ctx.persona_is_worker {
        effects.push(Effect::RecordInteraction);
    }

    Ok(Transition { next, effects })
}
