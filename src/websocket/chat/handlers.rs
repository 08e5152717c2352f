//! Chat message handlers

use coven_core::{Orchestrator, OrchestratorInput};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::protocol::{ClientMessage, ServerMessage};

/// Parse one inbound text frame
pub fn parse_client_message(text: &str) -> Result<ClientMessage, ServerMessage> {
    serde_json::from_str::<ClientMessage>(text).map_err(|e| {
        ServerMessage::error(format!("Invalid message format: {}", e), "INVALID_MESSAGE")
    })
}

/// Start a session unless one is already running on this connection
pub fn handle_client_message(
    msg: ClientMessage,
    connection_id: Uuid,
    orchestrator: &Arc<Orchestrator>,
    tx: &UnboundedSender<ServerMessage>,
    cancel: &CancellationToken,
    active: &mut Option<JoinHandle<()>>,
) {
    if active.as_ref().is_some_and(|handle| !handle.is_finished()) {
        let _ = tx.send(ServerMessage::error(
            "A request is already in progress on this connection",
            "BUSY",
        ));
        return;
    }

    info!(connection = %connection_id, persona = ?msg.persona, "Chat request received");
    *active = Some(spawn_session(
        orchestrator.clone(),
        msg.into(),
        tx.clone(),
        cancel.child_token(),
    ));
}

/// Run one session in the background, forwarding its events to `tx`
pub fn spawn_session(
    orchestrator: Arc<Orchestrator>,
    input: OrchestratorInput,
    tx: UnboundedSender<ServerMessage>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let run = async move {
            let result = orchestrator.run(input, &events_tx, cancel).await;
            drop(events_tx);
            result
        };
        let forward = async {
            while let Some(event) = events_rx.recv().await {
                if tx.send(ServerMessage::from(event)).is_err() {
                    break;
                }
            }
        };

        let (result, ()) = tokio::join!(run, forward);
        if let Err(e) = result {
            debug!(error = %e, "Chat session ended with error");
        }
    })
}
