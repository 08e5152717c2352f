//! Chat WebSocket connection loop

use axum::extract::ws::{Message, WebSocket};
use coven_core::Orchestrator;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::handlers::{handle_client_message, parse_client_message};
use super::protocol::{Notice, ServerMessage};

/// Handle WebSocket connection
///
/// Dropping the connection cancels any session still running on it.
pub async fn handle_socket(socket: WebSocket, orchestrator: Arc<Orchestrator>) {
    let connection_id = Uuid::new_v4();
    info!("WebSocket chat connection established: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();

    let connected = ServerMessage::Notice(Notice::Connected { connection_id });
    if let Ok(json) = serde_json::to_string(&connected) {
        let _ = sender.send(Message::Text(json)).await;
    }

    // Session tasks report back through this channel
    let (tx, mut internal_rx) = tokio::sync::mpsc::unbounded_channel::<ServerMessage>();
    let cancel = CancellationToken::new();
    let mut active: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        debug!("Received message: {}", text);
                        match parse_client_message(&text) {
                            Ok(client_msg) => handle_client_message(
                                client_msg,
                                connection_id,
                                &orchestrator,
                                &tx,
                                &cancel,
                                &mut active,
                            ),
                            Err(error_msg) => {
                                if let Ok(json) = serde_json::to_string(&error_msg) {
                                    if sender.send(Message::Text(json)).await.is_err() {
                                        break;
                                    }
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("WebSocket connection closed: {}", connection_id);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }
            server_msg = internal_rx.recv() => {
                match server_msg {
                    Some(msg) => {
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    None => break,
                }
            }
        }
    }

    cancel.cancel();
    info!("WebSocket chat connection ended: {}", connection_id);
}
