//! Per-connection WebSocket loop.
//!
//! Handles the read/write loop for a single WebSocket connection:
//! broadcast messages go out as text frames, client requests are relayed
//! to the [`RequestHandler`], and server shutdown closes the socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, watch};

use super::messages::RpcErrorResponse;
use super::rpc::RequestHandler;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Forwards every message from `broadcasts` to the client.
/// - Answers client text frames through `requests`.
/// - Sends a Close frame and returns once `shutdown` flips to `true`.
pub async fn run_connection(
    socket: WebSocket,
    mut broadcasts: broadcast::Receiver<Arc<str>>,
    requests: Arc<dyn RequestHandler>,
    mut shutdown: watch::Receiver<bool>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    tracing::debug!("ws connection opened");

    if *shutdown.borrow_and_update() {
        let _ = ws_tx.send(Message::Close(None)).await;
        return;
    }

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_text_message(text.as_str(), requests.as_ref())
                            && ws_tx.send(Message::text(reply)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(error = %err, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Broadcast from the frontend
            message = broadcasts.recv() => {
                match message {
                    Ok(text) => {
                        if ws_tx.send(Message::text(String::from(&*text))).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "ws client lagged behind broadcasts");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            // Server shutdown
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text frame from the client, returning an optional reply.
fn handle_text_message(text: &str, requests: &dyn RequestHandler) -> Option<String> {
    let reply = match serde_json::from_str::<Value>(text) {
        Ok(request) => requests.handle(request)?,
        Err(err) => {
            tracing::debug!(error = %err, "malformed ws request");
            RpcErrorResponse::parse_error().to_value()
        }
    };
    serde_json::to_string(&reply).ok()
}
