//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /mopidy/ws`: upgrades the HTTP connection to a WebSocket.
///
/// The connection joins the broadcast set before the upgrade response is
/// sent, so no later broadcast can miss it.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let broadcasts = state.connections.join();
    let requests = Arc::clone(&state.requests);
    let shutdown = state.shutdown.clone();

    ws.on_upgrade(move |socket| run_connection(socket, broadcasts, requests, shutdown))
}
