//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::server::ConnectionSet;
use crate::ws::RequestHandler;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Broadcast set every WebSocket connection joins.
    pub connections: ConnectionSet,
    /// Handler for requests clients send over the WebSocket.
    pub requests: Arc<dyn RequestHandler>,
    /// Flips to `true` when the server is shutting down.
    pub shutdown: watch::Receiver<bool>,
}
