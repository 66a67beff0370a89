//! The set of open WebSocket connections, as seen by the broadcaster.
//!
//! [`ConnectionSet`] is a `tokio::broadcast` channel of message texts.
//! Each accepted WebSocket connection holds one receiver; publishing never
//! blocks and never waits for a client.

use std::sync::Arc;

use tokio::sync::broadcast;

/// Fan-out point for broadcast messages.
///
/// Each receiver buffers up to `capacity` messages. A connection that falls
/// further behind skips the oldest ones instead of slowing the sender.
#[derive(Debug, Clone)]
pub struct ConnectionSet {
    sender: broadcast::Sender<Arc<str>>,
}

impl ConnectionSet {
    /// Creates an empty set with the given per-connection buffer.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Hands `message` to every open connection.
    ///
    /// Returns how many connections it was queued for; `0` when nobody is
    /// connected.
    pub fn broadcast(&self, message: impl Into<Arc<str>>) -> usize {
        self.sender.send(message.into()).unwrap_or(0)
    }

    /// Joins the set. Called once per accepted connection.
    #[must_use]
    pub fn join(&self) -> broadcast::Receiver<Arc<str>> {
        self.sender.subscribe()
    }

    /// Number of connections currently in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Whether no connection is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
