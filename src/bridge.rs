//! Domain event to WebSocket message bridge.
//!
//! A broadcast message is the JSON object of an event's fields with one
//! extra key, `event`, holding the event name. If a field is itself named
//! `event` the name wins.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::domain::DomainEvent;
use crate::error::Result;
use crate::server::ServerHandle;

/// Key added to every broadcast message.
pub const EVENT_KEY: &str = "event";

/// Borrowed view of an event in its wire shape.
struct BroadcastMessage<'a>(&'a DomainEvent);

impl Serialize for BroadcastMessage<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let event = self.0;
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in event.fields().filter(|(key, _)| *key != EVENT_KEY) {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(EVENT_KEY, event.name())?;
        map.end()
    }
}

/// Encodes `event` as broadcast message text.
///
/// # Errors
///
/// Returns [`crate::error::FrontendError::Serialization`] when a field has
/// no JSON form.
pub fn encode_event(event: &DomainEvent) -> Result<String> {
    Ok(serde_json::to_string(&BroadcastMessage(event))?)
}

/// Forwards domain events to every open WebSocket connection of a server.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastBridge<'a> {
    server: &'a ServerHandle,
}

impl<'a> BroadcastBridge<'a> {
    /// Creates a bridge feeding the connections of `server`.
    #[must_use]
    pub const fn new(server: &'a ServerHandle) -> Self {
        Self { server }
    }

    /// Encodes and broadcasts `event`.
    ///
    /// An event that cannot be encoded is logged and dropped; later events
    /// are unaffected. Returns the number of connections the message was
    /// queued for.
    pub fn forward(&self, event: &DomainEvent) -> usize {
        match encode_event(event) {
            Ok(message) => {
                let delivered = self.server.broadcast(message);
                tracing::trace!(event = event.name(), delivered, "event broadcast");
                delivered
            }
            Err(err) => {
                tracing::warn!(event = event.name(), error = %err, "dropping unencodable event");
                0
            }
        }
    }
}
