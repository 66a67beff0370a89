//! Domain layer: backend events, library models, and the event bus.
//!
//! This module holds what the player backend hands to the frontend:
//! [`DomainEvent`]s carrying [`FieldValue`]s (including [`Model`] objects)
//! and the [`EventBus`] they travel on.

pub mod event;
pub mod event_bus;
pub mod model;

pub use event::{DomainEvent, FieldValue, PlaybackState};
pub use event_bus::{EventBus, ListenerGuard};
pub use model::{Album, Artist, Image, Model, Playlist, Ref, RefType, TlTrack, Track};
