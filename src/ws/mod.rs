//! WebSocket layer: upgrade handling and the per-connection loop.
//!
//! The endpoint at `/mopidy/ws` pushes every broadcast message to the
//! client and relays client requests to a [`RequestHandler`].

pub mod connection;
pub mod handler;
pub mod messages;
pub mod rpc;

pub use rpc::{NoCoreHandler, RequestHandler};
