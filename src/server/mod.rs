//! Embedded HTTP + WebSocket server.
//!
//! [`ServerHandle`] owns one running axum server; [`mount`] builds its
//! fixed route table; [`ConnectionSet`] is the broadcast fan-out point all
//! WebSocket connections join.

pub mod connections;
pub mod handle;
pub mod mount;

pub use connections::ConnectionSet;
pub use handle::ServerHandle;
pub use mount::mount;
