//! # mopidy-http
//!
//! HTTP and WebSocket frontend for a media player.
//!
//! This crate serves the web client and the bundled `/mopidy` assets,
//! pushes every backend domain event to all connected WebSocket clients,
//! and advertises the service over Zeroconf. HTTP, static files and the
//! WebSocket protocol are delegated to `axum`/`tower-http`; mDNS is
//! delegated to `mdns-sd`. This crate is the lifecycle and glue.
//!
//! ## Architecture
//!
//! ```text
//! Owning process (main.rs)
//!     │ start / stop
//!     ├── Frontend actor (frontend/)
//!     │     ├── Registrar ── mdns-sd (discovery/)
//!     │     ├── BroadcastBridge (bridge)
//!     │     └── ServerHandle ── axum (server/)
//!     │             └── ConnectionSet ── WS connections (ws/)
//!     │
//!     └── EventBus (domain/) ── domain events ──▶ Frontend actor
//! ```

pub mod app_state;
pub mod bridge;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod frontend;
pub mod server;
pub mod ws;
