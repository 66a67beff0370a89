//! Frontend error types.
//!
//! [`FrontendError`] is the central error type for the frontend. Only the
//! `start` path surfaces errors to the caller; discovery and per-event
//! serialization failures are logged where they happen and never escalate.

use std::net::SocketAddr;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FrontendError>;

/// Error enum covering every failure the frontend can observe.
///
/// | Variant            | Raised by                 | Propagated? |
/// |--------------------|---------------------------|-------------|
/// | `Config`           | `start` (validation)      | yes         |
/// | `Bind`             | `start` (socket bind)     | yes         |
/// | `AlreadyRunning`   | `start` while running     | yes         |
/// | `Server`           | `stop` (engine task)      | logged      |
/// | `Serialization`    | broadcast bridge          | logged      |
/// | `DiscoveryPublish` | discovery registrar       | logged      |
/// | `NotRunning`       | queries on a stopped one  | yes         |
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    /// The configuration is invalid (port out of range, blank hostname...).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An event field could not be encoded as JSON.
    #[error("failed to serialize event: {0}")]
    Serialization(String),

    /// A discovery record could not be published or unpublished.
    #[error("zeroconf registration of {service_type} failed: {message}")]
    DiscoveryPublish {
        /// Service type of the failing slot (e.g. `_http._tcp`).
        service_type: String,
        /// Transport-provided failure description.
        message: String,
    },

    /// `start` was called while the server is already running.
    #[error("HTTP frontend is already running on {0}")]
    AlreadyRunning(SocketAddr),

    /// The operation requires a running server.
    #[error("HTTP frontend is not running")]
    NotRunning,

    /// The embedded server task failed or panicked.
    #[error("HTTP server error: {0}")]
    Server(String),

    /// The lifecycle actor is gone or dropped a reply.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for FrontendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
