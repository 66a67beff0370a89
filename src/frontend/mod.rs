//! The lifecycle-managed HTTP frontend.
//!
//! A [`Frontend`] is a single actor task that owns the configuration, the
//! running [`crate::server::ServerHandle`], the broadcast bridge, and the
//! discovery registrar. It is driven through a [`FrontendHandle`]:
//!
//! ```text
//! Created --start--> Running --stop--> Stopped --start--> Running ...
//!                      |  ^
//!                      +--+ on_event (broadcast)
//! ```
//!
//! Start brings up the server, then discovery, then the event listener.
//! Stop tears them down in reverse.

pub mod handle;
pub mod lifecycle;

pub use handle::FrontendHandle;
pub use lifecycle::Frontend;

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Spawned, never started.
    Created,
    /// Server bound and serving.
    Running,
    /// Stopped after running.
    Stopped,
}
