//! Caller-side handle to the lifecycle actor.

use std::net::SocketAddr;

use tokio::sync::{mpsc, oneshot};

use super::LifecycleState;
use crate::domain::DomainEvent;
use crate::error::{FrontendError, Result};

/// Messages processed, one at a time, by the lifecycle actor.
#[derive(Debug)]
pub(crate) enum Command {
    Start(oneshot::Sender<Result<SocketAddr>>),
    Stop(oneshot::Sender<Result<()>>),
    Event(DomainEvent),
    State(oneshot::Sender<LifecycleState>),
    LocalAddr(oneshot::Sender<Result<SocketAddr>>),
}

/// Cloneable handle driving one frontend.
///
/// All calls go through the actor's mailbox, so transitions never race.
/// When the last handle is dropped the actor stops a running server and
/// exits.
#[derive(Debug, Clone)]
pub struct FrontendHandle {
    tx: mpsc::Sender<Command>,
}

impl FrontendHandle {
    pub(crate) const fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    pub(crate) fn downgrade(&self) -> mpsc::WeakSender<Command> {
        self.tx.downgrade()
    }

    /// Starts the server and discovery.
    ///
    /// # Errors
    ///
    /// - [`FrontendError::AlreadyRunning`] if the frontend is running.
    /// - [`FrontendError::Config`] for an invalid port or hostname.
    /// - [`FrontendError::Bind`] if the socket cannot be bound.
    pub async fn start(&self) -> Result<SocketAddr> {
        self.request(Command::Start).await?
    }

    /// Withdraws discovery, then stops the server. A no-op when the
    /// frontend is not running.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Server`] if the server did not shut down
    /// cleanly. The frontend is `Stopped` either way.
    pub async fn stop(&self) -> Result<()> {
        self.request(Command::Stop).await?
    }

    /// Current lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Internal`] if the actor has terminated.
    pub async fn state(&self) -> Result<LifecycleState> {
        self.request(Command::State).await
    }

    /// Address the running server is bound to.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::NotRunning`] when the frontend is not
    /// running.
    pub async fn local_addr(&self) -> Result<SocketAddr> {
        self.request(Command::LocalAddr).await?
    }

    /// Queues `event` for broadcast without waiting.
    ///
    /// Events are dropped when the frontend is not running or its mailbox
    /// is full.
    pub fn on_event(&self, event: DomainEvent) {
        deliver(&self.tx, event);
    }

    /// The listener function registered on the event bus.
    ///
    /// Holds only a weak reference to the actor, so a registered listener
    /// does not keep the frontend alive.
    pub fn listener(&self) -> impl Fn(DomainEvent) + Send + Sync + use<> {
        listener_for(self.downgrade())
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(make(reply_tx)).await.map_err(|_| actor_gone())?;
        reply_rx.await.map_err(|_| actor_gone())
    }
}

pub(crate) fn listener_for(
    tx: mpsc::WeakSender<Command>,
) -> impl Fn(DomainEvent) + Send + Sync + 'static {
    move |event| {
        if let Some(tx) = tx.upgrade() {
            deliver(&tx, event);
        }
    }
}

fn deliver(tx: &mpsc::Sender<Command>, event: DomainEvent) {
    match tx.try_send(Command::Event(event)) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(Command::Event(event))) => {
            tracing::warn!(event = event.name(), "frontend mailbox full, dropping event");
        }
        Err(mpsc::error::TrySendError::Full(_)) => {}
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::trace!("frontend gone, dropping event");
        }
    }
}

fn actor_gone() -> FrontendError {
    FrontendError::Internal("HTTP frontend actor has terminated".to_string())
}
