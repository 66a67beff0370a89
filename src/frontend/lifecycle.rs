//! The lifecycle actor.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::LifecycleState;
use super::handle::{Command, FrontendHandle, listener_for};
use crate::bridge::BroadcastBridge;
use crate::config::FrontendConfig;
use crate::discovery::{DiscoveryTransport, MdnsTransport, Registrar};
use crate::domain::{DomainEvent, EventBus, ListenerGuard};
use crate::error::{FrontendError, Result};
use crate::server::ServerHandle;
use crate::ws::{NoCoreHandler, RequestHandler};

/// Builder for a frontend actor.
///
/// ```no_run
/// # async fn demo() -> Result<(), mopidy_http::error::FrontendError> {
/// use mopidy_http::config::FrontendConfig;
/// use mopidy_http::domain::EventBus;
/// use mopidy_http::frontend::Frontend;
///
/// let bus = EventBus::new(1_000);
/// let frontend = Frontend::builder(FrontendConfig::new("0.0.0.0", 6680))
///     .event_bus(bus.clone())
///     .spawn();
/// let addr = frontend.start().await?;
/// # let _ = addr;
/// frontend.stop().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Frontend {
    config: FrontendConfig,
    discovery: Option<Arc<dyn DiscoveryTransport>>,
    requests: Option<Arc<dyn RequestHandler>>,
    events: Option<EventBus>,
}

impl Frontend {
    /// Starts building a frontend for `config`.
    #[must_use]
    pub fn builder(config: FrontendConfig) -> Self {
        Self {
            config,
            discovery: None,
            requests: None,
            events: None,
        }
    }

    /// Uses `transport` for Zeroconf records instead of mDNS.
    #[must_use]
    pub fn discovery(mut self, transport: Arc<dyn DiscoveryTransport>) -> Self {
        self.discovery = Some(transport);
        self
    }

    /// Relays WebSocket requests to `handler`.
    #[must_use]
    pub fn request_handler(mut self, handler: Arc<dyn RequestHandler>) -> Self {
        self.requests = Some(handler);
        self
    }

    /// Listens on `bus` for domain events while running.
    #[must_use]
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Spawns the actor on the current tokio runtime. The frontend starts
    /// out `Created`.
    #[must_use]
    pub fn spawn(self) -> FrontendHandle {
        let (tx, rx) = mpsc::channel(self.config.mailbox_capacity.max(1));
        let handle = FrontendHandle::new(tx);

        let transport = self
            .discovery
            .unwrap_or_else(|| Arc::new(MdnsTransport::new()) as Arc<dyn DiscoveryTransport>);
        let actor = Actor {
            registrar: Registrar::new(transport),
            requests: self
                .requests
                .unwrap_or_else(|| Arc::new(NoCoreHandler) as Arc<dyn RequestHandler>),
            events: self.events,
            mailbox: handle.downgrade(),
            config: self.config,
            phase: Phase::Created,
        };
        tokio::spawn(actor.run(rx));
        handle
    }
}

/// Resources that exist only while running.
struct Running {
    server: ServerHandle,
    listener: Option<ListenerGuard>,
}

enum Phase {
    Created,
    Running(Running),
    Stopped,
}

struct Actor {
    config: FrontendConfig,
    registrar: Registrar,
    requests: Arc<dyn RequestHandler>,
    events: Option<EventBus>,
    mailbox: mpsc::WeakSender<Command>,
    phase: Phase,
}

impl Actor {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Start(reply) => {
                    let _ = reply.send(self.start().await);
                }
                Command::Stop(reply) => {
                    let _ = reply.send(self.stop().await);
                }
                Command::Event(event) => self.on_event(&event),
                Command::State(reply) => {
                    let _ = reply.send(self.state());
                }
                Command::LocalAddr(reply) => {
                    let _ = reply.send(self.local_addr());
                }
            }
        }

        if let Err(err) = self.stop().await {
            tracing::warn!(error = %err, "HTTP server did not stop cleanly");
        }
    }

    async fn start(&mut self) -> Result<SocketAddr> {
        if let Phase::Running(running) = &self.phase {
            return Err(FrontendError::AlreadyRunning(running.server.local_addr()));
        }

        tracing::debug!("starting HTTP server");
        let server = ServerHandle::start(&self.config, Arc::clone(&self.requests)).await?;
        let addr = server.local_addr();
        tracing::info!(%addr, "HTTP server running");

        self.registrar.enable(&self.config);

        let listener = self
            .events
            .as_ref()
            .map(|bus| bus.add_listener(listener_for(self.mailbox.clone())));

        self.phase = Phase::Running(Running {
            server,
            listener,
        });
        Ok(addr)
    }

    async fn stop(&mut self) -> Result<()> {
        if !matches!(self.phase, Phase::Running(_)) {
            return Ok(());
        }
        let Phase::Running(running) = std::mem::replace(&mut self.phase, Phase::Stopped) else {
            return Ok(());
        };

        tracing::debug!("stopping HTTP server");
        drop(running.listener);
        self.registrar.disable();

        let result = running.server.stop().await;
        match &result {
            Ok(()) => tracing::info!("stopped HTTP server"),
            Err(err) => tracing::warn!(error = %err, "HTTP server stopped with an error"),
        }
        result
    }

    fn on_event(&self, event: &DomainEvent) {
        match &self.phase {
            Phase::Running(running) => {
                BroadcastBridge::new(&running.server).forward(event);
            }
            Phase::Created | Phase::Stopped => {
                tracing::trace!(event = event.name(), "not running, dropping event");
            }
        }
    }

    fn state(&self) -> LifecycleState {
        match self.phase {
            Phase::Created => LifecycleState::Created,
            Phase::Running(_) => LifecycleState::Running,
            Phase::Stopped => LifecycleState::Stopped,
        }
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        match &self.phase {
            Phase::Running(running) => Ok(running.server.local_addr()),
            Phase::Created | Phase::Stopped => Err(FrontendError::NotRunning),
        }
    }
}
