//! Ownership wrapper around one running server instance.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{ConnectionSet, mount};
use crate::app_state::AppState;
use crate::config::FrontendConfig;
use crate::error::{FrontendError, Result};
use crate::ws::RequestHandler;

/// How long [`ServerHandle::stop`] waits for in-flight requests.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A bound, serving HTTP + WebSocket server.
///
/// Dropping the handle without calling [`ServerHandle::stop`] leaves the
/// server task running until the runtime shuts down.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    connections: ConnectionSet,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    /// Binds `config.hostname:config.port`, mounts the routes, and starts
    /// serving in a background task.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Config`] for an invalid configuration and
    /// [`FrontendError::Bind`] when the socket cannot be bound.
    pub async fn start(config: &FrontendConfig, requests: Arc<dyn RequestHandler>) -> Result<Self> {
        config.validate()?;

        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| FrontendError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| FrontendError::Bind { addr, source })?;

        let connections = ConnectionSet::new(config.ws_buffer_capacity);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let state = AppState {
            connections: connections.clone(),
            requests,
            shutdown: shutdown_rx.clone(),
        };
        let router = mount(config, state);

        let mut signal = shutdown_rx;
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = signal.wait_for(|stop| *stop).await;
                })
                .await
        });

        Ok(Self {
            local_addr,
            connections,
            shutdown,
            task,
        })
    }

    /// Address the server is actually bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    #[cfg(test)]
    pub(crate) const fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    /// Delivers `message` to every open WebSocket connection.
    pub fn broadcast(&self, message: impl Into<Arc<str>>) -> usize {
        self.connections.broadcast(message)
    }

    /// Closes all WebSocket connections, stops accepting, and waits for the
    /// server task to finish. The listening socket is released on return.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Server`] if the server task failed or did
    /// not finish within [`SHUTDOWN_GRACE`].
    pub async fn stop(self) -> Result<()> {
        self.shutdown.send_replace(true);

        let mut task = self.task;
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(err))) => Err(FrontendError::Server(err.to_string())),
            Ok(Err(join_err)) => Err(FrontendError::Server(join_err.to_string())),
            Err(_) => {
                task.abort();
                Err(FrontendError::Server(format!(
                    "server did not stop within {}s",
                    SHUTDOWN_GRACE.as_secs()
                )))
            }
        }
    }
}
