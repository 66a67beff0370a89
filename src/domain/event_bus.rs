//! Broadcast channel for domain events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The player
//! backend publishes every [`DomainEvent`] through the bus; listeners are
//! plain closures registered with [`EventBus::add_listener`].

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::DomainEvent;

/// Broadcast bus for [`DomainEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest events are dropped for
/// lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: DomainEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Registers `listener` to be called with every future event.
    ///
    /// The receiver is created before this returns, so no event published
    /// afterwards is missed. Dropping the returned guard deregisters the
    /// listener.
    pub fn add_listener<F>(&self, listener: F) -> ListenerGuard
    where
        F: Fn(DomainEvent) + Send + 'static,
    {
        let mut rx = self.sender.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => listener(event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "event listener lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        ListenerGuard { task }
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Keeps a listener registered on the [`EventBus`] while alive.
#[derive(Debug)]
pub struct ListenerGuard {
    task: JoinHandle<()>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
