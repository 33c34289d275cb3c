//! Server lifecycle events
//!
//! Servers push [`ServerEvent`]s onto a shared [`EventQueue`]; the UI or any
//! other consumer drains them from the matching [`EventReceiver`] in the order
//! each server produced them.

use crate::server::Server;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Event derived from a tunnel status change
#[derive(Clone)]
pub enum ServerEvent {
    /// The server's tunnel is up
    Connected(Arc<Server>),
    /// The server's tunnel went down
    Disconnected(Arc<Server>),
    /// The server's tunnel is re-establishing itself
    Reconnecting(Arc<Server>),
}

/// Discriminant of a [`ServerEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEventKind {
    Connected,
    Disconnected,
    Reconnecting,
}

impl ServerEvent {
    /// The server that produced this event
    pub fn server(&self) -> &Arc<Server> {
        match self {
            ServerEvent::Connected(server)
            | ServerEvent::Disconnected(server)
            | ServerEvent::Reconnecting(server) => server,
        }
    }

    pub fn kind(&self) -> ServerEventKind {
        match self {
            ServerEvent::Connected(_) => ServerEventKind::Connected,
            ServerEvent::Disconnected(_) => ServerEventKind::Disconnected,
            ServerEvent::Reconnecting(_) => ServerEventKind::Reconnecting,
        }
    }
}

impl fmt::Display for ServerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerEventKind::Connected => write!(f, "connected"),
            ServerEventKind::Disconnected => write!(f, "disconnected"),
            ServerEventKind::Reconnecting => write!(f, "reconnecting"),
        }
    }
}

impl fmt::Debug for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerEvent")
            .field("kind", &self.kind())
            .field("server", &self.server().id())
            .finish()
    }
}

/// Producer side of the event queue
///
/// Cheap to clone; every server holds its own handle. Enqueueing never
/// blocks and never fails.
#[derive(Debug, Clone)]
pub struct EventQueue {
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Consumer side of the event queue
#[derive(Debug)]
pub struct EventReceiver {
    receiver: mpsc::UnboundedReceiver<ServerEvent>,
}

impl EventQueue {
    /// Create a queue and its single consumer
    pub fn channel() -> (EventQueue, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (EventQueue { sender }, EventReceiver { receiver })
    }

    /// Append an event
    ///
    /// If the consumer is gone the event is dropped with a warning.
    pub fn enqueue(&self, event: ServerEvent) {
        if let Err(mpsc::error::SendError(event)) = self.sender.send(event) {
            warn!(
                server_id = event.server().id(),
                kind = %event.kind(),
                "Event consumer dropped, discarding event"
            );
        }
    }
}

impl EventReceiver {
    /// Wait for the next event
    ///
    /// Returns None once every producer handle has been dropped and the queue
    /// is drained.
    pub async fn recv(&mut self) -> Option<ServerEvent> {
        self.receiver.recv().await
    }

    /// Take the next event without waiting
    pub fn try_recv(&mut self) -> Option<ServerEvent> {
        self.receiver.try_recv().ok()
    }

    /// Take every event currently queued, in order
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
