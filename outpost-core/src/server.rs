//! Proxy server connection manager
//!
//! A [`Server`] owns one tunnel binding for one configured proxy. It starts
//! and stops the tunnel, translates native failures into domain errors, and
//! turns the tunnel's status reports into [`ServerEvent`]s.
//!
//! The server keeps no connection state of its own: the tunnel's status is
//! authoritative and the status handler is a pure mapping from status to
//! event.

use crate::error::ServerError;
use crate::error_code;
use crate::events::{EventQueue, ServerEvent};
use crate::net::NativeNetworking;
use crate::tunnel::{Tunnel, TunnelFailure, TunnelStatus};
use crate::types::AccessKey;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, Weak};
use tracing::{debug, info, warn};

/// Connection manager for a single proxy server
pub struct Server {
    id: String,
    /// Holds the display name as well, so there is one place to rename
    access_key: RwLock<AccessKey>,
    tunnel: Box<dyn Tunnel>,
    net: Arc<dyn NativeNetworking>,
    event_queue: EventQueue,
}

impl Server {
    /// Create a server and subscribe it to the tunnel's status changes
    ///
    /// The tunnel is owned exclusively by the returned server for its whole
    /// lifetime.
    pub fn new(
        id: impl Into<String>,
        mut access_key: AccessKey,
        name: impl Into<String>,
        tunnel: Box<dyn Tunnel>,
        net: Arc<dyn NativeNetworking>,
        event_queue: EventQueue,
    ) -> Arc<Self> {
        access_key.name = Some(name.into());

        Arc::new_cyclic(|this: &Weak<Server>| {
            let this = this.clone();
            tunnel.on_status_change(Arc::new(move |status: TunnelStatus| match this.upgrade() {
                Some(server) => server.handle_tunnel_status_change(status),
                None => debug!(%status, "Server dropped, ignoring tunnel status"),
            }));

            Server {
                id: id.into(),
                access_key: RwLock::new(access_key),
                tunnel,
                net,
                event_queue,
            }
        })
    }

    fn key(&self) -> RwLockReadGuard<'_, AccessKey> {
        self.access_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> String {
        self.key().name.clone().unwrap_or_default()
    }

    /// Rename the server
    ///
    /// The access key's name is the same field, so both observe the new name
    /// at once.
    pub fn set_name(&self, name: impl Into<String>) {
        self.access_key
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .name = Some(name.into());
    }

    /// Snapshot of the access key
    pub fn access_key(&self) -> AccessKey {
        self.key().clone()
    }

    /// `host:port` of the proxy
    pub fn address(&self) -> String {
        self.key().address()
    }

    /// Whether the access key came from a trusted first-party server
    pub fn is_outline_server(&self) -> bool {
        self.key().is_outline_server()
    }

    /// Start the tunnel
    ///
    /// Returning Ok does not mean a CONNECTED event has been queued; that
    /// arrives through the status handler.
    ///
    /// # Errors
    ///
    /// A failure carrying a native error code becomes
    /// `ServerError::Connection` with the translated kind. Any other failure
    /// is returned unchanged as `ServerError::Tunnel`.
    #[tracing::instrument(skip(self), fields(server_id = %self.id))]
    pub async fn connect(&self) -> Result<(), ServerError> {
        let access_key = self.access_key();
        info!(address = %access_key.address(), "Connecting");

        self.tunnel
            .start(&access_key)
            .await
            .map_err(|failure| match failure {
                TunnelFailure::Code(code) => {
                    let kind = error_code::from_error_code(code);
                    warn!(code = code.value(), %kind, "Tunnel reported native error");
                    ServerError::Connection(kind)
                }
                TunnelFailure::Cause(cause) => {
                    warn!("Tunnel failed to start: {}", cause);
                    ServerError::Tunnel(cause)
                }
            })
    }

    /// Stop the tunnel
    ///
    /// # Errors
    ///
    /// Every failure, whatever its shape, becomes `ServerError::Unexpected`.
    #[tracing::instrument(skip(self), fields(server_id = %self.id))]
    pub async fn disconnect(&self) -> Result<(), ServerError> {
        info!("Disconnecting");

        self.tunnel.stop().await.map_err(|failure| {
            warn!("Tunnel failed to stop: {}", failure);
            ServerError::Unexpected
        })
    }

    /// Whether the tunnel reports itself running
    pub async fn check_running(&self) -> bool {
        self.tunnel.is_running().await
    }

    /// Probe whether the proxy endpoint accepts connections
    ///
    /// Has no effect on the tunnel.
    pub async fn check_reachable(&self) -> bool {
        let (host, port) = {
            let key = self.key();
            (key.host().to_string(), key.port())
        };
        self.net.is_server_reachable(&host, port).await
    }

    /// Map a tunnel status to an event and enqueue it
    fn handle_tunnel_status_change(self: Arc<Self>, status: TunnelStatus) {
        let event = match status {
            TunnelStatus::Connected => ServerEvent::Connected(Arc::clone(&self)),
            TunnelStatus::Disconnected => ServerEvent::Disconnected(Arc::clone(&self)),
            TunnelStatus::Reconnecting => ServerEvent::Reconnecting(Arc::clone(&self)),
            TunnelStatus::Unknown(raw) => {
                warn!(server_id = %self.id, raw, "Received unknown tunnel status");
                return;
            }
        };

        debug!(server_id = %self.id, kind = %event.kind(), "Tunnel status changed");
        self.event_queue.enqueue(event);
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("address", &self.address())
            .finish()
    }
}
