//! Network reachability probing

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// Native networking capabilities the core depends on
#[async_trait]
pub trait NativeNetworking: Send + Sync {
    /// Whether a TCP connection to `host:port` can be established
    async fn is_server_reachable(&self, host: &str, port: u16) -> bool;
}

/// Reachability probe that opens a plain TCP connection
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    /// Create a probe that gives up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl NativeNetworking for TcpProbe {
    #[tracing::instrument(skip(self), fields(timeout_ms = self.timeout.as_millis()))]
    async fn is_server_reachable(&self, host: &str, port: u16) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                debug!("Reachability probe failed: {}", e);
                false
            }
            Err(_) => {
                debug!("Reachability probe timed out");
                false
            }
        }
    }
}
