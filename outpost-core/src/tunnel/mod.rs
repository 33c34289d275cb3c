//! Tunnel backends
//!
//! A [`Tunnel`] is the native component that actually moves packets. The core
//! only starts it, stops it, asks whether it runs, and listens to the status
//! it reports. Each platform backend implements the same trait and is picked
//! when the server is constructed.

pub mod process;

pub use process::ProcessTunnel;

use crate::error_code::ErrorCode;
use crate::types::AccessKey;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Status reported by the tunnel's own state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelStatus {
    Connected,
    Disconnected,
    Reconnecting,
    /// A raw status value this client does not know about
    Unknown(i32),
}

impl TunnelStatus {
    /// Decode the raw status value used by native engines
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => TunnelStatus::Connected,
            1 => TunnelStatus::Disconnected,
            2 => TunnelStatus::Reconnecting,
            other => TunnelStatus::Unknown(other),
        }
    }
}

impl fmt::Display for TunnelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelStatus::Connected => write!(f, "connected"),
            TunnelStatus::Disconnected => write!(f, "disconnected"),
            TunnelStatus::Reconnecting => write!(f, "reconnecting"),
            TunnelStatus::Unknown(raw) => write!(f, "unknown({})", raw),
        }
    }
}

/// Failure reported by a tunnel operation
///
/// Backends tag failures explicitly: either with a native error code, or
/// with an opaque cause that carries no code.
#[derive(Error, Debug)]
pub enum TunnelFailure {
    #[error("Tunnel failed with native error code {0}")]
    Code(ErrorCode),

    #[error(transparent)]
    Cause(#[from] anyhow::Error),
}

/// Callback invoked with every status change
///
/// May be called from any thread, concurrently with pending tunnel
/// operations.
pub type StatusListener = Arc<dyn Fn(TunnelStatus) + Send + Sync>;

/// Contract every tunnel backend implements
#[async_trait]
pub trait Tunnel: Send + Sync {
    /// Establish the tunnel to the proxy described by `access_key`
    async fn start(&self, access_key: &AccessKey) -> Result<(), TunnelFailure>;

    /// Tear the tunnel down
    async fn stop(&self) -> Result<(), TunnelFailure>;

    /// Whether the tunnel is currently up
    async fn is_running(&self) -> bool;

    /// Register the status listener, replacing any previous one
    fn on_status_change(&self, listener: StatusListener);
}
