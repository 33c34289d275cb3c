//! CLI command implementations
//!
//! This module contains the implementation of all CLI subcommands, plus the
//! composition root that wires a configured server to its tunnel, network
//! probe, and event queue.

pub mod connect;
pub mod servers;

use outpost_core::config::toml_config::{load_config, load_config_from_path};
use outpost_core::config::{OutpostConfig, ServerEntry, TunnelConfig};
use outpost_core::error::OutpostError;
use outpost_core::events::EventQueue;
use outpost_core::net::TcpProbe;
use outpost_core::server::Server;
use outpost_core::tunnel::ProcessTunnel;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Load the configuration from `--config` or the default location
pub fn load(config_path: Option<&Path>) -> Result<OutpostConfig, OutpostError> {
    match config_path {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    }
}

/// Build the async runtime for commands that talk to the network
pub fn runtime() -> Result<tokio::runtime::Runtime, OutpostError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

/// Construct the server for a configured entry
pub fn build_server(
    config: &OutpostConfig,
    entry: &ServerEntry,
    tunnel: TunnelConfig,
    event_queue: EventQueue,
) -> Arc<Server> {
    let probe = TcpProbe::new(Duration::from_millis(
        config.network.reachability_timeout_ms,
    ));

    Server::new(
        entry.id.clone(),
        entry.access_key(),
        entry.display_name(),
        Box::new(ProcessTunnel::new(tunnel)),
        Arc::new(probe),
        event_queue,
    )
}
