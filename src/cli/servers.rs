//! Server inspection commands
//!
//! `ciphers`, `list` and `check`: none of these touch the tunnel.

use crate::cli::{build_server, load, runtime};
use colored::Colorize;
use outpost_core::cipher::SUPPORTED_CIPHERS;
use outpost_core::error::OutpostError;
use outpost_core::events::EventQueue;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// One row of `outpost list`
#[derive(Debug, Serialize)]
struct ServerRow {
    id: String,
    name: String,
    address: String,
    cipher: String,
    outline_server: bool,
}

/// Print the cipher allow-list
pub fn run_ciphers() -> Result<i32, OutpostError> {
    for cipher in SUPPORTED_CIPHERS {
        println!("{}", cipher);
    }
    Ok(0)
}

/// Print the configured servers
pub fn run_list(config_path: Option<&Path>, json: bool) -> Result<i32, OutpostError> {
    let config = load(config_path)?;

    let rows: Vec<ServerRow> = config
        .servers
        .iter()
        .map(|entry| {
            let key = entry.access_key();
            ServerRow {
                id: entry.id.clone(),
                name: entry.display_name(),
                address: key.address(),
                cipher: key.cipher().to_string(),
                outline_server: key.is_outline_server(),
            }
        })
        .collect();

    if json {
        let output = serde_json::to_string_pretty(&rows).map_err(std::io::Error::from)?;
        println!("{}", output);
        return Ok(0);
    }

    if rows.is_empty() {
        println!("No servers configured");
        return Ok(0);
    }

    for row in rows {
        let marker = if row.outline_server { " (outline)" } else { "" };
        println!(
            "{}  {}  {}  {}{}",
            row.id.bold(),
            row.name,
            row.address,
            row.cipher.dimmed(),
            marker
        );
    }

    Ok(0)
}

/// Probe a server's reachability
///
/// Exit code 0 when reachable, 1 otherwise.
pub fn run_check(config_path: Option<&Path>, id: &str) -> Result<i32, OutpostError> {
    let config = load(config_path)?;
    let entry = config.server(id)?;

    let runtime = runtime()?;
    let reachable = runtime.block_on(async {
        // Events are never produced here: the tunnel is not started
        let (queue, _events) = EventQueue::channel();
        let server = build_server(&config, entry, config.tunnel.clone(), queue);
        debug!(server_id = server.id(), "Probing reachability");
        server.check_reachable().await
    });

    if reachable {
        println!("{} {} is reachable", "✓".green(), entry.display_name());
        Ok(0)
    } else {
        println!("{} {} is unreachable", "✗".red(), entry.display_name());
        Ok(1)
    }
}
