//! Connect command
//!
//! Starts the tunnel for one server and prints its events until the user
//! interrupts or the tunnel goes down on its own.

use crate::cli::{build_server, load, runtime};
use colored::Colorize;
use outpost_core::error::{ConfigError, OutpostError};
use outpost_core::events::{EventQueue, EventReceiver, ServerEvent, ServerEventKind};
use outpost_core::server::Server;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// How long to wait for the DISCONNECTED event after a user disconnect
const DISCONNECT_EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Run the connect command
///
/// Exit code 0 after a user-requested disconnect, 1 if the tunnel stopped by
/// itself.
pub fn run_connect(config_path: Option<&Path>, id: &str) -> Result<i32, OutpostError> {
    let config = load(config_path)?;
    let entry = config.server(id)?;

    let mut tunnel = config.tunnel.clone();
    let program = which::which(&tunnel.program).map_err(|e| ConfigError::ValidationError {
        message: format!(
            "Tunnel engine {} not found: {}",
            tunnel.program.display(),
            e
        ),
    })?;
    tunnel.program = program;

    let runtime = runtime()?;
    runtime.block_on(async {
        let (queue, mut events) = EventQueue::channel();
        let server = build_server(&config, entry, tunnel, queue);

        println!("Connecting to {} ({})", server.name(), server.address());
        server.connect().await?;
        info!(server_id = server.id(), "Tunnel started");

        watch_events(&server, &mut events).await
    })
}

/// Print events until Ctrl-C or an unrequested disconnect
async fn watch_events(server: &Server, events: &mut EventReceiver) -> Result<i32, OutpostError> {
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    return Ok(1);
                };
                print_event(&event);
                if event.kind() == ServerEventKind::Disconnected {
                    println!("Tunnel stopped");
                    return Ok(1);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Disconnecting from {}", server.name());
                server.disconnect().await?;

                if let Ok(Some(event)) =
                    tokio::time::timeout(DISCONNECT_EVENT_TIMEOUT, events.recv()).await
                {
                    print_event(&event);
                }
                return Ok(0);
            }
        }
    }
}

fn print_event(event: &ServerEvent) {
    let kind = event.kind().to_string();
    let kind = match event.kind() {
        ServerEventKind::Connected => kind.green(),
        ServerEventKind::Reconnecting => kind.yellow(),
        ServerEventKind::Disconnected => kind.red(),
    };

    println!(
        "[{}] {} {}",
        chrono::Local::now().format("%H:%M:%S"),
        event.server().name(),
        kind
    );
}
