//! Core library for the outpost proxy client
//!
//! This crate provides the connection lifecycle for proxy servers: cipher
//! validation, tunnel control, native error translation, and the event queue
//! that carries tunnel status changes to the user-facing layer.

pub mod error;
pub mod types;

pub mod cipher;
pub mod config;
pub mod error_code;
pub mod events;
pub mod net;
pub mod server;
pub mod tunnel;

pub use tracing_subscriber::filter::LevelFilter;

/// Initialize logging infrastructure
///
/// Sets up tracing with systemd journal logging when running under systemd.
/// Otherwise logs to stderr with pretty formatting.
pub fn init_logging(level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Try to use systemd journal logging if available
    #[cfg(target_os = "linux")]
    {
        if std::env::var("JOURNAL_STREAM").is_ok() {
            // We're running under systemd, use journal logging
            let journal_layer = tracing_journald::layer()?;
            tracing_subscriber::registry()
                .with(journal_layer)
                .with(level)
                .try_init()?;
            return Ok(());
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
        .with(level)
        .try_init()?;

    Ok(())
}
