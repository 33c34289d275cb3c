//! TOML configuration file I/O
//!
//! Handles loading and saving the client configuration to/from TOML files
//! in the user's configuration directory.

use crate::config::OutpostConfig;
use crate::error::{ConfigError, OutpostError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default configuration directory
///
/// Returns ~/.config/outpost, or OUTPOST_CONFIG_DIR if set
pub fn get_config_dir() -> Result<PathBuf, OutpostError> {
    // Allow tests to override config directory via environment variable
    if let Ok(config_dir) = std::env::var("OUTPOST_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        OutpostError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("outpost"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, OutpostError> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from the default TOML file
pub fn load_config() -> Result<OutpostConfig, OutpostError> {
    let config_path = get_config_path()?;
    load_config_from_path(&config_path)
}

/// Load configuration from a specific TOML file
///
/// The configuration is validated before it is returned, so every server in
/// it already passed the cipher allow-list.
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<OutpostConfig, OutpostError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => OutpostError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => OutpostError::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let config: OutpostConfig = toml::from_str(&contents)?;
    config.validate()?;

    debug!(
        "Loaded {} server(s) from {:?}",
        config.servers.len(),
        path.as_ref()
    );
    Ok(config)
}

/// Save configuration to a specific TOML file
pub fn save_config_to_path<P: AsRef<Path>>(
    config: &OutpostConfig,
    path: P,
) -> Result<(), OutpostError> {
    // Validate configuration before saving
    config.validate()?;

    // Ensure config directory exists
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            OutpostError::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    let contents = toml::to_string_pretty(config)?;

    std::fs::write(&path, contents).map_err(|_e| {
        OutpostError::Config(ConfigError::SaveFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        })
    })?;

    info!("Saved configuration to {:?}", path.as_ref());
    Ok(())
}
