//! Error types for the outpost proxy client
//!
//! This module defines all error types used throughout the application,
//! providing consistent error handling and stable message keys for the
//! user-facing layer.

use crate::error_code::ConnectionErrorKind;
use thiserror::Error;

/// Main error type for the outpost application
#[derive(Error, Debug)]
pub enum OutpostError {
    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised by a server's connection lifecycle
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Configuration-related errors
///
/// These are detected before any connection attempt reaches the tunnel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save configuration file: {path}")]
    SaveFailed { path: String },

    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("Unsupported cipher: {cipher}")]
    UnsupportedCipher { cipher: String },

    #[error("Duplicate server id: {id}")]
    DuplicateServer { id: String },

    #[error("No server configured with id: {id}")]
    UnknownServer { id: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

impl ConfigError {
    /// Stable message key for the user-facing layer
    pub fn message_key(&self) -> &'static str {
        match self {
            ConfigError::LoadFailed { .. } => "error-config-not-found",
            ConfigError::SaveFailed { .. } => "error-config-save-failed",
            ConfigError::MissingField { .. } => "error-config-missing-field",
            ConfigError::ValidationError { .. } => "error-invalid-configuration",
            ConfigError::UnsupportedCipher { .. } => "error-unsupported-cipher",
            ConfigError::DuplicateServer { .. } => "error-duplicate-server",
            ConfigError::UnknownServer { .. } => "error-unknown-server",
            ConfigError::IoError { .. } => "error-config-io",
        }
    }
}

/// Errors surfaced by [`crate::server::Server`] operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// The tunnel reported a native error code, translated to a domain kind
    #[error(transparent)]
    Connection(#[from] ConnectionErrorKind),

    /// Catch-all used for every disconnect failure
    #[error("Unexpected error in the tunnel")]
    Unexpected,

    /// A tunnel failure that carried no native code, passed through as-is
    #[error(transparent)]
    Tunnel(anyhow::Error),
}

impl ServerError {
    /// Stable message key for the user-facing layer
    pub fn message_key(&self) -> &'static str {
        match self {
            ServerError::Connection(kind) => kind.message_key(),
            ServerError::Unexpected | ServerError::Tunnel(_) => "error-unexpected",
        }
    }

    /// The translated connection kind, if this error came from a native code
    pub fn connection_kind(&self) -> Option<ConnectionErrorKind> {
        match self {
            ServerError::Connection(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, OutpostError>;
