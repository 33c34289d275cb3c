//! Configuration module
//!
//! Handles loading and saving the proxy client configuration from TOML files:
//! the configured servers, the tunnel engine to drive, and network probe
//! settings.

use crate::error::ConfigError;
use crate::types::{AccessKey, ProxyPassword};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

pub mod toml_config;

/// One configured proxy server
///
/// This is the on-disk shape; [`ServerEntry::access_key`] turns it into the
/// runtime [`AccessKey`]. The password is held in its secret wrapper from the
/// moment it is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Stable identifier, unique within the file
    pub id: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Proxy hostname or IP address
    pub host: String,

    /// Proxy port
    pub port: u16,

    /// Shadowsocks cipher
    pub cipher: String,

    /// Shadowsocks password
    pub password: ProxyPassword,

    /// Whether the key was issued by a trusted first-party server
    #[serde(default)]
    pub outline_server: bool,
}

impl ServerEntry {
    /// Build the runtime access key for this entry
    pub fn access_key(&self) -> AccessKey {
        let key = AccessKey::new(
            self.id.clone(),
            self.host.clone(),
            self.port,
            self.cipher.clone(),
            self.password.clone(),
        )
        .with_outline_server(self.outline_server);

        match &self.name {
            Some(name) => key.with_name(name.clone()),
            None => key,
        }
    }

    /// Name to show for this server, falling back to its address
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}:{}", self.host, self.port))
    }

    /// Validate the entry, including the cipher allow-list
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::MissingField {
                field: "id".to_string(),
            });
        }

        if self.host.is_empty() {
            return Err(ConfigError::MissingField {
                field: format!("servers.{}.host", self.id),
            });
        }

        self.access_key().validate()
    }
}

/// Tunnel engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelConfig {
    /// Engine executable, looked up in PATH when not absolute
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Extra arguments placed before the proxy arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// How long the engine must stay up before the tunnel counts as started
    #[serde(default = "default_startup_grace_ms")]
    pub startup_grace_ms: u64,

    /// How long to wait after SIGTERM before sending SIGKILL
    #[serde(default = "default_stop_timeout_secs")]
    pub stop_timeout_secs: u64,
}

fn default_program() -> PathBuf {
    PathBuf::from("tun2socks")
}
fn default_startup_grace_ms() -> u64 {
    1000
}
fn default_stop_timeout_secs() -> u64 {
    5
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            startup_grace_ms: default_startup_grace_ms(),
            stop_timeout_secs: default_stop_timeout_secs(),
        }
    }
}

/// Reachability probe settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Timeout for a single TCP reachability probe
    #[serde(default = "default_reachability_timeout_ms")]
    pub reachability_timeout_ms: u64,
}

fn default_reachability_timeout_ms() -> u64 {
    5000
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            reachability_timeout_ms: default_reachability_timeout_ms(),
        }
    }
}

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutpostConfig {
    #[serde(default)]
    pub tunnel: TunnelConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

impl OutpostConfig {
    /// Validate the configuration
    ///
    /// Every server must be valid on its own and ids must be unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tunnel.program.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "tunnel.program".to_string(),
            });
        }

        if self.network.reachability_timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "Reachability timeout cannot be zero".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for server in &self.servers {
            server.validate()?;
            if !seen.insert(server.id.as_str()) {
                return Err(ConfigError::DuplicateServer {
                    id: server.id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Find a server by id
    pub fn server(&self, id: &str) -> Result<&ServerEntry, ConfigError> {
        self.servers
            .iter()
            .find(|server| server.id == id)
            .ok_or_else(|| ConfigError::UnknownServer { id: id.to_string() })
    }
}
