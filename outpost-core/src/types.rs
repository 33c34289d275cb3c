//! Type definitions and wrappers for secure data handling
//!
//! This module provides the access key describing a proxy endpoint, and a
//! secrecy wrapper so the proxy password never ends up in logs or debug
//! output.

use crate::cipher;
use crate::error::ConfigError;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wrapper for the Shadowsocks password of a proxy
///
/// Debug output is redacted by the secrecy crate.
#[derive(Clone, Debug)]
pub struct ProxyPassword(Secret<String>);

impl ProxyPassword {
    /// Create a new ProxyPassword
    pub fn new(password: String) -> Self {
        Self(Secret::new(password))
    }

    /// Expose the password value (use with caution!)
    ///
    /// This should only be called when handing the password to the
    /// tunnel engine.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for ProxyPassword {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

impl PartialEq for ProxyPassword {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for ProxyPassword {}

impl<'de> Deserialize<'de> for ProxyPassword {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Serialized in plain text for the config file
impl Serialize for ProxyPassword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

/// Connection parameters for one proxy
///
/// Everything but `name` is fixed once the key is built.
#[derive(Clone, Debug)]
pub struct AccessKey {
    id: String,
    host: String,
    port: u16,
    cipher: String,
    password: ProxyPassword,
    /// Human-readable display name
    pub name: Option<String>,
    is_outline_server: bool,
}

impl AccessKey {
    /// Create a new access key
    pub fn new(
        id: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        cipher: impl Into<String>,
        password: ProxyPassword,
    ) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
            cipher: cipher.into(),
            password,
            name: None,
            is_outline_server: false,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the key as issued by a trusted first-party server
    pub fn with_outline_server(mut self, is_outline_server: bool) -> Self {
        self.is_outline_server = is_outline_server;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn cipher(&self) -> &str {
        &self.cipher
    }

    pub fn password(&self) -> &ProxyPassword {
        &self.password
    }

    pub fn is_outline_server(&self) -> bool {
        self.is_outline_server
    }

    /// `host:port` of the proxy
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the key before it is used for a connection
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnsupportedCipher` if the cipher is not on the
    /// allow-list, or `ConfigError::ValidationError` for an empty host or a
    /// zero port.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::ValidationError {
                message: format!("Server {} has an empty host", self.id),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::ValidationError {
                message: format!("Server {} has port zero", self.id),
            });
        }

        if !cipher::is_supported(&self.cipher) {
            return Err(ConfigError::UnsupportedCipher {
                cipher: self.cipher.clone(),
            });
        }

        Ok(())
    }
}
