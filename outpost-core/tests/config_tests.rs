//! Unit tests for configuration parsing and validation
//!
//! Tests OutpostConfig validation logic, including the cipher gate that runs
//! before any connection attempt.

use outpost_core::config::toml_config::load_config_from_path;
use outpost_core::config::{OutpostConfig, ServerEntry};
use outpost_core::error::{ConfigError, OutpostError};
use std::io::Write;
use tempfile::NamedTempFile;

fn entry(id: &str) -> ServerEntry {
    ServerEntry {
        id: id.to_string(),
        name: None,
        host: "203.0.113.10".to_string(),
        port: 8388,
        cipher: "aes-128-gcm".to_string(),
        password: "secret".to_string().into(),
        outline_server: false,
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_minimal_file_uses_defaults() {
    let file = write_config(
        r#"
[[servers]]
id = "home"
host = "203.0.113.10"
port = 8388
cipher = "chacha20-ietf-poly1305"
password = "secret"
"#,
    );

    let config = load_config_from_path(file.path()).unwrap();

    assert_eq!(config.tunnel.program.to_str(), Some("tun2socks"));
    assert!(config.tunnel.args.is_empty());
    assert_eq!(config.tunnel.startup_grace_ms, 1000);
    assert_eq!(config.tunnel.stop_timeout_secs, 5);
    assert_eq!(config.network.reachability_timeout_ms, 5000);
    assert_eq!(config.servers.len(), 1);
    assert!(!config.servers[0].outline_server);
}

#[test]
fn test_full_file() {
    let file = write_config(
        r#"
[tunnel]
program = "/usr/local/bin/engine"
args = ["--tun", "outline-tun0"]
startup_grace_ms = 250
stop_timeout_secs = 2

[network]
reachability_timeout_ms = 1500

[[servers]]
id = "home"
name = "Home proxy"
host = "203.0.113.10"
port = 8388
cipher = "aes-256-gcm"
password = "secret"
outline_server = true
"#,
    );

    let config = load_config_from_path(file.path()).unwrap();
    let server = config.server("home").unwrap();

    assert_eq!(config.tunnel.args, vec!["--tun", "outline-tun0"]);
    assert_eq!(config.network.reachability_timeout_ms, 1500);
    assert_eq!(server.display_name(), "Home proxy");

    let key = server.access_key();
    assert_eq!(key.name.as_deref(), Some("Home proxy"));
    assert_eq!(key.address(), "203.0.113.10:8388");
    assert!(key.is_outline_server());
    assert_eq!(key.password().expose(), "secret");
}

#[test]
fn test_password_redacted_in_debug() {
    let file = write_config(
        r#"
[[servers]]
id = "home"
host = "203.0.113.10"
port = 8388
cipher = "aes-256-gcm"
password = "hunter2"
"#,
    );

    let config = load_config_from_path(file.path()).unwrap();

    assert!(!format!("{:?}", config).contains("hunter2"));
    assert!(!format!("{:?}", config.servers[0]).contains("hunter2"));
    assert_eq!(config.servers[0].password.expose(), "hunter2");
}

#[test]
fn test_unsupported_cipher_rejected_on_load() {
    let file = write_config(
        r#"
[[servers]]
id = "legacy"
host = "203.0.113.10"
port = 8388
cipher = "aes-256-cfb"
password = "secret"
"#,
    );

    let result = load_config_from_path(file.path());
    assert!(matches!(
        result,
        Err(OutpostError::Config(ConfigError::UnsupportedCipher { ref cipher })) if cipher == "aes-256-cfb"
    ));
}

#[test]
fn test_malformed_toml() {
    let file = write_config("[[servers]\nid = ");
    assert!(matches!(
        load_config_from_path(file.path()),
        Err(OutpostError::Toml(_))
    ));
}

#[test]
fn test_duplicate_ids() {
    let config = OutpostConfig {
        servers: vec![entry("a"), entry("b"), entry("a")],
        ..OutpostConfig::default()
    };

    assert_eq!(
        config.validate(),
        Err(ConfigError::DuplicateServer {
            id: "a".to_string()
        })
    );
}

#[test]
fn test_missing_fields() {
    let mut server = entry("");
    assert!(matches!(
        server.validate(),
        Err(ConfigError::MissingField { .. })
    ));

    server.id = "a".to_string();
    server.host = String::new();
    assert!(matches!(
        server.validate(),
        Err(ConfigError::MissingField { .. })
    ));
}

#[test]
fn test_zero_port() {
    let mut server = entry("a");
    server.port = 0;
    assert!(matches!(
        server.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn test_zero_probe_timeout() {
    let mut config = OutpostConfig::default();
    config.network.reachability_timeout_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_unknown_server_lookup() {
    let config = OutpostConfig {
        servers: vec![entry("a")],
        ..OutpostConfig::default()
    };

    assert!(config.server("a").is_ok());
    assert_eq!(
        config.server("b").unwrap_err(),
        ConfigError::UnknownServer {
            id: "b".to_string()
        }
    );
}

#[test]
fn test_display_name_falls_back_to_address() {
    assert_eq!(entry("a").display_name(), "203.0.113.10:8388");
}
