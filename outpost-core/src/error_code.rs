//! Native error code translation
//!
//! The tunnel engine reports failures as small integer codes. This module is
//! the only place that knows that vocabulary; everything above it works with
//! [`ConnectionErrorKind`].

use std::fmt;
use thiserror::Error;

/// Raw error code reported by the native tunnel engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const NO_ERROR: ErrorCode = ErrorCode(0);
    pub const UNEXPECTED: ErrorCode = ErrorCode(1);
    pub const VPN_PERMISSION_NOT_GRANTED: ErrorCode = ErrorCode(2);
    pub const INVALID_SERVER_CREDENTIALS: ErrorCode = ErrorCode(3);
    pub const UDP_RELAY_NOT_ENABLED: ErrorCode = ErrorCode(4);
    pub const SERVER_UNREACHABLE: ErrorCode = ErrorCode(5);
    pub const VPN_START_FAILURE: ErrorCode = ErrorCode(6);
    pub const ILLEGAL_SERVER_CONFIGURATION: ErrorCode = ErrorCode(7);
    pub const SHADOWSOCKS_START_FAILURE: ErrorCode = ErrorCode(8);
    pub const CONFIGURE_SYSTEM_PROXY_FAILURE: ErrorCode = ErrorCode(9);
    pub const NO_ADMIN_PERMISSIONS: ErrorCode = ErrorCode(10);
    pub const UNSUPPORTED_ROUTING_TABLE: ErrorCode = ErrorCode(11);
    pub const SYSTEM_MISCONFIGURED: ErrorCode = ErrorCode(12);

    /// Raw integer value
    pub fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Domain-level reason a connection attempt failed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionErrorKind {
    #[error("Unexpected error while connecting")]
    Unexpected,

    #[error("VPN permission was not granted")]
    VpnPermissionNotGranted,

    /// Authentication against the proxy failed
    #[error("Invalid server credentials")]
    InvalidServerCredentials,

    #[error("The server does not forward UDP traffic")]
    RemoteUdpForwardingDisabled,

    #[error("Server unreachable")]
    ServerUnreachable,

    #[error("Failed to start the VPN")]
    VpnStartFailure,

    /// Rejected server parameters, including a cipher the engine refuses
    #[error("Illegal server configuration")]
    IllegalServerConfiguration,

    #[error("Failed to start the Shadowsocks client")]
    ShadowsocksStartFailure,

    #[error("Failed to configure the system proxy")]
    ConfigureSystemProxyFailure,

    #[error("Administrator permissions are required")]
    NoAdminPermissions,

    #[error("Unsupported routing table")]
    UnsupportedRoutingTable,

    #[error("The system is misconfigured")]
    SystemMisconfigured,
}

impl ConnectionErrorKind {
    /// Every kind, in native code order
    pub const ALL: [ConnectionErrorKind; 12] = [
        ConnectionErrorKind::Unexpected,
        ConnectionErrorKind::VpnPermissionNotGranted,
        ConnectionErrorKind::InvalidServerCredentials,
        ConnectionErrorKind::RemoteUdpForwardingDisabled,
        ConnectionErrorKind::ServerUnreachable,
        ConnectionErrorKind::VpnStartFailure,
        ConnectionErrorKind::IllegalServerConfiguration,
        ConnectionErrorKind::ShadowsocksStartFailure,
        ConnectionErrorKind::ConfigureSystemProxyFailure,
        ConnectionErrorKind::NoAdminPermissions,
        ConnectionErrorKind::UnsupportedRoutingTable,
        ConnectionErrorKind::SystemMisconfigured,
    ];

    /// Stable message key for the user-facing layer
    pub fn message_key(self) -> &'static str {
        match self {
            ConnectionErrorKind::Unexpected => "error-unexpected",
            ConnectionErrorKind::VpnPermissionNotGranted => "error-vpn-permission-not-granted",
            ConnectionErrorKind::InvalidServerCredentials => "error-invalid-server-credentials",
            ConnectionErrorKind::RemoteUdpForwardingDisabled => "error-udp-forwarding-disabled",
            ConnectionErrorKind::ServerUnreachable => "error-server-unreachable",
            ConnectionErrorKind::VpnStartFailure => "error-vpn-start-failure",
            ConnectionErrorKind::IllegalServerConfiguration => "error-illegal-server-configuration",
            ConnectionErrorKind::ShadowsocksStartFailure => "error-shadowsocks-start-failure",
            ConnectionErrorKind::ConfigureSystemProxyFailure => {
                "error-configure-system-proxy-failure"
            }
            ConnectionErrorKind::NoAdminPermissions => "error-no-admin-permissions",
            ConnectionErrorKind::UnsupportedRoutingTable => "error-unsupported-routing-table",
            ConnectionErrorKind::SystemMisconfigured => "error-system-misconfigured",
        }
    }
}

/// Translate a native error code into a domain kind
///
/// Total over `i32`: codes outside the table, and `NO_ERROR` arriving as a
/// failure, map to [`ConnectionErrorKind::Unexpected`].
pub fn from_error_code(code: ErrorCode) -> ConnectionErrorKind {
    match code {
        ErrorCode::VPN_PERMISSION_NOT_GRANTED => ConnectionErrorKind::VpnPermissionNotGranted,
        ErrorCode::INVALID_SERVER_CREDENTIALS => ConnectionErrorKind::InvalidServerCredentials,
        ErrorCode::UDP_RELAY_NOT_ENABLED => ConnectionErrorKind::RemoteUdpForwardingDisabled,
        ErrorCode::SERVER_UNREACHABLE => ConnectionErrorKind::ServerUnreachable,
        ErrorCode::VPN_START_FAILURE => ConnectionErrorKind::VpnStartFailure,
        ErrorCode::ILLEGAL_SERVER_CONFIGURATION => ConnectionErrorKind::IllegalServerConfiguration,
        ErrorCode::SHADOWSOCKS_START_FAILURE => ConnectionErrorKind::ShadowsocksStartFailure,
        ErrorCode::CONFIGURE_SYSTEM_PROXY_FAILURE => {
            ConnectionErrorKind::ConfigureSystemProxyFailure
        }
        ErrorCode::NO_ADMIN_PERMISSIONS => ConnectionErrorKind::NoAdminPermissions,
        ErrorCode::UNSUPPORTED_ROUTING_TABLE => ConnectionErrorKind::UnsupportedRoutingTable,
        ErrorCode::SYSTEM_MISCONFIGURED => ConnectionErrorKind::SystemMisconfigured,
        _ => ConnectionErrorKind::Unexpected,
    }
}
