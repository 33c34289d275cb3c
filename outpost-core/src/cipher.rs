//! Cipher allow-list
//!
//! The tunnel engine only speaks AEAD Shadowsocks ciphers. Anything else is
//! rejected while the access key is validated, before a connection attempt
//! reaches native code.

/// Ciphers the tunnel engine accepts
pub const SUPPORTED_CIPHERS: [&str; 4] = [
    "chacha20-ietf-poly1305",
    "aes-128-gcm",
    "aes-192-gcm",
    "aes-256-gcm",
];

/// Check a cipher name against the allow-list
///
/// Exact, case-sensitive match. No normalization is applied.
pub fn is_supported(cipher: &str) -> bool {
    SUPPORTED_CIPHERS.contains(&cipher)
}
