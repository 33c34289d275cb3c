//! Tests for the cipher allow-list and its use during key validation

use outpost_core::cipher::{is_supported, SUPPORTED_CIPHERS};
use outpost_core::error::ConfigError;
use outpost_core::types::{AccessKey, ProxyPassword};

fn key(cipher: &str) -> AccessKey {
    AccessKey::new(
        "k",
        "proxy.example.com",
        443,
        cipher,
        ProxyPassword::new("pw".to_string()),
    )
}

#[test]
fn test_allow_list_contents() {
    assert_eq!(
        SUPPORTED_CIPHERS,
        [
            "chacha20-ietf-poly1305",
            "aes-128-gcm",
            "aes-192-gcm",
            "aes-256-gcm"
        ]
    );
}

#[test]
fn test_case_and_spelling_variants_rejected() {
    let variants = [
        "Chacha20-ietf-poly1305",
        "CHACHA20-IETF-POLY1305",
        "chacha20-poly1305",
        "xchacha20-ietf-poly1305",
        "aes-128-GCM",
        "aes_128_gcm",
        "aes-512-gcm",
        "aes-256-ctr",
        "none",
        "plain",
    ];

    for cipher in variants {
        assert!(!is_supported(cipher), "{} should be rejected", cipher);
    }
}

#[test]
fn test_key_validation_is_a_configuration_error() {
    for cipher in SUPPORTED_CIPHERS {
        assert!(key(cipher).validate().is_ok());
    }

    let error = key("rc4-md5").validate().unwrap_err();
    assert_eq!(
        error,
        ConfigError::UnsupportedCipher {
            cipher: "rc4-md5".to_string()
        }
    );
    assert_eq!(error.message_key(), "error-unsupported-cipher");
}
