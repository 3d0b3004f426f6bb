//! Opaque capability tokens
//!
//! The platform mints a token for a root and later activates it to open the
//! sandbox for that root. This crate only stores, encodes and fingerprints it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Persistable grant blob issued by the OS sandbox.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CapabilityToken(Vec<u8>);

/// A token payload that could not be decoded from its persisted form
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("capability token payload is not valid base64: {0}")]
pub struct TokenDecodeError(String);

impl CapabilityToken {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, TokenDecodeError> {
        STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(|e| TokenDecodeError(e.to_string()))
    }

    /// Short SHA-256 fingerprint, safe to log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.0);
        digest[..6].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

// Token bytes stay out of logs and panic messages.
impl fmt::Debug for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilityToken({})", self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_round_trip() {
        let token = CapabilityToken::from_bytes(b"bookmark\x00\x01".to_vec());
        let decoded = CapabilityToken::from_base64(&token.to_base64()).unwrap();
        assert_eq!(decoded, token);
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(CapabilityToken::from_base64("not base64 !!").is_err());
    }

    #[test]
    fn test_debug_hides_bytes() {
        let token = CapabilityToken::from_bytes(b"secret-bookmark".to_vec());
        let debug = format!("{:?}", token);
        assert!(!debug.contains("secret"));
        assert_eq!(token.fingerprint().len(), 12);
    }
}
