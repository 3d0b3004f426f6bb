//! Platform and store error types

use thiserror::Error;

/// Errors reported by a [`SandboxPlatform`](crate::SandboxPlatform)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The user or the OS refused to issue or honor a token
    #[error("Platform refused access: {0}")]
    Refused(String),

    /// The token payload cannot be deserialized
    #[error("Corrupt capability token: {0}")]
    CorruptToken(String),

    /// The platform could not be reached or answered unexpectedly
    #[error("Platform unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by a [`RegistryStore`](crate::RegistryStore)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Persisted registry could not be read
    #[error("Failed to read registry: {0}")]
    Read(String),

    /// Persisted registry could not be written
    #[error("Failed to write registry: {0}")]
    Write(String),

    /// Registry contents could not be encoded or decoded
    #[error("Failed to (de)serialize registry: {0}")]
    Serialize(String),
}
