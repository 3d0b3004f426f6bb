//! Broker error types

use sandbox_api::StoreError;
use scope_types::{ScopeBlockedReason, ScopeId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from grant lifecycle operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// The platform refused to mint a token, or the root can never be granted
    #[error("Access grant denied for {root}: {reason}")]
    GrantDenied { root: PathBuf, reason: String },

    /// The registry could not be persisted; the in-memory change was rolled back
    #[error("Registry persistence failed: {0}")]
    PersistenceFailure(#[from] StoreError),

    /// A stale reference to a removed scope
    #[error("Scope not found: {0}")]
    ScopeNotFound(ScopeId),
}

/// Outcome of a guarded operation that did not succeed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError<E> {
    /// The path could not be reached; the operation never ran
    #[error("{0}")]
    Blocked(ScopeBlockedReason),

    /// The operation ran and failed; its error is carried unchanged
    #[error("{0}")]
    Operation(E),
}

impl<E> AccessError<E> {
    pub fn blocked_reason(&self) -> Option<ScopeBlockedReason> {
        match self {
            AccessError::Blocked(reason) => Some(*reason),
            AccessError::Operation(_) => None,
        }
    }
}

/// Errors loading a broker configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
