//! # Access Broker Service
//!
//! Owns the registry of access scopes and is the only writer of its persisted
//! state.
//!
//! ## Philosophy
//!
//! - **One broker, passed explicitly**: constructed at startup and shared by
//!   handle (`Arc<AccessBroker>`), never a global
//! - **Mutations are serialized, reads are snapshots**: `add_scope`,
//!   `remove_scope` and `refresh_statuses` take the mutation lock; queries read
//!   an immutable `Arc<ScopeRegistry>`
//! - **Every touch is bracketed**: `with_access` acquires a reference-counted
//!   lease and releases it on every exit path, panics included
//! - **Fail open on load, fail loud on save**: a corrupt registry file is an
//!   empty registry; a failed save rolls the mutation back and is reported
//!
//! ## Operations
//!
//! - `add_scope(root)`: grant, dedupe against existing roots, persist
//! - `remove_scope(id)`: delete, persist
//! - `refresh_statuses()`: re-derive every scope's status from the platform
//! - `coverage_summary()`: Minimal / Standard / FullMac
//! - `access_state(path)`: Ready / NeedsAccess / Limited(reason)
//! - `with_access(path, op)`: the sole gateway for touching a path

pub mod broker;
pub mod config;
pub mod error;
pub mod host;
pub mod lease;
pub mod persistence;
pub mod registry;

pub use broker::{AccessBroker, RefreshReport};
pub use config::BrokerConfig;
pub use error::{AccessError, BrokerError, ConfigError};
pub use host::HostPlatform;
pub use lease::{LeaseGuard, LeaseTable};
pub use persistence::JsonFileStore;
pub use registry::ScopeRegistry;
