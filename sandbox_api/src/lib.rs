//! # Sandbox API
//!
//! This crate defines the seam between the portable access scope core and the
//! platform it runs on.
//!
//! ## Philosophy
//!
//! The platform provides **mechanisms**, the broker decides **policy**:
//! - Minting a token for a root the user picked
//! - Resolving a stored token and reporting whether it went stale
//! - Activating and deactivating a token around I/O
//! - Reporting whether a root is currently reachable
//! - Loading and saving the registry's persisted records
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A filesystem abstraction (I/O goes through `std::fs` inside a lease)
//! - A user interface for picking folders
//! - A definition of what a token contains

pub mod error;
pub mod platform;
pub mod store;

pub use error::{PlatformError, StoreError};
pub use platform::{SandboxPlatform, TokenResolution};
pub use store::RegistryStore;
