//! # Scope Types
//!
//! This crate defines the data model of the access scope subsystem.
//!
//! ## Philosophy
//!
//! - **Grants are data, not behavior**: these types carry no I/O.
//! - **Tokens are opaque**: a [`CapabilityToken`] is a blob minted by the
//!   platform and never interpreted here.
//! - **State is derived**: [`ScopeAccessState`] and [`ScopeCoverageSummary`]
//!   are computed on demand and never stored.
//!
//! ## Key Types
//!
//! - [`AccessScope`]: one durable grant over a filesystem root
//! - [`ScopeStatus`]: health of a grant's token, re-evaluated on refresh
//! - [`ScopeBlockedReason`]: why a path cannot be touched right now
//! - [`ScopeRecord`]: the persisted JSON form of a grant

pub mod access;
pub mod coverage;
pub mod path;
pub mod record;
pub mod scope;
pub mod token;

pub use access::{ScopeAccessState, ScopeBlockedReason};
pub use coverage::{CoverageTier, ScopeCoverageSummary};
pub use path::CanonicalPath;
pub use record::ScopeRecord;
pub use scope::{AccessScope, AccessScopeKind, ScopeId, ScopeStatus};
pub use token::{CapabilityToken, TokenDecodeError};
