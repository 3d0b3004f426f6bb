//! Per-path access outcomes
//!
//! These are the values the UI layer turns into "Ready", "Needs Access" and
//! "Limited by OS" states. Each blocked reason carries a fixed remediation
//! message; the core does not know how it is rendered.

use crate::ScopeStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a path cannot be touched right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeBlockedReason {
    MissingScope,
    StaleBookmark,
    DisconnectedScope,
    SandboxReadDenied,
    SandboxWriteDenied,
    OsProtectedPath,
}

impl ScopeBlockedReason {
    /// Fixed user-facing remediation message
    pub fn remediation(&self) -> &'static str {
        match self {
            ScopeBlockedReason::MissingScope => {
                "No folder access has been granted for this location. Grant access to continue."
            }
            ScopeBlockedReason::StaleBookmark => {
                "Saved folder access has expired. Grant access to this folder again."
            }
            ScopeBlockedReason::DisconnectedScope => {
                "This location is on a disk that is not connected. Reconnect the disk and try again."
            }
            ScopeBlockedReason::SandboxReadDenied => {
                "The system sandbox denied reading this item. Grant access to its folder again."
            }
            ScopeBlockedReason::SandboxWriteDenied => {
                "The system sandbox denied changing this item. Grant access to its folder again."
            }
            ScopeBlockedReason::OsProtectedPath => {
                "This location is protected by the operating system and cannot be accessed."
            }
        }
    }

    /// Returns true if granting (or re-granting) access can resolve this
    pub fn is_grantable(&self) -> bool {
        !matches!(
            self,
            ScopeBlockedReason::OsProtectedPath | ScopeBlockedReason::DisconnectedScope
        )
    }

    /// Maps a non-active scope status to the reason it blocks with.
    ///
    /// Returns `None` for [`ScopeStatus::Active`]. An invalid token needs the
    /// same remedy as a stale one: grant the folder again.
    pub fn for_status(status: ScopeStatus) -> Option<Self> {
        match status {
            ScopeStatus::Active => None,
            ScopeStatus::StaleToken | ScopeStatus::Invalid => Some(Self::StaleBookmark),
            ScopeStatus::Disconnected => Some(Self::DisconnectedScope),
        }
    }
}

impl fmt::Display for ScopeBlockedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.remediation())
    }
}

impl std::error::Error for ScopeBlockedReason {}

/// Derived, per-path access state. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "reason")]
pub enum ScopeAccessState {
    Ready,
    NeedsAccess,
    Limited(ScopeBlockedReason),
}

impl ScopeAccessState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ScopeAccessState::Ready)
    }

    /// The blocking reason, if any. `NeedsAccess` reports `MissingScope`.
    pub fn blocked_reason(&self) -> Option<ScopeBlockedReason> {
        match self {
            ScopeAccessState::Ready => None,
            ScopeAccessState::NeedsAccess => Some(ScopeBlockedReason::MissingScope),
            ScopeAccessState::Limited(reason) => Some(*reason),
        }
    }
}
