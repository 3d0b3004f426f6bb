//! Access scopes: durable grants over filesystem roots

use crate::{CanonicalPath, CapabilityToken};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of an [`AccessScope`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(Uuid);

impl ScopeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({})", self.0)
    }
}

/// Where a grant came from. Provenance only; it does not change behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessScopeKind {
    Home,
    Applications,
    StartupDisk,
    CustomFolder,
    ExternalVolume,
}

impl fmt::Display for AccessScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessScopeKind::Home => "home",
            AccessScopeKind::Applications => "applications",
            AccessScopeKind::StartupDisk => "startupDisk",
            AccessScopeKind::CustomFolder => "customFolder",
            AccessScopeKind::ExternalVolume => "externalVolume",
        };
        write!(f, "{}", name)
    }
}

/// Health of a scope's token.
///
/// Re-evaluated by the broker's refresh pass; never trusted from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeStatus {
    /// Token resolves and the root is reachable
    Active,
    /// Token resolved but the platform reports it stale and re-minting failed
    StaleToken,
    /// Root is not currently reachable (e.g. volume unmounted)
    Disconnected,
    /// Token payload cannot be deserialized. Terminal until re-granted.
    Invalid,
}

impl ScopeStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ScopeStatus::Active)
    }
}

impl fmt::Display for ScopeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScopeStatus::Active => "active",
            ScopeStatus::StaleToken => "staleToken",
            ScopeStatus::Disconnected => "disconnected",
            ScopeStatus::Invalid => "invalid",
        };
        write!(f, "{}", name)
    }
}

/// A durable grant of access to one filesystem root.
///
/// Owned by the broker's registry; collaborators hold only the [`ScopeId`].
/// There is no `Default`: a scope always carries a token the platform minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessScope {
    pub id: ScopeId,
    pub kind: AccessScopeKind,
    pub canonical_root: CanonicalPath,
    pub token: CapabilityToken,
    pub created_at: DateTime<Utc>,
    pub last_validated_at: DateTime<Utc>,
    pub status: ScopeStatus,
}

impl AccessScope {
    /// Creates a freshly minted, active scope
    pub fn new(
        kind: AccessScopeKind,
        canonical_root: CanonicalPath,
        token: CapabilityToken,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ScopeId::new(),
            kind,
            canonical_root,
            token,
            created_at: now,
            last_validated_at: now,
            status: ScopeStatus::Active,
        }
    }

    /// Returns true if this scope's root equals or contains `path`
    pub fn covers(&self, path: &CanonicalPath) -> bool {
        path.is_within(&self.canonical_root)
    }
}

impl fmt::Display for AccessScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} at {}, {}]",
            self.id, self.kind, self.canonical_root, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(root: &str) -> AccessScope {
        AccessScope::new(
            AccessScopeKind::CustomFolder,
            CanonicalPath::from_normalized(root),
            CapabilityToken::from_bytes(root.as_bytes().to_vec()),
            Utc::now(),
        )
    }

    #[test]
    fn test_new_scope_is_active() {
        let s = scope("/Users/alice");
        assert!(s.status.is_active());
        assert_eq!(s.created_at, s.last_validated_at);
    }

    #[test]
    fn test_scope_ids_are_unique() {
        assert_ne!(scope("/a").id, scope("/a").id);
    }

    #[test]
    fn test_covers() {
        let s = scope("/Users/alice");
        assert!(s.covers(&CanonicalPath::from_normalized("/Users/alice/Desktop")));
        assert!(!s.covers(&CanonicalPath::from_normalized("/Users/alice-archive")));
    }

    #[test]
    fn test_kind_serializes_camel_case() {
        let json = serde_json::to_string(&AccessScopeKind::StartupDisk).unwrap();
        assert_eq!(json, "\"startupDisk\"");
        let kind: AccessScopeKind = serde_json::from_str("\"externalVolume\"").unwrap();
        assert_eq!(kind, AccessScopeKind::ExternalVolume);
    }
}
