//! Persisted form of an access scope
//!
//! The registry file is a JSON array of these records. Status is not
//! persisted; it is re-derived on load.

use crate::{AccessScope, AccessScopeKind, CanonicalPath, CapabilityToken, ScopeId, ScopeStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRecord {
    pub id: ScopeId,
    pub kind: AccessScopeKind,
    pub canonical_root_path: String,
    /// Base64 token blob
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub last_validated_at: DateTime<Utc>,
}

impl ScopeRecord {
    pub fn from_scope(scope: &AccessScope) -> Self {
        Self {
            id: scope.id,
            kind: scope.kind,
            canonical_root_path: scope.canonical_root.to_string(),
            token: scope.token.to_base64(),
            created_at: scope.created_at,
            last_validated_at: scope.last_validated_at,
        }
    }

    /// Converts back into a scope.
    ///
    /// A token that fails to decode yields an empty token and
    /// [`ScopeStatus::Invalid`] instead of failing the whole registry.
    pub fn into_scope(self) -> AccessScope {
        let (token, status) = match CapabilityToken::from_base64(&self.token) {
            Ok(token) => (token, ScopeStatus::Active),
            Err(_) => (CapabilityToken::from_bytes(Vec::new()), ScopeStatus::Invalid),
        };
        AccessScope {
            id: self.id,
            kind: self.kind,
            canonical_root: CanonicalPath::from_normalized(&self.canonical_root_path),
            token,
            created_at: self.created_at,
            last_validated_at: self.last_validated_at,
            status,
        }
    }
}
