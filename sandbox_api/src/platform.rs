//! Platform token primitive

use crate::PlatformError;
use scope_types::{CanonicalPath, CapabilityToken};

/// What the platform learned from resolving a stored token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResolution {
    /// Root the token currently points at
    pub root: CanonicalPath,
    /// The platform wants the token re-minted before further use
    pub is_stale: bool,
}

/// The platform shim that knows how to mint and use capability tokens.
///
/// Implementations must be shareable across worker threads. `activate` and
/// `deactivate` are called in strict pairs per token by the broker's lease
/// table: once on the first concurrent use and once after the last.
pub trait SandboxPlatform: Send + Sync {
    /// Mints a new token for `root`.
    ///
    /// Fails with [`PlatformError::Refused`] if the user or OS declines.
    fn mint_token(&self, root: &CanonicalPath) -> Result<CapabilityToken, PlatformError>;

    /// Resolves a stored token.
    ///
    /// Fails with [`PlatformError::CorruptToken`] if the payload cannot be
    /// deserialized.
    fn resolve_token(&self, token: &CapabilityToken) -> Result<TokenResolution, PlatformError>;

    /// Opens the sandbox for the token's root
    fn activate(&self, token: &CapabilityToken) -> Result<(), PlatformError>;

    /// Closes the sandbox for the token's root
    fn deactivate(&self, token: &CapabilityToken);

    /// Returns true if `root` is currently reachable (e.g. its volume is mounted)
    fn is_reachable(&self, root: &CanonicalPath) -> bool;
}
