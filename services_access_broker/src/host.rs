//! Pass-through platform for hosts without an OS sandbox
//!
//! Tokens simply encode the root path. Activation is a no-op and reachability
//! is whether the root exists.

use sandbox_api::{PlatformError, SandboxPlatform, TokenResolution};
use scope_types::{CanonicalPath, CapabilityToken};

const TOKEN_PREFIX: &str = "host:";

#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatform;

impl HostPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl SandboxPlatform for HostPlatform {
    fn mint_token(&self, root: &CanonicalPath) -> Result<CapabilityToken, PlatformError> {
        if !root.as_path().exists() {
            return Err(PlatformError::Refused(format!("{} does not exist", root)));
        }
        Ok(CapabilityToken::from_bytes(
            format!("{}{}", TOKEN_PREFIX, root).into_bytes(),
        ))
    }

    fn resolve_token(&self, token: &CapabilityToken) -> Result<TokenResolution, PlatformError> {
        let text = std::str::from_utf8(token.as_bytes())
            .map_err(|_| PlatformError::CorruptToken("token is not UTF-8".to_string()))?;
        let root = text
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| PlatformError::CorruptToken("not a host token".to_string()))?;
        Ok(TokenResolution {
            root: CanonicalPath::from_normalized(root),
            is_stale: false,
        })
    }

    fn activate(&self, _token: &CapabilityToken) -> Result<(), PlatformError> {
        Ok(())
    }

    fn deactivate(&self, _token: &CapabilityToken) {}

    fn is_reachable(&self, root: &CanonicalPath) -> bool {
        root.as_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_requires_existing_root() {
        let dir = tempfile::tempdir().unwrap();
        let platform = HostPlatform::new();
        let root = CanonicalPath::from_normalized(dir.path());
        let token = platform.mint_token(&root).unwrap();
        assert_eq!(platform.resolve_token(&token).unwrap().root, root);

        let missing = root.join("missing");
        assert!(matches!(
            platform.mint_token(&missing),
            Err(PlatformError::Refused(_))
        ));
    }

    #[test]
    fn test_reachability_follows_existence() {
        let dir = tempfile::tempdir().unwrap();
        let root = CanonicalPath::from_normalized(dir.path());
        let platform = HostPlatform::new();
        assert!(platform.is_reachable(&root));
        assert!(!platform.is_reachable(&root.join("gone")));
    }

    #[test]
    fn test_foreign_token_is_corrupt() {
        let platform = HostPlatform::new();
        let token = CapabilityToken::from_bytes(b"bookmark-data".to_vec());
        assert!(matches!(
            platform.resolve_token(&token),
            Err(PlatformError::CorruptToken(_))
        ));
    }
}
