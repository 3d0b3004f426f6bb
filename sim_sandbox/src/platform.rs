//! Simulated token platform
//!
//! Tokens are `sim-token:<generation>:<root>` byte strings. Anything else
//! resolves as corrupt.

use parking_lot::Mutex;
use sandbox_api::{PlatformError, SandboxPlatform, TokenResolution};
use scope_types::{CanonicalPath, CapabilityToken};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

const TOKEN_PREFIX: &str = "sim-token:";

/// A platform call, recorded in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxEvent {
    Minted { root: CanonicalPath },
    MintRefused { root: CanonicalPath },
    Activated { root: CanonicalPath },
    Deactivated { root: CanonicalPath },
}

#[derive(Debug, Default)]
struct SimState {
    generation: u64,
    refuse_all_grants: bool,
    refused_roots: HashSet<CanonicalPath>,
    refuse_activation: bool,
    stale_tokens: HashSet<Vec<u8>>,
    unmounted: Vec<CanonicalPath>,
    open_tokens: HashMap<Vec<u8>, usize>,
    events: Vec<SandboxEvent>,
}

/// Scriptable in-memory [`SandboxPlatform`]
#[derive(Debug, Default)]
pub struct SimulatedSandbox {
    state: Mutex<SimState>,
    activations: AtomicUsize,
    deactivations: AtomicUsize,
    double_activations: AtomicUsize,
    unbalanced_deactivations: AtomicUsize,
}

impl SimulatedSandbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent grant request fail, as if the user cancelled
    pub fn refuse_grants(&self, refuse: bool) {
        self.state.lock().refuse_all_grants = refuse;
    }

    /// Makes grant requests for one root fail
    pub fn refuse_root(&self, root: &CanonicalPath) {
        self.state.lock().refused_roots.insert(root.clone());
    }

    /// Makes `activate` fail for every token
    pub fn refuse_activation(&self, refuse: bool) {
        self.state.lock().refuse_activation = refuse;
    }

    /// Marks a token stale; resolving it reports `is_stale`
    pub fn mark_stale(&self, token: &CapabilityToken) {
        self.state
            .lock()
            .stale_tokens
            .insert(token.as_bytes().to_vec());
    }

    /// Simulates ejecting the volume mounted at `root`
    pub fn unmount(&self, root: &CanonicalPath) {
        let mut state = self.state.lock();
        if !state.unmounted.contains(root) {
            state.unmounted.push(root.clone());
        }
    }

    pub fn remount(&self, root: &CanonicalPath) {
        self.state.lock().unmounted.retain(|r| r != root);
    }

    pub fn activate_count(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub fn deactivate_count(&self) -> usize {
        self.deactivations.load(Ordering::SeqCst)
    }

    /// Times `activate` was called on a token that was already open
    pub fn double_activation_count(&self) -> usize {
        self.double_activations.load(Ordering::SeqCst)
    }

    /// Times `deactivate` was called on a token that was not open
    pub fn unbalanced_deactivation_count(&self) -> usize {
        self.unbalanced_deactivations.load(Ordering::SeqCst)
    }

    /// Number of tokens currently activated
    pub fn open_token_count(&self) -> usize {
        self.state.lock().open_tokens.len()
    }

    pub fn events(&self) -> Vec<SandboxEvent> {
        self.state.lock().events.clone()
    }

    fn parse(token: &CapabilityToken) -> Result<CanonicalPath, PlatformError> {
        let text = std::str::from_utf8(token.as_bytes())
            .map_err(|_| PlatformError::CorruptToken("token is not UTF-8".to_string()))?;
        let body = text
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| PlatformError::CorruptToken("unknown token format".to_string()))?;
        let (generation, root) = body
            .split_once(':')
            .ok_or_else(|| PlatformError::CorruptToken("missing generation".to_string()))?;
        generation
            .parse::<u64>()
            .map_err(|_| PlatformError::CorruptToken("bad generation".to_string()))?;
        Ok(CanonicalPath::from_normalized(root))
    }
}

impl SandboxPlatform for SimulatedSandbox {
    fn mint_token(&self, root: &CanonicalPath) -> Result<CapabilityToken, PlatformError> {
        let mut state = self.state.lock();
        if state.refuse_all_grants || state.refused_roots.contains(root) {
            state.events.push(SandboxEvent::MintRefused { root: root.clone() });
            return Err(PlatformError::Refused(format!("user declined access to {}", root)));
        }
        state.generation += 1;
        let token = format!("{}{}:{}", TOKEN_PREFIX, state.generation, root);
        state.events.push(SandboxEvent::Minted { root: root.clone() });
        Ok(CapabilityToken::from_bytes(token.into_bytes()))
    }

    fn resolve_token(&self, token: &CapabilityToken) -> Result<TokenResolution, PlatformError> {
        let root = Self::parse(token)?;
        let is_stale = self.state.lock().stale_tokens.contains(token.as_bytes());
        Ok(TokenResolution { root, is_stale })
    }

    fn activate(&self, token: &CapabilityToken) -> Result<(), PlatformError> {
        let root = Self::parse(token)?;
        let mut state = self.state.lock();
        if state.refuse_activation {
            return Err(PlatformError::Refused(format!("activation refused for {}", root)));
        }
        let open = state.open_tokens.entry(token.as_bytes().to_vec()).or_insert(0);
        if *open > 0 {
            self.double_activations.fetch_add(1, Ordering::SeqCst);
        }
        *open += 1;
        state.events.push(SandboxEvent::Activated { root });
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate(&self, token: &CapabilityToken) {
        let root = Self::parse(token).unwrap_or_else(|_| CanonicalPath::root());
        let mut state = self.state.lock();
        let key = token.as_bytes().to_vec();
        match state.open_tokens.get(&key).copied() {
            Some(open) if open > 1 => {
                state.open_tokens.insert(key, open - 1);
            }
            Some(_) => {
                state.open_tokens.remove(&key);
            }
            None => {
                self.unbalanced_deactivations.fetch_add(1, Ordering::SeqCst);
            }
        }
        state.events.push(SandboxEvent::Deactivated { root });
        self.deactivations.fetch_add(1, Ordering::SeqCst);
    }

    fn is_reachable(&self, root: &CanonicalPath) -> bool {
        !self
            .state
            .lock()
            .unmounted
            .iter()
            .any(|mount| root.is_within(mount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(p: &str) -> CanonicalPath {
        CanonicalPath::from_normalized(p)
    }

    #[test]
    fn test_mint_and_resolve() {
        let sandbox = SimulatedSandbox::new();
        let token = sandbox.mint_token(&root("/Users/alice")).unwrap();
        let resolution = sandbox.resolve_token(&token).unwrap();
        assert_eq!(resolution.root, root("/Users/alice"));
        assert!(!resolution.is_stale);
    }

    #[test]
    fn test_reminted_tokens_differ() {
        let sandbox = SimulatedSandbox::new();
        let a = sandbox.mint_token(&root("/Users/alice")).unwrap();
        let b = sandbox.mint_token(&root("/Users/alice")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_refused_grant() {
        let sandbox = SimulatedSandbox::new();
        sandbox.refuse_root(&root("/Users/alice"));
        let result = sandbox.mint_token(&root("/Users/alice"));
        assert!(matches!(result, Err(PlatformError::Refused(_))));
        assert!(sandbox.mint_token(&root("/Users/bob")).is_ok());
    }

    #[test]
    fn test_corrupt_token() {
        let sandbox = SimulatedSandbox::new();
        let garbage = CapabilityToken::from_bytes(vec![0xff, 0x00, 0x13]);
        assert!(matches!(
            sandbox.resolve_token(&garbage),
            Err(PlatformError::CorruptToken(_))
        ));
    }

    #[test]
    fn test_stale_token() {
        let sandbox = SimulatedSandbox::new();
        let token = sandbox.mint_token(&root("/Users/alice")).unwrap();
        sandbox.mark_stale(&token);
        assert!(sandbox.resolve_token(&token).unwrap().is_stale);
    }

    #[test]
    fn test_unmount_and_remount() {
        let sandbox = SimulatedSandbox::new();
        let volume = root("/Volumes/Backup");
        sandbox.unmount(&volume);
        assert!(!sandbox.is_reachable(&volume));
        assert!(!sandbox.is_reachable(&root("/Volumes/Backup/photos")));
        assert!(sandbox.is_reachable(&root("/Volumes/Other")));
        sandbox.remount(&volume);
        assert!(sandbox.is_reachable(&volume));
    }

    #[test]
    fn test_double_activation_is_detected() {
        let sandbox = SimulatedSandbox::new();
        let token = sandbox.mint_token(&root("/Users/alice")).unwrap();
        sandbox.activate(&token).unwrap();
        sandbox.activate(&token).unwrap();
        assert_eq!(sandbox.double_activation_count(), 1);
        sandbox.deactivate(&token);
        sandbox.deactivate(&token);
        sandbox.deactivate(&token);
        assert_eq!(sandbox.unbalanced_deactivation_count(), 1);
        assert_eq!(sandbox.open_token_count(), 0);
    }

    #[test]
    fn test_events_are_recorded_in_order() {
        let sandbox = SimulatedSandbox::new();
        let r = root("/Applications");
        let token = sandbox.mint_token(&r).unwrap();
        sandbox.activate(&token).unwrap();
        sandbox.deactivate(&token);
        assert_eq!(
            sandbox.events(),
            vec![
                SandboxEvent::Minted { root: r.clone() },
                SandboxEvent::Activated { root: r.clone() },
                SandboxEvent::Deactivated { root: r },
            ]
        );
    }
}
