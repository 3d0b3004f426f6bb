//! The access broker
//!
//! Check order for every guarded operation:
//! 1. protected path → `OsProtectedPath`
//! 2. most specific active covering scope → run under a lease
//! 3. otherwise the most specific covering scope's status explains the block
//! 4. nothing covers the path → `MissingScope`

use crate::persistence::{load_records_safe, JsonFileStore};
use crate::{AccessError, BrokerConfig, BrokerError, LeaseTable, ScopeRegistry};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use sandbox_api::{PlatformError, RegistryStore, SandboxPlatform};
use scope_resolver::{
    best_match, canonicalize, covering_scope, normalize_lexical, ProtectedPaths, WellKnownRoots,
};
use scope_types::{
    AccessScope, AccessScopeKind, CanonicalPath, ScopeAccessState, ScopeBlockedReason,
    ScopeCoverageSummary, ScopeId, ScopeStatus,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Status counts produced by a refresh pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub active: usize,
    pub stale: usize,
    pub disconnected: usize,
    pub invalid: usize,
    /// Stale tokens that were successfully re-minted
    pub reminted: usize,
    /// Recovered scopes dropped because a wider active scope covers them
    pub merged: usize,
}

impl RefreshReport {
    fn count(&mut self, status: ScopeStatus) {
        match status {
            ScopeStatus::Active => self.active += 1,
            ScopeStatus::StaleToken => self.stale += 1,
            ScopeStatus::Disconnected => self.disconnected += 1,
            ScopeStatus::Invalid => self.invalid += 1,
        }
    }
}

pub struct AccessBroker {
    config: BrokerConfig,
    roots: WellKnownRoots,
    protected: ProtectedPaths,
    platform: Arc<dyn SandboxPlatform>,
    store: Arc<dyn RegistryStore>,
    /// Published snapshot; readers clone the `Arc` and never block writers
    registry: RwLock<Arc<ScopeRegistry>>,
    /// Serializes add / remove / refresh
    mutation: Mutex<()>,
    leases: LeaseTable,
}

impl AccessBroker {
    /// Opens the broker: loads the persisted registry (an unreadable registry
    /// is treated as empty) and refreshes every scope's status once.
    pub fn open(
        config: BrokerConfig,
        platform: Arc<dyn SandboxPlatform>,
        store: Arc<dyn RegistryStore>,
    ) -> Self {
        let roots = config.canonical_roots();
        let protected = config.protected_paths();

        let registry = ScopeRegistry::from_records(load_records_safe(store.as_ref()));
        info!(scopes = registry.len(), "access scope registry loaded");

        let broker = Self {
            config,
            roots,
            protected,
            platform,
            store,
            registry: RwLock::new(Arc::new(registry)),
            mutation: Mutex::new(()),
            leases: LeaseTable::new(),
        };
        broker.refresh_statuses();
        broker
    }

    /// Opens the broker with a [`JsonFileStore`] at `config.registry_path`
    pub fn open_with_file_store(config: BrokerConfig, platform: Arc<dyn SandboxPlatform>) -> Self {
        let store = Arc::new(JsonFileStore::new(config.registry_path.clone()));
        Self::open(config, platform, store)
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Well-known roots, canonicalized
    pub fn roots(&self) -> &WellKnownRoots {
        &self.roots
    }

    pub fn home(&self) -> &Path {
        self.roots.home.as_path()
    }

    pub fn canonicalize(&self, path: &Path) -> CanonicalPath {
        canonicalize(path, self.home())
    }

    pub fn is_protected(&self, path: &Path) -> bool {
        self.protected.is_protected(&normalize_lexical(path, self.home()))
            || self.protected.is_protected(&self.canonicalize(path))
    }

    /// Returns true if a protected location lies beneath `path`
    pub fn contains_protected(&self, path: &Path) -> bool {
        self.protected.contains_protected(&normalize_lexical(path, self.home()))
            || self.protected.contains_protected(&self.canonicalize(path))
    }

    /// Immutable view of the registry at this instant
    pub fn snapshot(&self) -> Arc<ScopeRegistry> {
        self.registry.read().clone()
    }

    pub fn scopes(&self) -> Vec<AccessScope> {
        self.snapshot().iter().cloned().collect()
    }

    pub fn scope(&self, id: ScopeId) -> Result<AccessScope, BrokerError> {
        self.snapshot()
            .get(id)
            .cloned()
            .ok_or(BrokerError::ScopeNotFound(id))
    }

    /// Outstanding leases on a scope
    pub fn active_lease_count(&self, id: ScopeId) -> usize {
        self.leases.count(id)
    }

    fn publish(&self, registry: ScopeRegistry) {
        *self.registry.write() = Arc::new(registry);
    }

    fn persist(&self, registry: &ScopeRegistry) -> Result<(), BrokerError> {
        self.store.save(&registry.to_records()).map_err(|error| {
            warn!(%error, "failed to persist access scope registry");
            BrokerError::PersistenceFailure(error)
        })
    }

    /// Grants access to `requested_root`, inferring its kind
    pub fn add_scope(&self, requested_root: impl AsRef<Path>) -> Result<AccessScope, BrokerError> {
        self.grant(requested_root.as_ref(), None)
    }

    /// Grants access to `requested_root` with an explicit provenance
    pub fn add_scope_with_kind(
        &self,
        requested_root: impl AsRef<Path>,
        kind: AccessScopeKind,
    ) -> Result<AccessScope, BrokerError> {
        self.grant(requested_root.as_ref(), Some(kind))
    }

    fn grant(
        &self,
        requested_root: &Path,
        kind: Option<AccessScopeKind>,
    ) -> Result<AccessScope, BrokerError> {
        let root = self.canonicalize(requested_root);
        if self.is_protected(requested_root) {
            return Err(BrokerError::GrantDenied {
                root: root.into_path_buf(),
                reason: "location is protected by the operating system".to_string(),
            });
        }

        let _mutation = self.mutation.lock();
        let current = self.snapshot();

        if let Some(existing) = current.active_covering(&root) {
            debug!(scope_id = %existing.id, %root, "requested root already covered");
            return Ok(existing.clone());
        }

        let token = self
            .platform
            .mint_token(&root)
            .map_err(|error| grant_denied(&root, error))?;
        let now = Utc::now();
        let mut next = (*current).clone();

        let subsumed = next.subsumed_by(&root);
        for id in &subsumed {
            if let Some(removed) = next.remove(*id) {
                info!(scope_id = %removed.id, root = %removed.canonical_root, "narrower access scope merged into new grant");
            }
        }

        // Same root, not active: re-grant in place
        if let Some(existing_id) = current.find_by_root(&root).map(|s| s.id) {
            let scope = next
                .get_mut(existing_id)
                .ok_or(BrokerError::ScopeNotFound(existing_id))?;
            scope.token = token;
            scope.status = ScopeStatus::Active;
            scope.last_validated_at = now;
            if let Some(kind) = kind {
                scope.kind = kind;
            }
            let scope = scope.clone();

            self.persist(&next)?;
            self.publish(next);
            info!(scope_id = %scope.id, %root, token = %scope.token.fingerprint(), merged = subsumed.len(), "access scope re-granted");
            return Ok(scope);
        }

        let kind = kind.unwrap_or_else(|| self.roots.classify(&root));
        let scope = AccessScope::new(kind, root, token, now);
        next.insert(scope.clone());

        self.persist(&next)?;
        self.publish(next);

        info!(
            scope_id = %scope.id,
            root = %scope.canonical_root,
            %kind,
            token = %scope.token.fingerprint(),
            merged = subsumed.len(),
            tier = %self.coverage_summary().tier,
            "access scope granted"
        );
        Ok(scope)
    }

    /// Removes a scope. An unknown id is a successful no-op.
    pub fn remove_scope(&self, id: ScopeId) -> Result<(), BrokerError> {
        let _mutation = self.mutation.lock();
        let current = self.snapshot();
        if current.get(id).is_none() {
            debug!(scope_id = %id, "remove of unknown access scope ignored");
            return Ok(());
        }

        let mut next = (*current).clone();
        let removed = next.remove(id);
        self.persist(&next)?;
        self.publish(next);

        if let Some(scope) = removed {
            info!(
                scope_id = %scope.id,
                root = %scope.canonical_root,
                tier = %self.coverage_summary().tier,
                "access scope removed"
            );
        }
        Ok(())
    }

    /// Re-derives every scope's status from the platform.
    ///
    /// Transitions: `active ⇄ staleToken` by re-mint success or failure,
    /// `active ⇄ disconnected` by root reachability, anything `→ invalid` on
    /// an undecodable token. `invalid` stays invalid until re-granted.
    ///
    /// A scope that recovers inside another active scope is merged into it,
    /// so active roots stay disjoint. Re-minted tokens and merges are
    /// persisted best-effort.
    pub fn refresh_statuses(&self) -> RefreshReport {
        let _mutation = self.mutation.lock();
        let mut next = (*self.snapshot()).clone();
        let mut report = RefreshReport::default();
        let now = Utc::now();

        for scope in next.iter_mut() {
            let previous = scope.status;
            let status = self.revalidate(scope, &mut report);
            if status.is_active() {
                scope.last_validated_at = now;
            }
            if status != previous {
                if status.is_active() {
                    info!(scope_id = %scope.id, root = %scope.canonical_root, from = %previous, "access scope recovered");
                } else {
                    warn!(scope_id = %scope.id, root = %scope.canonical_root, from = %previous, to = %status, "access scope degraded");
                }
            }
            scope.status = status;
        }

        for merged in next.prune_nested_active() {
            info!(scope_id = %merged.id, root = %merged.canonical_root, "recovered access scope merged into wider scope");
            report.merged += 1;
        }
        for scope in next.iter() {
            report.count(scope.status);
        }

        if report.reminted > 0 || report.merged > 0 {
            if let Err(error) = self.store.save(&next.to_records()) {
                warn!(%error, "refreshed access scopes could not be persisted");
            }
        }
        self.publish(next);
        report
    }

    fn revalidate(&self, scope: &mut AccessScope, report: &mut RefreshReport) -> ScopeStatus {
        if scope.status == ScopeStatus::Invalid || scope.token.is_empty() {
            return ScopeStatus::Invalid;
        }

        let resolution = match self.platform.resolve_token(&scope.token) {
            Ok(resolution) => resolution,
            Err(PlatformError::CorruptToken(_)) => return ScopeStatus::Invalid,
            Err(error) => {
                debug!(scope_id = %scope.id, %error, "token could not be resolved");
                return ScopeStatus::StaleToken;
            }
        };

        if !self.platform.is_reachable(&scope.canonical_root) {
            return ScopeStatus::Disconnected;
        }
        if !resolution.is_stale {
            return ScopeStatus::Active;
        }

        match self.platform.mint_token(&scope.canonical_root) {
            Ok(token) => {
                scope.token = token;
                report.reminted += 1;
                ScopeStatus::Active
            }
            Err(error) => {
                debug!(scope_id = %scope.id, %error, "stale token could not be re-minted");
                ScopeStatus::StaleToken
            }
        }
    }

    /// Coverage tier of the currently registered roots
    pub fn coverage_summary(&self) -> ScopeCoverageSummary {
        let snapshot = self.snapshot();
        self.roots.coverage(snapshot.roots())
    }

    /// Resolves the scope that authorizes `path`, or why none does
    fn authorize(&self, path: &Path) -> Result<AccessScope, ScopeBlockedReason> {
        if self.is_protected(path) {
            return Err(ScopeBlockedReason::OsProtectedPath);
        }

        let canonical = self.canonicalize(path);
        let snapshot = self.snapshot();
        if let Some(scope) = best_match(&canonical, snapshot.iter()).and_then(|id| snapshot.get(id)) {
            return Ok(scope.clone());
        }

        let reason = covering_scope(&canonical, snapshot.iter())
            .and_then(|scope| ScopeBlockedReason::for_status(scope.status))
            .unwrap_or(ScopeBlockedReason::MissingScope);
        Err(reason)
    }

    /// Read-only pre-flight check
    pub fn access_state(&self, path: impl AsRef<Path>) -> ScopeAccessState {
        match self.authorize(path.as_ref()) {
            Ok(_) => ScopeAccessState::Ready,
            Err(ScopeBlockedReason::MissingScope) => ScopeAccessState::NeedsAccess,
            Err(reason) => ScopeAccessState::Limited(reason),
        }
    }

    /// The sole gateway for touching a path.
    ///
    /// Runs `operation` under a lease on the authorizing scope and releases it
    /// on every exit path. `operation` receives the home-expanded, lexically
    /// normalized path (symlinks are not followed) and its result is returned
    /// unchanged.
    pub fn with_access<T, E, F>(&self, path: impl AsRef<Path>, operation: F) -> Result<T, AccessError<E>>
    where
        F: FnOnce(&Path) -> Result<T, E>,
    {
        let path = path.as_ref();
        let scope = self.authorize(path).map_err(AccessError::Blocked)?;

        let _lease = self
            .leases
            .acquire(&scope, self.platform.as_ref())
            .map_err(|error| {
                warn!(scope_id = %scope.id, %error, "token activation failed");
                AccessError::Blocked(ScopeBlockedReason::StaleBookmark)
            })?;

        let target = normalize_lexical(path, self.home());
        operation(target.as_path()).map_err(AccessError::Operation)
    }
}

fn grant_denied(root: &CanonicalPath, error: PlatformError) -> BrokerError {
    warn!(%root, %error, "platform refused access grant");
    BrokerError::GrantDenied {
        root: root.as_path().to_path_buf(),
        reason: error.to_string(),
    }
}
