//! Reference-counted token leases
//!
//! Each scope has a lease count guarding one platform activation. The
//! platform's `activate` fires only on the 0→1 transition and `deactivate`
//! only on 1→0, so N overlapping callers produce exactly one pair.
//!
//! Release is tied to [`LeaseGuard`]'s `Drop`, which also runs while a panic
//! unwinds through the guarded operation.

use parking_lot::Mutex;
use sandbox_api::{PlatformError, SandboxPlatform};
use scope_types::{AccessScope, CapabilityToken, ScopeId};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug)]
struct LeaseSlot {
    count: usize,
    /// The token that was activated; deactivated with the same bytes even if
    /// the scope was re-minted meanwhile
    token: CapabilityToken,
}

#[derive(Debug, Default)]
pub struct LeaseTable {
    slots: Mutex<HashMap<ScopeId, LeaseSlot>>,
}

impl LeaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a lease on `scope`, activating its token on the first one.
    ///
    /// The table lock is held across `activate`, so concurrent callers
    /// never observe a count above zero before activation has finished.
    pub fn acquire<'a>(
        &'a self,
        scope: &AccessScope,
        platform: &'a dyn SandboxPlatform,
    ) -> Result<LeaseGuard<'a>, PlatformError> {
        let mut slots = self.slots.lock();
        match slots.get_mut(&scope.id) {
            Some(slot) => slot.count += 1,
            None => {
                platform.activate(&scope.token)?;
                debug!(scope_id = %scope.id, root = %scope.canonical_root, "token activated");
                slots.insert(
                    scope.id,
                    LeaseSlot {
                        count: 1,
                        token: scope.token.clone(),
                    },
                );
            }
        }
        Ok(LeaseGuard {
            table: self,
            platform,
            scope_id: scope.id,
        })
    }

    fn release(&self, scope_id: ScopeId, platform: &dyn SandboxPlatform) {
        let mut slots = self.slots.lock();
        let drained = match slots.get_mut(&scope_id) {
            Some(slot) => {
                slot.count -= 1;
                slot.count == 0
            }
            None => {
                warn!(%scope_id, "lease released with no outstanding acquire");
                return;
            }
        };
        if drained {
            if let Some(slot) = slots.remove(&scope_id) {
                platform.deactivate(&slot.token);
                debug!(%scope_id, "token deactivated");
            }
        }
    }

    /// Outstanding leases on one scope
    pub fn count(&self, scope_id: ScopeId) -> usize {
        self.slots
            .lock()
            .get(&scope_id)
            .map(|slot| slot.count)
            .unwrap_or(0)
    }

    /// Number of scopes with at least one outstanding lease
    pub fn active_scopes(&self) -> usize {
        self.slots.lock().len()
    }
}

/// An outstanding lease. Dropping it releases the lease.
#[must_use = "the lease is released as soon as the guard is dropped"]
pub struct LeaseGuard<'a> {
    table: &'a LeaseTable,
    platform: &'a dyn SandboxPlatform,
    scope_id: ScopeId,
}

impl Drop for LeaseGuard<'_> {
    fn drop(&mut self) {
        self.table.release(self.scope_id, self.platform);
    }
}
