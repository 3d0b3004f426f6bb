//! In-memory and failure-injecting registry stores

use parking_lot::Mutex;
use sandbox_api::{RegistryStore, StoreError};
use scope_types::ScopeRecord;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Registry store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ScopeRecord>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `records`, as after a previous run
    pub fn with_records(records: Vec<ScopeRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            saves: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the currently persisted records
    pub fn records(&self) -> Vec<ScopeRecord> {
        self.records.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl RegistryStore for MemoryStore {
    fn load(&self) -> Result<Vec<ScopeRecord>, StoreError> {
        Ok(self.records.lock().clone())
    }

    fn save(&self, records: &[ScopeRecord]) -> Result<(), StoreError> {
        *self.records.lock() = records.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Policy for when store operations should fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreFailurePolicy {
    /// Never fail (passthrough)
    Never,
    /// Every save fails
    FailSaves,
    /// Saves succeed N times, then fail
    FailSavesAfter(usize),
    /// Every load fails
    FailLoads,
}

/// Wrapper around a [`RegistryStore`] that can simulate failures
pub struct FailingStore<S: RegistryStore> {
    inner: S,
    policy: Mutex<StoreFailurePolicy>,
    successful_saves: AtomicUsize,
}

impl<S: RegistryStore> FailingStore<S> {
    pub fn new(inner: S, policy: StoreFailurePolicy) -> Self {
        Self {
            inner,
            policy: Mutex::new(policy),
            successful_saves: AtomicUsize::new(0),
        }
    }

    /// Get the underlying store (for inspection)
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Replaces the failure policy and resets the save counter
    pub fn set_policy(&self, policy: StoreFailurePolicy) {
        *self.policy.lock() = policy;
        self.successful_saves.store(0, Ordering::SeqCst);
    }

    fn should_fail_save(&self) -> bool {
        match &*self.policy.lock() {
            StoreFailurePolicy::FailSaves => true,
            StoreFailurePolicy::FailSavesAfter(n) => {
                self.successful_saves.load(Ordering::SeqCst) >= *n
            }
            StoreFailurePolicy::Never | StoreFailurePolicy::FailLoads => false,
        }
    }
}

impl<S: RegistryStore> RegistryStore for FailingStore<S> {
    fn load(&self) -> Result<Vec<ScopeRecord>, StoreError> {
        if *self.policy.lock() == StoreFailurePolicy::FailLoads {
            return Err(StoreError::Read("injected load failure".to_string()));
        }
        self.inner.load()
    }

    fn save(&self, records: &[ScopeRecord]) -> Result<(), StoreError> {
        if self.should_fail_save() {
            return Err(StoreError::Write("injected save failure".to_string()));
        }
        self.inner.save(records)?;
        self.successful_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
