//! Registry persistence seam

use crate::StoreError;
use scope_types::ScopeRecord;

/// Durable storage for the scope registry.
///
/// `save` replaces the whole persisted registry. A store with nothing saved
/// yet loads as an empty list.
pub trait RegistryStore: Send + Sync {
    fn load(&self) -> Result<Vec<ScopeRecord>, StoreError>;

    fn save(&self, records: &[ScopeRecord]) -> Result<(), StoreError>;
}
