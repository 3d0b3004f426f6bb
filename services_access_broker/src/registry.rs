//! The scope registry
//!
//! An ordered collection of [`AccessScope`]s keyed by id.
//!
//! Invariant: no two active scopes' roots are in an ancestor/descendant
//! relationship. Granting a wider root removes the narrower ones it subsumes;
//! granting a root already covered by an active wider root is a no-op.

use scope_types::{AccessScope, CanonicalPath, ScopeId, ScopeRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeRegistry {
    scopes: Vec<AccessScope>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from persisted records.
    ///
    /// Duplicate ids keep the first record. Scopes subsumed by a wider active
    /// scope are dropped so the invariant holds even for a hand-edited file.
    pub fn from_records(records: Vec<ScopeRecord>) -> Self {
        let mut scopes: Vec<AccessScope> = Vec::with_capacity(records.len());
        for record in records {
            if scopes.iter().any(|s| s.id == record.id) {
                continue;
            }
            scopes.push(record.into_scope());
        }

        let mut registry = Self { scopes };
        registry.prune_nested_active();
        registry
    }

    /// Removes active scopes nested inside another active scope and returns
    /// them. Of two active scopes with the same root the earlier one stays.
    pub fn prune_nested_active(&mut self) -> Vec<AccessScope> {
        let shadowed: Vec<ScopeId> = self
            .scopes
            .iter()
            .enumerate()
            .filter(|&(i, scope)| {
                scope.status.is_active()
                    && self.scopes.iter().enumerate().any(|(j, other)| {
                        j != i
                            && other.status.is_active()
                            && scope.canonical_root.is_within(&other.canonical_root)
                            && (other.canonical_root != scope.canonical_root || j < i)
                    })
            })
            .map(|(_, scope)| scope.id)
            .collect();
        shadowed.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    pub fn to_records(&self) -> Vec<ScopeRecord> {
        self.scopes.iter().map(ScopeRecord::from_scope).collect()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessScope> {
        self.scopes.iter()
    }

    pub fn roots(&self) -> impl Iterator<Item = &CanonicalPath> {
        self.scopes.iter().map(|s| &s.canonical_root)
    }

    pub fn get(&self, id: ScopeId) -> Option<&AccessScope> {
        self.scopes.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: ScopeId) -> Option<&mut AccessScope> {
        self.scopes.iter_mut().find(|s| s.id == id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AccessScope> {
        self.scopes.iter_mut()
    }

    /// Active scope whose root equals or contains `root`
    pub fn active_covering(&self, root: &CanonicalPath) -> Option<&AccessScope> {
        self.scopes
            .iter()
            .find(|s| s.status.is_active() && root.is_within(&s.canonical_root))
    }

    /// Scope of any status whose root is exactly `root`
    pub fn find_by_root(&self, root: &CanonicalPath) -> Option<&AccessScope> {
        self.scopes.iter().find(|s| s.canonical_root == *root)
    }

    /// Ids of scopes a grant of `root` would subsume (strict descendants)
    pub fn subsumed_by(&self, root: &CanonicalPath) -> Vec<ScopeId> {
        self.scopes
            .iter()
            .filter(|s| s.canonical_root != *root && s.canonical_root.is_within(root))
            .map(|s| s.id)
            .collect()
    }

    pub fn insert(&mut self, scope: AccessScope) {
        self.scopes.push(scope);
    }

    pub fn remove(&mut self, id: ScopeId) -> Option<AccessScope> {
        let index = self.scopes.iter().position(|s| s.id == id)?;
        Some(self.scopes.remove(index))
    }

    /// Returns true if no two active roots are in an ancestor relation
    pub fn active_roots_disjoint(&self) -> bool {
        let active: Vec<&AccessScope> = self.scopes.iter().filter(|s| s.status.is_active()).collect();
        active.iter().enumerate().all(|(i, a)| {
            active[i + 1..]
                .iter()
                .all(|b| !a.canonical_root.overlaps(&b.canonical_root))
        })
    }
}
