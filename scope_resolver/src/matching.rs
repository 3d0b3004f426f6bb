//! Ancestor-match lookup
//!
//! Both functions pick the longest (most specific) root that is an ancestor
//! of, or equal to, the requested path.

use scope_types::{AccessScope, CanonicalPath, ScopeId};

/// Returns the most specific *active* scope covering `path`.
pub fn best_match<'a, I>(path: &CanonicalPath, scopes: I) -> Option<ScopeId>
where
    I: IntoIterator<Item = &'a AccessScope>,
{
    scopes
        .into_iter()
        .filter(|scope| scope.status.is_active() && scope.covers(path))
        .max_by_key(|scope| scope.canonical_root.depth())
        .map(|scope| scope.id)
}

/// Returns the most specific scope covering `path`, whatever its status.
///
/// Used to explain *why* a path is blocked when [`best_match`] finds nothing.
pub fn covering_scope<'a, I>(path: &CanonicalPath, scopes: I) -> Option<&'a AccessScope>
where
    I: IntoIterator<Item = &'a AccessScope>,
{
    scopes
        .into_iter()
        .filter(|scope| scope.covers(path))
        .max_by_key(|scope| scope.canonical_root.depth())
}
