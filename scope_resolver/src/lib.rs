//! # Scope Resolver
//!
//! Pure functions that decide which grant, if any, covers a requested path.
//!
//! ## Philosophy
//!
//! - **Canonical first**: every path is expanded, de-linked and normalized
//!   before it is compared with anything.
//! - **Segments, not strings**: `/Users/alice-archive` is never inside
//!   `/Users/alice`.
//! - **Protection wins**: a protected location is blocked even under a
//!   granted ancestor root.
//!
//! ## Operations
//!
//! - [`canonicalize`]: home expansion, symlink resolution, `.`/`..` removal
//! - [`best_match`]: most specific active scope covering a path
//! - [`covering_scope`]: most specific scope of any status covering a path
//! - [`ProtectedPaths::is_protected`]: fixed deny-list check
//! - [`WellKnownRoots`]: kind inference and coverage tier computation

pub mod canonical;
pub mod matching;
pub mod protected;
pub mod roots;

pub use canonical::{canonicalize, expand_home, normalize_lexical};
pub use matching::{best_match, covering_scope};
pub use protected::ProtectedPaths;
pub use roots::WellKnownRoots;
