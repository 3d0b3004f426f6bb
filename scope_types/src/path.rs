//! Canonical path newtype
//!
//! A [`CanonicalPath`] is always absolute and lexically normal: no `.` or `..`
//! segments and no trailing separator. Symbolic link resolution happens in the
//! resolver before a path is wrapped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Normalized absolute path identifying a grant boundary or a request target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalPath(PathBuf);

impl CanonicalPath {
    /// Wraps a path after lexical normalization.
    ///
    /// Relative input is anchored at the filesystem root. `..` never climbs
    /// above the root.
    pub fn from_normalized(path: impl AsRef<Path>) -> Self {
        Self(normalize(path.as_ref()))
    }

    /// Returns the filesystem root (`/`).
    pub fn root() -> Self {
        Self(PathBuf::from("/"))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Returns true if `self` equals `root` or lies beneath it.
    ///
    /// Matching is by whole path segment: `/Users/alice-archive` is not
    /// within `/Users/alice`.
    pub fn is_within(&self, root: &CanonicalPath) -> bool {
        self.0.starts_with(&root.0)
    }

    /// Returns true if one of the two paths contains the other.
    pub fn overlaps(&self, other: &CanonicalPath) -> bool {
        self.is_within(other) || other.is_within(self)
    }

    /// Number of normal segments below the root.
    pub fn depth(&self) -> usize {
        self.0
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count()
    }

    /// Appends a relative remainder and renormalizes.
    pub fn join(&self, rest: impl AsRef<Path>) -> Self {
        Self::from_normalized(self.0.join(rest))
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out = PathBuf::from(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // pop() refuses to remove the root itself
                out.pop();
            }
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}
