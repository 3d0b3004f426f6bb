//! Scoped filesystem operations
//!
//! This module defines the operations provided by the scoped filesystem
//! service and the values they return.

use chrono::{DateTime, Utc};
use scope_types::ScopeBlockedReason;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during scoped filesystem operations
#[derive(Debug, Error)]
pub enum ScopedFsError {
    /// The path is out of reach; the user can usually fix this by granting
    /// or re-granting access
    #[error("{}: {reason}", path.display())]
    Blocked {
        path: PathBuf,
        reason: ScopeBlockedReason,
    },

    /// The operation ran and failed for a reason unrelated to access
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScopedFsError {
    pub fn blocked(path: impl Into<PathBuf>, reason: ScopeBlockedReason) -> Self {
        ScopedFsError::Blocked {
            path: path.into(),
            reason,
        }
    }

    /// True if the failure is about access rather than the file itself
    pub fn is_access_error(&self) -> bool {
        matches!(self, ScopedFsError::Blocked { .. })
    }

    pub fn blocked_reason(&self) -> Option<ScopeBlockedReason> {
        match self {
            ScopedFsError::Blocked { reason, .. } => Some(*reason),
            ScopedFsError::Io { .. } => None,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ScopedFsError::Blocked { path, .. } | ScopedFsError::Io { path, .. } => path,
        }
    }
}

/// Result of partitioning candidate paths before a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationPartition {
    pub authorized: Vec<PathBuf>,
    /// Every blocked path with its reason; nothing is dropped silently
    pub blocked: Vec<(PathBuf, ScopeBlockedReason)>,
}

impl AuthorizationPartition {
    pub fn is_fully_authorized(&self) -> bool {
        self.blocked.is_empty()
    }
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

/// Metadata of a single item. Symlinks are described, not followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceValues {
    pub size: u64,
    pub is_dir: bool,
    pub is_file: bool,
    pub is_symlink: bool,
    pub modified: Option<DateTime<Utc>>,
}

/// Guarded filesystem operations
///
/// Each call brackets its I/O with a lease on the scope that authorizes the
/// path. Implementations never touch a path the broker has not authorized.
pub trait ScopedFileOperations {
    /// Reads the whole file at `path`
    fn read(&self, path: &Path) -> Result<Vec<u8>, ScopedFsError>;

    /// Writes `contents` to `path`, creating missing parent directories
    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), ScopedFsError>;

    /// Removes a file, symlink or directory tree
    fn remove(&self, path: &Path) -> Result<(), ScopedFsError>;

    /// Moves `path` into the trash directory and returns its new location.
    ///
    /// Requires write access to both the item and the trash directory.
    fn move_to_trash(&self, path: &Path) -> Result<PathBuf, ScopedFsError>;

    /// Lists one level of the directory at `path`, sorted by name
    fn enumerate(&self, path: &Path) -> Result<Vec<DirEntryInfo>, ScopedFsError>;

    /// Returns size, kind flags and modification time of `path`
    fn resource_values(&self, path: &Path) -> Result<ResourceValues, ScopedFsError>;
}

/// Picks a name for `file_name` inside `dir` that does not exist yet.
///
/// Collisions get a numeric suffix before the extension: `notes 2.txt`.
pub(crate) fn unique_destination(dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dir.join(file_name);
    if candidate.symlink_metadata().is_err() {
        return candidate;
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 2;
    loop {
        let candidate = dir.join(format!("{} {}{}", stem, n, extension));
        if candidate.symlink_metadata().is_err() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_error_classification() {
        let blocked = ScopedFsError::blocked("/a", ScopeBlockedReason::MissingScope);
        assert!(blocked.is_access_error());
        assert_eq!(
            blocked.blocked_reason(),
            Some(ScopeBlockedReason::MissingScope)
        );

        let io = ScopedFsError::Io {
            path: PathBuf::from("/a"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert!(!io.is_access_error());
        assert_eq!(io.blocked_reason(), None);
        assert_eq!(io.path(), Path::new("/a"));
    }

    #[test]
    fn test_unique_destination_no_collision() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            unique_destination(dir.path(), Path::new("notes.txt")),
            dir.path().join("notes.txt")
        );
    }

    #[test]
    fn test_unique_destination_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"1").unwrap();
        fs::write(dir.path().join("notes 2.txt"), b"2").unwrap();
        assert_eq!(
            unique_destination(dir.path(), Path::new("notes.txt")),
            dir.path().join("notes 3.txt")
        );

        fs::create_dir(dir.path().join("build")).unwrap();
        assert_eq!(
            unique_destination(dir.path(), Path::new("build")),
            dir.path().join("build 2")
        );
    }
}
