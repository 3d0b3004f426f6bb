//! Scoped filesystem service implementation

use crate::operations::{
    unique_destination, AuthorizationPartition, DirEntryInfo, ResourceValues,
    ScopedFileOperations, ScopedFsError,
};
use chrono::{DateTime, Utc};
use scope_types::{ScopeAccessState, ScopeBlockedReason};
use services_access_broker::{AccessBroker, AccessError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessMode {
    Read,
    Write,
}

/// Facade over [`AccessBroker`] for feature code
#[derive(Clone)]
pub struct ScopedFs {
    broker: Arc<AccessBroker>,
}

impl ScopedFs {
    pub fn new(broker: Arc<AccessBroker>) -> Self {
        Self { broker }
    }

    pub fn broker(&self) -> &Arc<AccessBroker> {
        &self.broker
    }

    /// Pre-flight check for a single path. Takes no lease and never modifies
    /// the disk.
    pub fn access_state(&self, path: impl AsRef<Path>) -> ScopeAccessState {
        self.broker.access_state(path)
    }

    /// Splits `paths` into reachable and blocked ones, keeping input order.
    ///
    /// `NeedsAccess` paths are reported as blocked with `MissingScope`.
    pub fn filter_authorized_paths<I, P>(&self, paths: I) -> AuthorizationPartition
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut partition = AuthorizationPartition::default();
        for path in paths {
            let path = path.as_ref();
            match self.broker.access_state(path) {
                ScopeAccessState::Ready => partition.authorized.push(path.to_path_buf()),
                ScopeAccessState::NeedsAccess => partition
                    .blocked
                    .push((path.to_path_buf(), ScopeBlockedReason::MissingScope)),
                ScopeAccessState::Limited(reason) => {
                    partition.blocked.push((path.to_path_buf(), reason))
                }
            }
        }
        if !partition.blocked.is_empty() {
            debug!(
                authorized = partition.authorized.len(),
                blocked = partition.blocked.len(),
                "paths partitioned"
            );
        }
        partition
    }

    fn guarded<T, F>(&self, path: &Path, mode: AccessMode, operation: F) -> Result<T, ScopedFsError>
    where
        F: FnOnce(&Path) -> io::Result<T>,
    {
        self.broker
            .with_access(path, operation)
            .map_err(|error| match error {
                AccessError::Blocked(reason) => {
                    debug!(path = %path.display(), %reason, "operation blocked");
                    ScopedFsError::blocked(path, reason)
                }
                AccessError::Operation(source) => io_error(path, mode, source),
            })
    }

    /// Refuses destructive operations on an ancestor of a protected location
    fn ensure_no_protected_descendants(&self, path: &Path) -> Result<(), ScopedFsError> {
        if self.broker.contains_protected(path) {
            let reason = ScopeBlockedReason::OsProtectedPath;
            warn!(path = %path.display(), %reason, "destructive operation would reach a protected location");
            return Err(ScopedFsError::blocked(path, reason));
        }
        Ok(())
    }
}

/// Keeps sandbox denials out of the I/O error channel
fn io_error(path: &Path, mode: AccessMode, source: io::Error) -> ScopedFsError {
    if source.kind() != io::ErrorKind::PermissionDenied {
        return ScopedFsError::Io {
            path: path.to_path_buf(),
            source,
        };
    }

    let reason = match mode {
        AccessMode::Read => ScopeBlockedReason::SandboxReadDenied,
        AccessMode::Write => ScopeBlockedReason::SandboxWriteDenied,
    };
    warn!(path = %path.display(), error = %source, %reason, "platform denied access");
    ScopedFsError::blocked(path, reason)
}

impl ScopedFileOperations for ScopedFs {
    fn read(&self, path: &Path) -> Result<Vec<u8>, ScopedFsError> {
        self.guarded(path, AccessMode::Read, |target| fs::read(target))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), ScopedFsError> {
        self.guarded(path, AccessMode::Write, |target| {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(target, contents)
        })
    }

    fn remove(&self, path: &Path) -> Result<(), ScopedFsError> {
        self.ensure_no_protected_descendants(path)?;
        self.guarded(path, AccessMode::Write, |target| {
            let metadata = fs::symlink_metadata(target)?;
            if metadata.is_dir() {
                fs::remove_dir_all(target)
            } else {
                fs::remove_file(target)
            }
        })?;
        info!(path = %path.display(), "item removed");
        Ok(())
    }

    fn move_to_trash(&self, path: &Path) -> Result<PathBuf, ScopedFsError> {
        self.ensure_no_protected_descendants(path)?;
        let trash = self.broker.config().trash_dir();

        let outcome = self.broker.with_access(path, |source| {
            let file_name = source.file_name().map(PathBuf::from).ok_or_else(|| {
                ScopedFsError::Io {
                    path: source.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
                }
            })?;
            fs::symlink_metadata(source).map_err(|e| io_error(source, AccessMode::Write, e))?;

            self.guarded(&trash, AccessMode::Write, |trash_dir| {
                fs::create_dir_all(trash_dir)?;
                let destination = unique_destination(trash_dir, &file_name);
                fs::rename(source, &destination)?;
                Ok(destination)
            })
        });

        match outcome {
            Ok(destination) => {
                info!(
                    path = %path.display(),
                    destination = %destination.display(),
                    "item moved to trash"
                );
                Ok(destination)
            }
            Err(AccessError::Blocked(reason)) => Err(ScopedFsError::blocked(path, reason)),
            Err(AccessError::Operation(error)) => Err(error),
        }
    }

    fn enumerate(&self, path: &Path) -> Result<Vec<DirEntryInfo>, ScopedFsError> {
        self.guarded(path, AccessMode::Read, |target| {
            let mut entries = Vec::new();
            for entry in fs::read_dir(target)? {
                let entry = entry?;
                let file_type = entry.file_type()?;
                entries.push(DirEntryInfo {
                    path: entry.path(),
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_dir: file_type.is_dir(),
                    is_symlink: file_type.is_symlink(),
                });
            }
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(entries)
        })
    }

    fn resource_values(&self, path: &Path) -> Result<ResourceValues, ScopedFsError> {
        self.guarded(path, AccessMode::Read, |target| {
            let metadata = fs::symlink_metadata(target)?;
            Ok(ResourceValues {
                size: metadata.len(),
                is_dir: metadata.is_dir(),
                is_file: metadata.is_file(),
                is_symlink: metadata.file_type().is_symlink(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services_access_broker::BrokerConfig;
    use sim_sandbox::{MemoryStore, SimulatedSandbox};
    use tempfile::TempDir;

    struct Fixture {
        home: TempDir,
        sandbox: Arc<SimulatedSandbox>,
        fs: ScopedFs,
    }

    fn fixture() -> Fixture {
        let home = tempfile::tempdir().unwrap();
        let sandbox = Arc::new(SimulatedSandbox::new());
        let broker = AccessBroker::open(
            BrokerConfig::for_home(home.path()),
            sandbox.clone(),
            Arc::new(MemoryStore::new()),
        );
        Fixture {
            home,
            sandbox,
            fs: ScopedFs::new(Arc::new(broker)),
        }
    }

    #[test]
    fn test_write_then_read() {
        let f = fixture();
        f.fs.broker().add_scope(f.home.path()).unwrap();

        let path = f.home.path().join("Documents/report.txt");
        f.fs.write(&path, b"quarterly").unwrap();
        assert_eq!(f.fs.read(&path).unwrap(), b"quarterly");
        assert_eq!(f.sandbox.activate_count(), 2);
        assert_eq!(f.sandbox.deactivate_count(), 2);
    }

    #[test]
    fn test_read_without_scope_is_blocked() {
        let f = fixture();
        let path = f.home.path().join("secret.txt");
        fs::write(&path, b"x").unwrap();

        let error = f.fs.read(&path).unwrap_err();
        assert!(error.is_access_error());
        assert_eq!(
            error.blocked_reason(),
            Some(ScopeBlockedReason::MissingScope)
        );
        assert_eq!(f.sandbox.activate_count(), 0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let f = fixture();
        f.fs.broker().add_scope(f.home.path()).unwrap();
        let error = f.fs.read(&f.home.path().join("absent.txt")).unwrap_err();
        assert!(!error.is_access_error());
        assert_eq!(f.sandbox.open_token_count(), 0);
    }

    #[test]
    fn test_permission_denied_maps_to_sandbox_reason() {
        let denied = || io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            io_error(Path::new("/a"), AccessMode::Read, denied()).blocked_reason(),
            Some(ScopeBlockedReason::SandboxReadDenied)
        );
        assert_eq!(
            io_error(Path::new("/a"), AccessMode::Write, denied()).blocked_reason(),
            Some(ScopeBlockedReason::SandboxWriteDenied)
        );
        let other = io::Error::new(io::ErrorKind::Other, "disk full");
        assert!(!io_error(Path::new("/a"), AccessMode::Write, other).is_access_error());
    }

    #[test]
    fn test_filter_authorized_paths() {
        let f = fixture();
        let granted = f.home.path().join("Projects");
        fs::create_dir(&granted).unwrap();
        f.fs.broker().add_scope(&granted).unwrap();

        let inside = granted.join("app");
        let outside = f.home.path().join("Music");
        let mail = f.home.path().join("Library/Mail");
        let partition = f
            .fs
            .filter_authorized_paths([inside.clone(), outside.clone(), mail.clone()]);

        assert_eq!(partition.authorized, vec![inside]);
        assert_eq!(
            partition.blocked,
            vec![
                (outside, ScopeBlockedReason::MissingScope),
                (mail, ScopeBlockedReason::OsProtectedPath),
            ]
        );
        assert!(!partition.is_fully_authorized());
    }

    #[test]
    fn test_remove_ancestor_of_protected_is_blocked() {
        let f = fixture();
        f.fs.broker().add_scope(f.home.path()).unwrap();
        let library = f.home.path().join("Library");
        fs::create_dir_all(library.join("Mail")).unwrap();

        let error = f.fs.remove(&library).unwrap_err();
        assert_eq!(
            error.blocked_reason(),
            Some(ScopeBlockedReason::OsProtectedPath)
        );
        assert!(library.join("Mail").exists());
        assert_eq!(f.sandbox.activate_count(), 0);
    }

    #[test]
    fn test_enumerate_one_level() {
        let f = fixture();
        f.fs.broker().add_scope(f.home.path()).unwrap();
        let dir = f.home.path().join("Downloads");
        fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        fs::write(dir.join("b.zip"), b"zip").unwrap();
        fs::write(dir.join("a.dmg"), b"dmg").unwrap();

        let names: Vec<String> = f
            .fs
            .enumerate(&dir)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.dmg", "b.zip", "nested"]);
    }
}
