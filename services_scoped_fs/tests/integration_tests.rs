//! Integration tests for the scoped filesystem service
//!
//! These run against the real filesystem through `HostPlatform`:
//! - Cleanup flows (remove, move to trash)
//! - Metadata queries
//! - Blocked operations leaving the disk untouched

use scope_types::{ScopeAccessState, ScopeBlockedReason};
use services_access_broker::{AccessBroker, BrokerConfig, HostPlatform};
use services_scoped_fs::{ScopedFileOperations, ScopedFs};
use sim_sandbox::MemoryStore;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn open(home: &Path, trash: Option<&Path>) -> ScopedFs {
    let mut config = BrokerConfig::for_home(home);
    if let Some(trash) = trash {
        config = config.with_trash_dir(trash);
    }
    let broker = AccessBroker::open(
        config,
        Arc::new(HostPlatform::new()),
        Arc::new(MemoryStore::new()),
    );
    ScopedFs::new(Arc::new(broker))
}

fn granted_home() -> (TempDir, ScopedFs) {
    let home = tempfile::tempdir().unwrap();
    let fs = open(home.path(), None);
    fs.broker().add_scope(home.path()).unwrap();
    (home, fs)
}

#[test]
fn test_remove_directory_tree() {
    let (home, fs) = granted_home();
    let caches = home.path().join("Library/Caches/com.example.app");
    fs.write(&caches.join("a/b/blob.bin"), &[0u8; 64]).unwrap();

    fs.remove(&caches).unwrap();
    assert!(!caches.exists());
    assert!(home.path().join("Library/Caches").exists());
}

#[test]
fn test_remove_missing_item_is_io_error() {
    let (home, fs) = granted_home();
    let error = fs.remove(&home.path().join("nothing-here")).unwrap_err();
    assert!(!error.is_access_error());
}

#[test]
fn test_move_to_trash_with_collisions() {
    let (home, fs) = granted_home();
    let first = home.path().join("Downloads/installer.dmg");
    let second = home.path().join("Desktop/installer.dmg");
    fs.write(&first, b"one").unwrap();
    fs.write(&second, b"two").unwrap();

    let trashed_first = fs.move_to_trash(&first).unwrap();
    let trashed_second = fs.move_to_trash(&second).unwrap();

    let trash = home.path().join(".Trash");
    assert_eq!(trashed_first, trash.join("installer.dmg"));
    assert_eq!(trashed_second, trash.join("installer 2.dmg"));
    assert!(!first.exists());
    assert_eq!(std::fs::read(&trashed_second).unwrap(), b"two");
}

#[test]
fn test_move_to_trash_requires_trash_access() {
    let home = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    let fs = open(home.path(), Some(&elsewhere.path().join("Trash")));
    fs.broker().add_scope(home.path()).unwrap();

    let item = home.path().join("old.log");
    fs.write(&item, b"log").unwrap();

    let error = fs.move_to_trash(&item).unwrap_err();
    assert_eq!(
        error.blocked_reason(),
        Some(ScopeBlockedReason::MissingScope)
    );
    assert!(item.exists());

    fs.broker().add_scope(elsewhere.path()).unwrap();
    let destination = fs.move_to_trash(&item).unwrap();
    assert!(destination.starts_with(elsewhere.path().join("Trash")));
    assert!(!item.exists());
}

#[test]
fn test_resource_values() {
    let (home, fs) = granted_home();
    let file = home.path().join("Movies/clip.mov");
    fs.write(&file, &[7u8; 1024]).unwrap();

    let values = fs.resource_values(&file).unwrap();
    assert_eq!(values.size, 1024);
    assert!(values.is_file);
    assert!(!values.is_dir);
    assert!(!values.is_symlink);
    assert!(values.modified.is_some());

    let dir = fs.resource_values(&home.path().join("Movies")).unwrap();
    assert!(dir.is_dir);
}

#[test]
fn test_blocked_write_leaves_disk_untouched() {
    let home = tempfile::tempdir().unwrap();
    let fs = open(home.path(), None);
    let target = home.path().join("Documents/new.txt");

    assert_eq!(fs.access_state(&target), ScopeAccessState::NeedsAccess);
    let error = fs.write(&target, b"data").unwrap_err();
    assert!(error.is_access_error());
    assert!(!home.path().join("Documents").exists());
}

#[test]
fn test_protected_location_inside_grant() {
    let (home, fs) = granted_home();
    let mail = home.path().join("Library/Mail/V10/inbox.mbox");
    fs::create_dir_all(mail.parent().unwrap()).unwrap();
    fs::write(&mail, b"mail").unwrap();

    assert_eq!(
        fs.access_state(&mail),
        ScopeAccessState::Limited(ScopeBlockedReason::OsProtectedPath)
    );
    let error = fs.read(&mail).unwrap_err();
    assert_eq!(
        error.blocked_reason(),
        Some(ScopeBlockedReason::OsProtectedPath)
    );
    assert!(fs.remove(&mail).is_err());
    assert!(mail.exists());
}

#[test]
fn test_destructive_operations_refuse_ancestors_of_protected_locations() {
    let (home, fs) = granted_home();
    let library = home.path().join("Library");
    let mail = library.join("Mail/V10/inbox.mbox");
    fs::create_dir_all(mail.parent().unwrap()).unwrap();
    fs::write(&mail, b"mail").unwrap();

    let error = fs.remove(&library).unwrap_err();
    assert_eq!(
        error.blocked_reason(),
        Some(ScopeBlockedReason::OsProtectedPath)
    );
    let error = fs.move_to_trash(&library).unwrap_err();
    assert_eq!(
        error.blocked_reason(),
        Some(ScopeBlockedReason::OsProtectedPath)
    );
    let error = fs.remove(home.path()).unwrap_err();
    assert_eq!(
        error.blocked_reason(),
        Some(ScopeBlockedReason::OsProtectedPath)
    );

    assert_eq!(fs::read(&mail).unwrap(), b"mail");
    assert!(!home.path().join(".Trash/Library").exists());

    // Siblings without protected descendants are still removable
    let caches = library.join("Caches/com.example.app");
    fs.write(&caches.join("blob.bin"), b"cache").unwrap();
    fs.remove(&library.join("Caches")).unwrap();
    assert!(!library.join("Caches").exists());
}
