//! OS-reserved locations that can never be access-granted
//!
//! The check runs before scope matching and overrides it.

use scope_types::CanonicalPath;
use std::path::Path;

/// System locations protected regardless of user.
const SYSTEM_PROTECTED: &[&str] = &[
    "/System",
    "/bin",
    "/sbin",
    "/usr/bin",
    "/usr/sbin",
    "/usr/lib",
    "/usr/libexec",
    "/usr/share",
    "/private/var/db",
    "/private/var/vm",
    "/Library/Apple",
    "/Library/Application Support/com.apple.TCC",
];

/// Per-user locations, relative to the home directory.
const HOME_PROTECTED: &[&str] = &[
    "Library/Mail",
    "Library/Messages",
    "Library/Safari",
    "Library/Cookies",
    "Library/Suggestions",
    "Library/Metadata/CoreSpotlight",
    "Library/Application Support/com.apple.TCC",
    "Library/Application Support/AddressBook",
    "Library/Application Support/CallHistoryDB",
];

/// Fixed deny-list of protected locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedPaths {
    entries: Vec<CanonicalPath>,
}

impl ProtectedPaths {
    /// Builds the built-in deny-list for the given home directory
    pub fn for_home(home: &Path) -> Self {
        let home = CanonicalPath::from_normalized(home);
        let entries = SYSTEM_PROTECTED
            .iter()
            .map(CanonicalPath::from_normalized)
            .chain(HOME_PROTECTED.iter().map(|rel| home.join(rel)))
            .collect();
        Self { entries }
    }

    /// Appends extra locations to the deny-list
    pub fn with_extra<I, P>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in extra {
            let entry = CanonicalPath::from_normalized(path);
            if !self.entries.contains(&entry) {
                self.entries.push(entry);
            }
        }
        self
    }

    /// Returns true if `path` is, or lies beneath, a protected location
    pub fn is_protected(&self, path: &CanonicalPath) -> bool {
        self.entries.iter().any(|entry| path.is_within(entry))
    }

    /// Returns true if a protected location lies strictly beneath `path`.
    ///
    /// Destructive operations on a directory must also check this: removing
    /// `~/Library` would take `~/Library/Mail` with it.
    pub fn contains_protected(&self, path: &CanonicalPath) -> bool {
        self.entries
            .iter()
            .any(|entry| entry != path && entry.is_within(path))
    }

    pub fn entries(&self) -> &[CanonicalPath] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protected() -> ProtectedPaths {
        ProtectedPaths::for_home(Path::new("/Users/alice"))
    }

    fn path(p: &str) -> CanonicalPath {
        CanonicalPath::from_normalized(p)
    }

    #[test]
    fn test_system_paths_are_protected() {
        let p = protected();
        assert!(p.is_protected(&path("/System")));
        assert!(p.is_protected(&path("/System/Library/CoreServices")));
        assert!(p.is_protected(&path("/usr/bin/env")));
    }

    #[test]
    fn test_usr_local_is_not_protected() {
        assert!(!protected().is_protected(&path("/usr/local/bin/tool")));
    }

    #[test]
    fn test_home_relative_paths_are_protected() {
        let p = protected();
        assert!(p.is_protected(&path("/Users/alice/Library/Mail/V10")));
        assert!(!p.is_protected(&path("/Users/alice/Library/Caches")));
        assert!(!p.is_protected(&path("/Users/bob/Library/Mail")));
    }

    #[test]
    fn test_contains_protected() {
        let p = protected();
        assert!(p.contains_protected(&path("/Users/alice/Library")));
        assert!(p.contains_protected(&path("/Users/alice")));
        assert!(p.contains_protected(&path("/")));
        assert!(p.contains_protected(&path("/usr")));
        assert!(!p.contains_protected(&path("/Users/alice/Library/Caches")));
        assert!(!p.contains_protected(&path("/Users/alice/Library/Mail")));
        assert!(!p.contains_protected(&path("/Users/bob")));
    }

    #[test]
    fn test_segment_matching() {
        assert!(!protected().is_protected(&path("/SystemBackup")));
    }

    #[test]
    fn test_with_extra() {
        let p = protected().with_extra(["/opt/vendor-locked"]);
        assert!(p.is_protected(&path("/opt/vendor-locked/db")));
        let count = p.entries().len();
        let p = p.with_extra(["/opt/vendor-locked/"]);
        assert_eq!(p.entries().len(), count);
    }
}
