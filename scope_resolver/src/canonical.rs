//! Path canonicalization
//!
//! `canonicalize` is idempotent: feeding its output back in returns the same
//! path. Segments that do not exist yet (a file about to be written) are kept
//! lexically after the deepest existing ancestor has been resolved.

use scope_types::CanonicalPath;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Expands a leading `~` segment to `home`.
///
/// `~user` forms are not expanded.
pub fn expand_home(path: &Path, home: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => home.join(components.as_path()),
        _ => path.to_path_buf(),
    }
}

/// Home expansion plus lexical normalization, without touching the filesystem.
///
/// This is the path an operation acts on: a symlink inside a granted root is
/// removed as a link, not followed.
pub fn normalize_lexical(path: &Path, home: &Path) -> CanonicalPath {
    CanonicalPath::from_normalized(expand_home(path, home))
}

/// Canonicalizes a requested path.
///
/// Expands `~`, strips `.`/`..` and trailing separators, then resolves
/// symbolic links in the deepest existing ancestor.
pub fn canonicalize(path: &Path, home: &Path) -> CanonicalPath {
    let lexical = normalize_lexical(path, home);
    CanonicalPath::from_normalized(resolve_links(lexical.as_path()))
}

fn resolve_links(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        if let Ok(resolved) = fs::canonicalize(&existing) {
            let mut out = resolved;
            for segment in missing.iter().rev() {
                out.push(segment);
            }
            return out;
        }

        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name.to_os_string());
                existing = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }
}
