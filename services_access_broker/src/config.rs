//! Broker configuration
//!
//! Loaded from JSON. Every field has a default, so an empty object (or a
//! missing file) is a valid configuration.

use crate::ConfigError;
use scope_resolver::{canonicalize, ProtectedPaths, WellKnownRoots};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "scope-broker";
const REGISTRY_FILE: &str = "access_scopes.json";

/// Resolve the default location of the persisted registry.
///
/// Priority:
/// 1. `<data dir>/scope-broker/access_scopes.json`
/// 2. `~/.scope-broker/access_scopes.json`
/// 3. `./.scope-broker/access_scopes.json`
pub fn default_registry_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .or_else(|| dirs::home_dir().map(|home| home.join(format!(".{}", APP_DIR))))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
        .join(REGISTRY_FILE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Where the registry is persisted
    pub registry_path: PathBuf,

    /// Home, applications, startup disk and volumes locations
    pub roots: WellKnownRoots,

    /// Locations appended to the built-in protected deny-list
    pub extra_protected: Vec<PathBuf>,

    /// Destination for `move_to_trash`; `<home>/.Trash` when unset
    pub trash_dir: Option<PathBuf>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        Self {
            registry_path: default_registry_path(),
            roots: WellKnownRoots::for_home(&home),
            extra_protected: Vec::new(),
            trash_dir: None,
        }
    }
}

impl BrokerConfig {
    /// Deterministic configuration for a given home directory.
    ///
    /// The registry lives under `<home>/.scope-broker/`.
    pub fn for_home(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref();
        Self {
            registry_path: home.join(format!(".{}", APP_DIR)).join(REGISTRY_FILE),
            roots: WellKnownRoots::for_home(home),
            extra_protected: Vec::new(),
            trash_dir: None,
        }
    }

    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = path.into();
        self
    }

    pub fn with_extra_protected(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_protected.push(path.into());
        self
    }

    pub fn with_trash_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.trash_dir = Some(path.into());
        self
    }

    /// Loads a configuration file.
    ///
    /// A missing file yields the defaults. A malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn home(&self) -> &Path {
        self.roots.home.as_path()
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.trash_dir
            .clone()
            .unwrap_or_else(|| self.home().join(".Trash"))
    }

    /// Well-known roots with symbolic links resolved
    pub fn canonical_roots(&self) -> WellKnownRoots {
        let home = self.home();
        WellKnownRoots {
            home: canonicalize(home, home),
            applications: canonicalize(self.roots.applications.as_path(), home),
            startup_disk: canonicalize(self.roots.startup_disk.as_path(), home),
            volumes: canonicalize(self.roots.volumes.as_path(), home),
        }
    }

    /// Built-in deny-list plus `extra_protected`, canonicalized
    pub fn protected_paths(&self) -> ProtectedPaths {
        let home = self.home();
        ProtectedPaths::for_home(canonicalize(home, home).as_path()).with_extra(
            self.extra_protected
                .iter()
                .map(|path| canonicalize(path, home)),
        )
    }
}
