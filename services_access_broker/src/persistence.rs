//! Registry persistence layer
//!
//! The registry file is a JSON array of [`ScopeRecord`]s in private
//! application storage. Saves write a sibling temp file and rename it over the
//! target, so a crash mid-save leaves the previous registry intact.

use sandbox_api::{RegistryStore, StoreError};
use scope_types::ScopeRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Serializes registry records to JSON bytes
pub fn encode_records(records: &[ScopeRecord]) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(records).map_err(|e| StoreError::Serialize(e.to_string()))
}

/// Deserializes registry records from JSON bytes
pub fn decode_records(bytes: &[u8]) -> Result<Vec<ScopeRecord>, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Serialize(e.to_string()))
}

/// Loads records, falling back to an empty registry on any error.
///
/// An unreadable or corrupt registry is equivalent to first run.
pub fn load_records_safe(store: &dyn RegistryStore) -> Vec<ScopeRecord> {
    store.load().unwrap_or_else(|error| {
        warn!(%error, "persisted access scope registry is unreadable, starting empty");
        Vec::new()
    })
}

/// [`RegistryStore`] backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<ScopeRecord>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => decode_records(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::Read(format!("{}: {}", self.path.display(), e))),
        }
    }

    fn save(&self, records: &[ScopeRecord]) -> Result<(), StoreError> {
        let bytes = encode_records(records)?;
        let write_error = |e: std::io::Error| StoreError::Write(format!("{}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, &bytes).map_err(write_error)?;
        fs::rename(&temp, &self.path).map_err(write_error)
    }
}
