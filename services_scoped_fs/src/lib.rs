//! # Scoped Filesystem Service
//!
//! The only filesystem surface feature code is allowed to use.
//!
//! ## Philosophy
//!
//! - Every operation runs inside `AccessBroker::with_access`
//! - Pre-flight checks (`access_state`, `filter_authorized_paths`) never take
//!   a lease and never modify the disk
//! - `remove` and `move_to_trash` refuse any directory that contains a
//!   protected location
//! - Sandbox denials surface as blocked reasons, never as raw OS errors
//! - Genuine I/O failures stay I/O failures, so "grant access" and "this file
//!   is broken" can be told apart
//!
//! ## Operations
//!
//! - `read(path)` / `write(path, bytes)`
//! - `remove(path)`: files and directory trees
//! - `move_to_trash(path)`: renames into the trash directory
//! - `enumerate(path)`: one directory level
//! - `resource_values(path)`: size, kind flags, modification time

pub mod operations;
pub mod service;

pub use operations::{
    AuthorizationPartition, DirEntryInfo, ResourceValues, ScopedFileOperations, ScopedFsError,
};
pub use service::ScopedFs;
