//! # Simulated Sandbox
//!
//! Test doubles for the platform seam defined in `sandbox_api`.
//!
//! ## Philosophy
//!
//! - **Deterministic**: every refusal, stale token and unmount is scripted
//! - **Observable**: activations are counted and recorded in an audit trail so
//!   tests can assert on exact activate/deactivate pairs
//! - **Test-focused**: not intended for production use
//!
//! ## Example
//!
//! ```
//! use sandbox_api::SandboxPlatform;
//! use scope_types::CanonicalPath;
//! use sim_sandbox::SimulatedSandbox;
//!
//! let sandbox = SimulatedSandbox::new();
//! let root = CanonicalPath::from_normalized("/Volumes/Backup");
//! let token = sandbox.mint_token(&root).unwrap();
//!
//! sandbox.activate(&token).unwrap();
//! sandbox.deactivate(&token);
//! assert_eq!(sandbox.activate_count(), 1);
//! assert_eq!(sandbox.deactivate_count(), 1);
//! ```

pub mod platform;
pub mod store;

pub use platform::{SandboxEvent, SimulatedSandbox};
pub use store::{FailingStore, MemoryStore, StoreFailurePolicy};
