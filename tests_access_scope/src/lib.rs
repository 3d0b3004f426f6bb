//! Access Scope Test Utilities
//!
//! Shared setup for the end-to-end access scope tests.
//!
//! ## Test Philosophy
//!
//! - **Simulated platform**: no test touches a real OS sandbox; every
//!   activate/deactivate is counted by `SimulatedSandbox`
//! - **Restart is a first-class event**: a broker can be reopened over the
//!   same store to observe what survives
//! - **Invariants over examples**: registry shape and coverage are also
//!   checked under random operation sequences

use sandbox_api::RegistryStore;
use services_access_broker::{AccessBroker, BrokerConfig};
use services_scoped_fs::ScopedFs;
use sim_sandbox::{MemoryStore, SimulatedSandbox};
use std::sync::Arc;

/// Home directory used by simulated scenarios
pub const TEST_HOME: &str = "/Users/alice";

/// A broker wired to simulated collaborators
pub struct TestBroker {
    pub broker: Arc<AccessBroker>,
    pub sandbox: Arc<SimulatedSandbox>,
    pub store: Arc<MemoryStore>,
}

impl TestBroker {
    pub fn fs(&self) -> ScopedFs {
        ScopedFs::new(self.broker.clone())
    }

    /// Drops the broker and opens a fresh one over the same store,
    /// as after an application restart
    pub fn restart(self) -> TestBroker {
        let sandbox = Arc::new(SimulatedSandbox::new());
        let broker = AccessBroker::open(test_config(), sandbox.clone(), self.store.clone());
        TestBroker {
            broker: Arc::new(broker),
            sandbox,
            store: self.store,
        }
    }
}

/// Deterministic configuration rooted at [`TEST_HOME`]
pub fn test_config() -> BrokerConfig {
    BrokerConfig::for_home(TEST_HOME)
}

/// Bootstrap helper for tests
///
/// Opens a broker over an empty in-memory store.
pub fn test_bootstrap() -> TestBroker {
    let sandbox = Arc::new(SimulatedSandbox::new());
    let store = Arc::new(MemoryStore::new());
    let broker = AccessBroker::open(test_config(), sandbox.clone(), store.clone());
    TestBroker {
        broker: Arc::new(broker),
        sandbox,
        store,
    }
}

/// Opens a broker over an arbitrary store
pub fn bootstrap_with_store(store: Arc<dyn RegistryStore>) -> (AccessBroker, Arc<SimulatedSandbox>) {
    let sandbox = Arc::new(SimulatedSandbox::new());
    let broker = AccessBroker::open(test_config(), sandbox.clone(), store);
    (broker, sandbox)
}
