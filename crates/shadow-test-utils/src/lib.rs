//! Shared test utilities for the shadow workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`store`]: [`MemoryStore`], an in-memory [`LocalStore`](shadow_core::LocalStore)
//!   that records every create and delete
//! - [`strategy`]: [`ScriptedStrategy`], a strategy serving a fixed list of
//!   provider items
//! - [`ledger`]: [`TempLedger`], a [`LedgerStore`](shadow_core::LedgerStore) in a
//!   temporary directory

pub mod ledger;
pub mod store;
pub mod strategy;

pub use ledger::TempLedger;
pub use store::MemoryStore;
pub use strategy::ScriptedStrategy;

/// Install a test-friendly tracing subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
