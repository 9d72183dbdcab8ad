//! Ledger store fixture

use shadow_core::LedgerStore;
use std::ops::Deref;
use tempfile::TempDir;

/// A [`LedgerStore`] whose file lives in a temporary directory.
///
/// The directory is removed when the fixture is dropped.
pub struct TempLedger {
    _dir: TempDir,
    store: LedgerStore,
}

impl TempLedger {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = LedgerStore::new(dir.path().join("ledger.toml"));
        Self { _dir: dir, store }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }
}

impl Default for TempLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TempLedger {
    type Target = LedgerStore;

    fn deref(&self) -> &LedgerStore {
        &self.store
    }
}
