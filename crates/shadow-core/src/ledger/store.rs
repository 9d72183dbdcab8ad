//! File-backed local store

use super::{Ledger, generate_id};
use crate::record::{LocalRecord, ResourceKind, Scope, TagRecord};
use crate::store::LocalStore;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// [`LocalStore`] persisting to a ledger file
///
/// Every operation loads the ledger, applies its change and saves it. A
/// missing file reads as an empty ledger. The file lock covers each load and
/// each save, not the read-modify-write cycle between them.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger from disk, or create an empty one if it doesn't exist
    pub fn load(&self) -> Result<Ledger> {
        if self.path.exists() {
            Ledger::load(&self.path)
        } else {
            Ok(Ledger::new())
        }
    }

    /// Stamp and save the ledger, creating the parent directory if needed
    fn commit(&self, mut ledger: Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        ledger.touch();
        ledger.save(&self.path)
    }

    /// Persist a record for a resource created outside a describe pass
    ///
    /// This is how shadow records of kinds that are never auto-created come
    /// into existence.
    pub fn register(
        &self,
        scope: &Scope,
        kind: &ResourceKind,
        external_id: Option<&str>,
        attributes: Value,
    ) -> Result<LocalRecord> {
        let mut ledger = self.load()?;
        let id = generate_id(kind, |candidate| ledger.contains_id(candidate));
        let record = LocalRecord::new(id, scope, kind.clone(), external_id.map(str::to_string))
            .with_attributes(attributes);
        ledger.add_record(record.clone());
        self.commit(ledger)?;
        Ok(record)
    }

    /// Set tags on an existing record
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerError`] if the record does not exist.
    pub fn add_tags(&self, scope: &Scope, item_id: &str, tags: &[(&str, &str)]) -> Result<()> {
        let mut ledger = self.load()?;
        if ledger.get_record(scope.project_id(), item_id).is_none() {
            return Err(Error::LedgerError {
                message: format!("cannot tag unknown record {}", item_id),
            });
        }
        for (key, value) in tags {
            ledger.set_tag(TagRecord::new(scope, item_id, *key, *value));
        }
        self.commit(ledger)
    }

    /// Remove tags by key from a record
    pub fn remove_tags(&self, scope: &Scope, item_id: &str, keys: &[&str]) -> Result<usize> {
        let mut ledger = self.load()?;
        let removed = ledger.remove_tags(scope.project_id(), item_id, keys);
        if removed > 0 {
            self.commit(ledger)?;
        }
        Ok(removed)
    }
}

impl LocalStore for LedgerStore {
    fn fetch(
        &self,
        scope: &Scope,
        kind: &ResourceKind,
        ids: &BTreeSet<String>,
    ) -> Result<Vec<LocalRecord>> {
        let ledger = self.load()?;
        Ok(ledger
            .records_of(scope.project_id(), kind, ids)
            .into_iter()
            .cloned()
            .collect())
    }

    fn create(&self, scope: &Scope, kind: &ResourceKind, external_id: &str) -> Result<LocalRecord> {
        self.register(scope, kind, Some(external_id), Value::Object(Default::default()))
    }

    fn delete(&self, scope: &Scope, id: &str) -> Result<()> {
        let mut ledger = self.load()?;
        if ledger.remove_record(scope.project_id(), id).is_none() {
            return Err(Error::LedgerError {
                message: format!("record {} not found", id),
            });
        }
        self.commit(ledger)
    }

    fn fetch_tags(
        &self,
        scope: &Scope,
        kinds: &[ResourceKind],
        ids: &BTreeSet<String>,
    ) -> Result<Vec<TagRecord>> {
        let ledger = self.load()?;
        Ok(ledger
            .tags_of(scope.project_id(), kinds, ids)
            .into_iter()
            .cloned()
            .collect())
    }
}
