//! In-memory local store

use shadow_core::{Error, LocalRecord, LocalStore, ResourceKind, Result, Scope, TagRecord};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    records: Vec<LocalRecord>,
    tags: Vec<TagRecord>,
    created: Vec<String>,
    deleted: Vec<String>,
    next_id: u32,
    fail_create: bool,
    fail_delete: bool,
}

/// A [`LocalStore`] holding everything in memory.
///
/// Ids are allocated sequentially (`vol-00000001`, `vol-00000002`, ...) so
/// tests can predict them. Every create and delete made through the trait is
/// logged for later assertions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Seed a record without logging it as created.
    pub fn seed(
        &self,
        scope: &Scope,
        kind: &str,
        external_id: Option<&str>,
        attributes: Value,
    ) -> LocalRecord {
        let mut state = self.state();
        state.next_id += 1;
        let id = format!("{}-{:08x}", kind, state.next_id);
        let record = LocalRecord::new(id, scope, kind.into(), external_id.map(str::to_string))
            .with_attributes(attributes);
        state.records.push(record.clone());
        record
    }

    /// Seed a record with an explicit id.
    pub fn seed_with_id(&self, scope: &Scope, id: &str, external_id: Option<&str>) -> LocalRecord {
        let kind = id.split('-').next().unwrap_or(id);
        let record = LocalRecord::new(id, scope, kind.into(), external_id.map(str::to_string));
        self.state().records.push(record.clone());
        record
    }

    pub fn tag(&self, scope: &Scope, item_id: &str, key: &str, value: &str) {
        self.state()
            .tags
            .push(TagRecord::new(scope, item_id, key, value));
    }

    /// Make every following `create` fail.
    pub fn fail_creates(&self) {
        self.state().fail_create = true;
    }

    /// Make every following `delete` fail.
    pub fn fail_deletes(&self) {
        self.state().fail_delete = true;
    }

    pub fn records(&self) -> Vec<LocalRecord> {
        self.state().records.clone()
    }

    pub fn record_ids(&self) -> Vec<String> {
        self.state().records.iter().map(|r| r.id.clone()).collect()
    }

    /// Ids created through [`LocalStore::create`], in order.
    pub fn created(&self) -> Vec<String> {
        self.state().created.clone()
    }

    /// Ids deleted through [`LocalStore::delete`], in order.
    pub fn deleted(&self) -> Vec<String> {
        self.state().deleted.clone()
    }
}

impl LocalStore for MemoryStore {
    fn fetch(
        &self,
        scope: &Scope,
        kind: &ResourceKind,
        ids: &BTreeSet<String>,
    ) -> Result<Vec<LocalRecord>> {
        Ok(self
            .state()
            .records
            .iter()
            .filter(|r| r.project_id == scope.project_id() && &r.kind == kind)
            .filter(|r| ids.is_empty() || ids.contains(&r.id))
            .cloned()
            .collect())
    }

    fn create(&self, scope: &Scope, kind: &ResourceKind, external_id: &str) -> Result<LocalRecord> {
        let mut state = self.state();
        if state.fail_create {
            return Err(Error::Store {
                message: format!("create of {} refused", kind),
            });
        }
        state.next_id += 1;
        let id = format!("{}-{:08x}", kind, state.next_id);
        let record = LocalRecord::new(id, scope, kind.clone(), Some(external_id.to_string()));
        state.records.push(record.clone());
        state.created.push(record.id.clone());
        Ok(record)
    }

    fn delete(&self, scope: &Scope, id: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_delete {
            return Err(Error::Store {
                message: format!("delete of {} refused", id),
            });
        }
        // Duplicated records are all removed, but the delete is logged once
        state
            .records
            .retain(|r| !(r.project_id == scope.project_id() && r.id == id));
        state
            .tags
            .retain(|t| !(t.project_id == scope.project_id() && t.item_id == id));
        state.deleted.push(id.to_string());
        Ok(())
    }

    fn fetch_tags(
        &self,
        scope: &Scope,
        kinds: &[ResourceKind],
        ids: &BTreeSet<String>,
    ) -> Result<Vec<TagRecord>> {
        Ok(self
            .state()
            .tags
            .iter()
            .filter(|t| t.project_id == scope.project_id())
            .filter(|t| {
                let kind = t.item_id.split('-').next().unwrap_or_default();
                kinds.iter().any(|k| k.as_str() == kind)
            })
            .filter(|t| ids.is_empty() || ids.contains(&t.item_id))
            .cloned()
            .collect())
    }
}
