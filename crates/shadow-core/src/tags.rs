//! Tag store accessor
//!
//! Loads the tags of a set of records in one store call and groups them by
//! owning record.

use crate::Result;
use crate::record::{ResourceKind, Scope, TagRecord};
use crate::store::LocalStore;
use serde_json::{Value, json};
use std::collections::{BTreeSet, HashMap};

/// Tags grouped by owner id, in store order within each owner
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    by_owner: HashMap<String, Vec<TagRecord>>,
}

impl TagIndex {
    /// Load the tags of `ids` (all records when empty) for `kinds`
    pub fn load(
        store: &dyn LocalStore,
        scope: &Scope,
        kinds: &[ResourceKind],
        ids: &BTreeSet<String>,
    ) -> Result<Self> {
        let tags = store.fetch_tags(scope, kinds, ids)?;
        let count = tags.len();
        let index = Self::from_records(tags);
        tracing::debug!(count, owners = index.owner_count(), "Loaded tags");
        Ok(index)
    }

    pub fn from_records(tags: impl IntoIterator<Item = TagRecord>) -> Self {
        let mut by_owner: HashMap<String, Vec<TagRecord>> = HashMap::new();
        for tag in tags {
            by_owner.entry(tag.item_id.clone()).or_default().push(tag);
        }
        Self { by_owner }
    }

    /// Tags owned by `owner_id`
    pub fn tags_for(&self, owner_id: &str) -> &[TagRecord] {
        self.by_owner.get(owner_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `[{key, value}, ...]` for `owner_id`, or `None` when it has no tags
    pub fn tag_set(&self, owner_id: &str) -> Option<Value> {
        let tags = self.tags_for(owner_id);
        if tags.is_empty() {
            return None;
        }
        Some(Value::Array(
            tags.iter()
                .map(|tag| json!({"key": tag.key, "value": tag.value}))
                .collect(),
        ))
    }

    /// Number of owners with at least one tag
    pub fn owner_count(&self) -> usize {
        self.by_owner.len()
    }
}
