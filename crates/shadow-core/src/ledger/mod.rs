//! Ledger of shadow records
//!
//! The ledger is a TOML document holding every shadow record and tag of
//! every project. It is loaded under a shared lock and saved atomically
//! under an exclusive one. [`LedgerStore`] exposes it as a
//! [`LocalStore`](crate::store::LocalStore).

mod store;

pub use store::LedgerStore;

use crate::Result;
use crate::record::{LocalRecord, ResourceKind, TagRecord};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use uuid::Uuid;

/// Kind encoded in a record id (`vol-1a2b3c4d` is a `vol`)
pub fn kind_of(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

/// Generate a record id for `kind` that `taken` does not reject
///
/// Ids have the form `<kind>-<8 lowercase hex digits>`.
pub fn generate_id(kind: &ResourceKind, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("{}-{}", kind, &suffix[..8]);
        if !taken(&id) {
            return id;
        }
    }
}

/// The persisted set of shadow records and tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Ledger format version for forward compatibility
    version: String,
    /// Time of the last save through a [`LedgerStore`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    records: Vec<LocalRecord>,
    #[serde(default)]
    tags: Vec<TagRecord>,
}

impl Ledger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            updated_at: None,
            records: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Load a ledger from a TOML file with shared lock
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, locked, or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        file.lock_shared()?;

        // Read through the locked handle so the content matches the lock
        let mut content = String::new();
        use std::io::Read;
        (&file).read_to_string(&mut content)?;
        let ledger: Ledger = toml::from_str(&content)?;

        Ok(ledger)
    }

    /// Save the ledger to a TOML file atomically with exclusive lock
    ///
    /// Writes a temporary sibling file and renames it over the target while
    /// holding the lock.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        lock_file.lock_exclusive()?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Stamp the ledger with the current time
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    pub fn records(&self) -> &[LocalRecord] {
        &self.records
    }

    pub fn tags(&self) -> &[TagRecord] {
        &self.tags
    }

    pub fn add_record(&mut self, record: LocalRecord) {
        self.records.push(record);
    }

    /// Remove a record and every tag it owns
    ///
    /// Returns the removed record if found, None otherwise.
    pub fn remove_record(&mut self, project_id: &str, id: &str) -> Option<LocalRecord> {
        let pos = self
            .records
            .iter()
            .position(|r| r.project_id == project_id && r.id == id)?;
        self.tags
            .retain(|t| !(t.project_id == project_id && t.item_id == id));
        Some(self.records.remove(pos))
    }

    pub fn get_record(&self, project_id: &str, id: &str) -> Option<&LocalRecord> {
        self.records
            .iter()
            .find(|r| r.project_id == project_id && r.id == id)
    }

    /// Whether any project uses `id`
    pub fn contains_id(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Records of `kind` in a project, restricted to `ids` unless empty
    pub fn records_of(
        &self,
        project_id: &str,
        kind: &ResourceKind,
        ids: &BTreeSet<String>,
    ) -> Vec<&LocalRecord> {
        self.records
            .iter()
            .filter(|r| r.project_id == project_id && &r.kind == kind)
            .filter(|r| ids.is_empty() || ids.contains(&r.id))
            .collect()
    }

    /// Set a tag, replacing the value of an existing key
    pub fn set_tag(&mut self, tag: TagRecord) {
        match self.tags.iter_mut().find(|t| {
            t.project_id == tag.project_id && t.item_id == tag.item_id && t.key == tag.key
        }) {
            Some(existing) => existing.value = tag.value,
            None => self.tags.push(tag),
        }
    }

    /// Remove the tags of `item_id` whose key is in `keys`
    ///
    /// Returns the number of tags removed.
    pub fn remove_tags(&mut self, project_id: &str, item_id: &str, keys: &[&str]) -> usize {
        let before = self.tags.len();
        self.tags.retain(|t| {
            !(t.project_id == project_id && t.item_id == item_id && keys.contains(&t.key.as_str()))
        });
        before - self.tags.len()
    }

    /// Tags of records whose id encodes one of `kinds`, restricted to `ids`
    /// unless empty
    pub fn tags_of(
        &self,
        project_id: &str,
        kinds: &[ResourceKind],
        ids: &BTreeSet<String>,
    ) -> Vec<&TagRecord> {
        self.tags
            .iter()
            .filter(|t| t.project_id == project_id)
            .filter(|t| kinds.iter().any(|k| k.as_str() == kind_of(&t.item_id)))
            .filter(|t| ids.is_empty() || ids.contains(&t.item_id))
            .collect()
    }
}
