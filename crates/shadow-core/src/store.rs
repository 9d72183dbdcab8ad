//! Local store contract
//!
//! The store persists shadow records and their tags. The core reads, creates
//! and deletes records through it and never edits one in place.

use crate::Result;
use crate::record::{LocalRecord, ResourceKind, Scope, TagRecord};
use std::collections::BTreeSet;

/// Persistence for shadow records and tags
///
/// Every call is confined to `scope`. Errors are propagated to the caller of
/// the describe pass unchanged.
pub trait LocalStore {
    /// Records of `kind`; an empty `ids` set means all records of the kind.
    fn fetch(&self, scope: &Scope, kind: &ResourceKind, ids: &BTreeSet<String>)
    -> Result<Vec<LocalRecord>>;

    /// Create a record of `kind` shadowing `external_id`.
    fn create(&self, scope: &Scope, kind: &ResourceKind, external_id: &str) -> Result<LocalRecord>;

    /// Delete the record `id` together with its tags.
    fn delete(&self, scope: &Scope, id: &str) -> Result<()>;

    /// Tags of records whose kind is in `kinds`; an empty `ids` set means
    /// all of them.
    fn fetch_tags(
        &self,
        scope: &Scope,
        kinds: &[ResourceKind],
        ids: &BTreeSet<String>,
    ) -> Result<Vec<TagRecord>>;
}
