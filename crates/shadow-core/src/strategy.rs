//! Per-kind strategy capabilities
//!
//! A describe pass is generic; everything that differs between resource
//! kinds is supplied by a [`ResourceStrategy`] chosen when the describer is
//! constructed. Most strategies only implement [`ResourceStrategy::kind`],
//! [`ResourceStrategy::fetch_external`] and [`ResourceStrategy::project`].

use crate::Result;
use crate::filter::{Filter, FilterSchema, FilterValue, pattern_matches};
use crate::record::{ExternalItem, LocalRecord, ProjectedRecord, ResourceKind, Scope};
use crate::store::LocalStore;
use crate::tags::TagIndex;
use serde_json::Value;
use std::collections::BTreeSet;

/// State shared by the hooks of a single describe pass
///
/// Nothing in the context outlives the call that created it.
pub struct PassContext<'a> {
    scope: &'a Scope,
    kind: &'a ResourceKind,
    store: &'a dyn LocalStore,
    requested_ids: &'a BTreeSet<String>,
    tag_index: Option<TagIndex>,
}

impl<'a> PassContext<'a> {
    pub fn new(
        scope: &'a Scope,
        kind: &'a ResourceKind,
        store: &'a dyn LocalStore,
        requested_ids: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            scope,
            kind,
            store,
            requested_ids,
            tag_index: None,
        }
    }

    pub fn scope(&self) -> &'a Scope {
        self.scope
    }

    pub fn kind(&self) -> &'a ResourceKind {
        self.kind
    }

    pub fn store(&self) -> &'a dyn LocalStore {
        self.store
    }

    /// Ids requested by the caller; empty when the pass covers the whole kind
    pub fn requested_ids(&self) -> &'a BTreeSet<String> {
        self.requested_ids
    }

    /// Tags of the requested records, loaded on first use
    pub fn tag_index(&mut self) -> Result<&TagIndex> {
        let index = match self.tag_index.take() {
            Some(index) => index,
            None => TagIndex::load(
                self.store,
                self.scope,
                std::slice::from_ref(self.kind),
                self.requested_ids,
            )?,
        };
        Ok(&*self.tag_index.insert(index))
    }
}

/// Resource-specific behaviour injected into a describer
pub trait ResourceStrategy {
    /// Kind handled by this strategy
    fn kind(&self) -> &ResourceKind;

    /// Filter entries added on top of the kind's registered schema
    fn schema_extensions(&self) -> FilterSchema {
        FilterSchema::new()
    }

    /// Load the shadow records the pass starts from
    fn fetch_local(&self, pass: &PassContext<'_>) -> Result<Vec<LocalRecord>> {
        pass.store()
            .fetch(pass.scope(), pass.kind(), pass.requested_ids())
    }

    /// Fetch the provider's items for the pass
    fn fetch_external(&self, scope: &Scope) -> Result<Vec<ExternalItem>> {
        let _ = scope;
        Ok(Vec::new())
    }

    /// Build the client-facing record; `None` suppresses the resource
    fn project(
        &self,
        local: Option<&LocalRecord>,
        external: Option<&ExternalItem>,
    ) -> Option<ProjectedRecord>;

    /// Augment a projection after it was built
    fn post_process(
        &self,
        pass: &mut PassContext<'_>,
        projected: &mut ProjectedRecord,
        local: Option<&LocalRecord>,
    ) -> Result<()> {
        let _ = (pass, projected, local);
        Ok(())
    }

    /// Remove a shadow record nothing paired with during the pass
    fn delete_obsolete(&self, pass: &PassContext<'_>, record: &LocalRecord) -> Result<()> {
        pass.store().delete(pass.scope(), &record.id)
    }

    /// Rewrite the request's filters before they are evaluated
    fn prepare_filters(&self, filters: Vec<Filter>) -> Vec<Filter> {
        filters
    }

    /// Whether `candidate` satisfies `filter_value`
    fn value_matches(&self, filter_value: &FilterValue, candidate: &Value) -> bool {
        pattern_matches(filter_value, candidate)
    }
}
