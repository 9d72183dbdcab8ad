//! Scripted resource strategy

use serde_json::{Value, json};
use shadow_core::{
    Error, ExternalItem, FilterSchema, LocalRecord, ProjectedRecord, ResourceKind,
    ResourceStrategy, Result, Scope,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A strategy serving a fixed list of provider items.
///
/// The default projection copies the item's attributes and adds:
///
/// - `id`: the shadow record id, when there is one
/// - `externalId`: the provider id, when there is an item
/// - `name`: the item name, when it has one
///
/// A projection without an item uses the record's attributes instead.
/// Items listed with [`ScriptedStrategy::suppress`] project to nothing.
#[derive(Debug)]
pub struct ScriptedStrategy {
    kind: ResourceKind,
    items: Vec<ExternalItem>,
    suppressed: BTreeSet<String>,
    extensions: FilterSchema,
    provider_failure: Option<String>,
    post_processed: AtomicUsize,
}

impl ScriptedStrategy {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.into(),
            items: Vec::new(),
            suppressed: BTreeSet::new(),
            extensions: FilterSchema::new(),
            provider_failure: None,
            post_processed: AtomicUsize::new(0),
        }
    }

    /// Add a provider item with attributes.
    pub fn item(mut self, id: &str, attributes: Value) -> Self {
        self.items
            .push(ExternalItem::new(id).with_attributes(attributes));
        self
    }

    /// Add a named provider item with attributes.
    pub fn named_item(mut self, id: &str, name: &str, attributes: Value) -> Self {
        self.items.push(
            ExternalItem::new(id)
                .with_name(name)
                .with_attributes(attributes),
        );
        self
    }

    /// Make the projection of the item `external_id` return nothing.
    pub fn suppress(mut self, external_id: &str) -> Self {
        self.suppressed.insert(external_id.to_string());
        self
    }

    pub fn with_extensions(mut self, extensions: FilterSchema) -> Self {
        self.extensions = extensions;
        self
    }

    /// Make `fetch_external` fail with a provider error.
    pub fn failing(mut self, message: &str) -> Self {
        self.provider_failure = Some(message.to_string());
        self
    }

    /// Number of projections handed to `post_process`.
    pub fn post_processed(&self) -> usize {
        self.post_processed.load(Ordering::SeqCst)
    }
}

impl ResourceStrategy for ScriptedStrategy {
    fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    fn schema_extensions(&self) -> FilterSchema {
        self.extensions.clone()
    }

    fn fetch_external(&self, _scope: &Scope) -> Result<Vec<ExternalItem>> {
        match &self.provider_failure {
            Some(message) => Err(Error::Provider {
                kind: self.kind.clone(),
                message: message.clone(),
            }),
            None => Ok(self.items.clone()),
        }
    }

    fn project(
        &self,
        local: Option<&LocalRecord>,
        external: Option<&ExternalItem>,
    ) -> Option<ProjectedRecord> {
        if external.is_some_and(|item| self.suppressed.contains(item.id())) {
            return None;
        }

        let base = match (external, local) {
            (Some(item), _) => item.attributes().clone(),
            (None, Some(record)) => record.attributes.clone(),
            (None, None) => json!({}),
        };
        let mut projected = ProjectedRecord::from_value(base).unwrap_or_default();
        if let Some(record) = local {
            projected.insert("id", json!(record.id));
        }
        if let Some(item) = external {
            projected.insert("externalId", json!(item.id()));
            if let Some(name) = item.name() {
                projected.insert("name", json!(name));
            }
        }
        Some(projected)
    }

    fn post_process(
        &self,
        _pass: &mut shadow_core::PassContext<'_>,
        _projected: &mut ProjectedRecord,
        _local: Option<&LocalRecord>,
    ) -> Result<()> {
        self.post_processed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
