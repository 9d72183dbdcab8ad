//! Reconciliation of provider items with shadow records

use super::{Describe, DescribeRequest, is_filtered_out, resolve_spec};
use crate::Result;
use crate::record::{LocalRecord, ProjectedRecord, ResourceKind, Scope};
use crate::registry::{KindRegistry, KindSpec};
use crate::store::LocalStore;
use crate::strategy::{PassContext, ResourceStrategy};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Describer for kinds backed by an external provider
///
/// A pass pairs every provider item with the shadow record that carries its
/// external id, creates records for unpaired items when the kind allows it,
/// and deletes the shadow records no item paired with.
///
/// The pass takes no lock. Two passes over the same kind and scope may both
/// create a record for one item, or one may delete a record the other is
/// still pairing; callers that care must serialise them.
pub struct Reconciler<'a, S> {
    store: &'a dyn LocalStore,
    spec: KindSpec,
    strategy: S,
}

impl<'a, S: ResourceStrategy> Reconciler<'a, S> {
    /// Create a reconciler for the strategy's kind
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is not registered or the strategy's
    /// filter extensions do not validate.
    pub fn new(registry: &KindRegistry, store: &'a dyn LocalStore, strategy: S) -> Result<Self> {
        let spec = resolve_spec(registry, &strategy)?;
        Ok(Self {
            store,
            spec,
            strategy,
        })
    }

    pub fn spec(&self) -> &KindSpec {
        &self.spec
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

impl<S: ResourceStrategy> Describe for Reconciler<'_, S> {
    fn kind(&self) -> &ResourceKind {
        &self.spec.kind
    }

    /// Run one reconciliation pass
    ///
    /// Shadow records are created while items are paired and obsolete ones
    /// are deleted before unresolved ids or names are reported, so both side
    /// effects persist when the call fails with a not-found error.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameterValue`](crate::Error::InvalidParameterValue)
    ///   for a filter name the kind does not declare
    /// - [`Error::NotFound`](crate::Error::NotFound) for a requested id or
    ///   name no item resolved
    /// - store and provider errors, unchanged
    fn describe(&self, scope: &Scope, request: DescribeRequest) -> Result<Vec<ProjectedRecord>> {
        let selective = request.is_selective();
        let DescribeRequest {
            ids,
            names,
            filters,
        } = request;

        let requested_ids: BTreeSet<String> = ids.into_iter().flatten().collect();
        let mut remaining_ids = requested_ids.clone();
        let mut remaining_names: BTreeSet<String> = names.into_iter().flatten().collect();
        let filters = filters.map(|f| self.strategy.prepare_filters(f));

        let kind = &self.spec.kind;
        let mut pass = PassContext::new(scope, kind, self.store, &requested_ids);

        let local_records = self.strategy.fetch_local(&pass)?;
        let external_items = self.strategy.fetch_external(scope)?;

        let by_external_id: HashMap<&str, &LocalRecord> = local_records
            .iter()
            .filter_map(|record| record.external_id.as_deref().map(|id| (id, record)))
            .collect();

        let mut paired: HashSet<String> = HashSet::new();
        let mut results = Vec::new();

        for item in &external_items {
            let name = item.name();
            let existing = by_external_id.get(item.id()).copied();

            let requested = name.is_some_and(|n| remaining_names.contains(n))
                || existing.is_some_and(|record| remaining_ids.contains(&record.id));
            if selective && !requested {
                tracing::debug!(%kind, external_id = item.id(), "Skipping unrequested item");
                continue;
            }

            let created;
            let local = match existing {
                Some(record) => Some(record),
                None if self.spec.auto_create => {
                    created = self.store.create(scope, kind, item.id())?;
                    tracing::info!(%kind, id = %created.id, external_id = item.id(), "Created shadow record");
                    Some(&created)
                }
                None => None,
            };

            if let Some(record) = local {
                paired.insert(record.id.clone());
            }

            let mut projected = self.strategy.project(local, Some(item));
            if let Some(projected) = projected.as_mut() {
                self.strategy.post_process(&mut pass, projected, local)?;
            }

            if let Some(name) = name {
                remaining_names.remove(name);
            }
            if let Some(record) = local {
                remaining_ids.remove(&record.id);
            }

            if let Some(projected) = projected
                && !is_filtered_out(&self.spec, &self.strategy, &projected, filters.as_deref())?
            {
                results.push(projected);
            }
        }

        let mut deleted = 0usize;
        for record in &local_records {
            // Marking the id as handled keeps a duplicated record from being
            // deleted twice.
            if paired.insert(record.id.clone()) {
                self.strategy.delete_obsolete(&pass, record)?;
                tracing::info!(%kind, id = %record.id, "Deleted obsolete shadow record");
                deleted += 1;
            }
        }

        tracing::debug!(
            %kind,
            local = local_records.len(),
            external = external_items.len(),
            returned = results.len(),
            deleted,
            "Reconciliation pass finished"
        );

        if let Some(unresolved) = remaining_ids.iter().next().or(remaining_names.iter().next()) {
            return Err(self.spec.not_found(unresolved.clone()));
        }

        Ok(results)
    }
}
