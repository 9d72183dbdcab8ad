//! Describer for kinds that exist only in the local store

use super::{Describe, DescribeRequest, is_filtered_out, resolve_spec};
use crate::Result;
use crate::record::{ProjectedRecord, ResourceKind, Scope};
use crate::registry::{KindRegistry, KindSpec};
use crate::store::LocalStore;
use crate::strategy::{PassContext, ResourceStrategy};
use std::collections::BTreeSet;

/// Projects shadow records without consulting a provider
///
/// Names in the request are ignored, and the pass never creates, deletes or
/// reports unresolved ids: it returns whatever the store holds for the
/// requested ids.
pub struct LocalOnlyDescriber<'a, S> {
    store: &'a dyn LocalStore,
    spec: KindSpec,
    strategy: S,
}

impl<'a, S: ResourceStrategy> LocalOnlyDescriber<'a, S> {
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
}

impl<S: ResourceStrategy> Describe for LocalOnlyDescriber<'_, S> {
    fn kind(&self) -> &ResourceKind {
        &self.spec.kind
    }

    fn describe(&self, scope: &Scope, request: DescribeRequest) -> Result<Vec<ProjectedRecord>> {
        let requested_ids: BTreeSet<String> = request.ids.into_iter().flatten().collect();
        let filters = request.filters.map(|f| self.strategy.prepare_filters(f));

        let mut pass = PassContext::new(scope, &self.spec.kind, self.store, &requested_ids);
        let records = self.strategy.fetch_local(&pass)?;

        let mut results = Vec::new();
        for record in &records {
            let Some(mut projected) = self.strategy.project(Some(record), None) else {
                continue;
            };
            self.strategy
                .post_process(&mut pass, &mut projected, Some(record))?;
            if !is_filtered_out(&self.spec, &self.strategy, &projected, filters.as_deref())? {
                results.push(projected);
            }
        }

        tracing::debug!(
            kind = %self.spec.kind,
            local = records.len(),
            returned = results.len(),
            "Local describe finished"
        );
        Ok(results)
    }
}
