//! Tag support for any describer

use crate::Result;
use crate::filter::{
    Filter, FilterPath, FilterSchema, FilterValue, TagPredicate, candidate_text, wildcard_match,
};
use crate::record::{ExternalItem, LocalRecord, ProjectedRecord, ResourceKind, Scope, TAG_SET_FIELD};
use crate::strategy::{PassContext, ResourceStrategy};
use serde_json::Value;

/// Prefix of request filters that select on one tag key
const TAG_FILTER_PREFIX: &str = "tag:";

/// Strategy decorator that exposes a record's tags
///
/// Wrapping a strategy adds the `tag-key`, `tag-value` and `tag` filters,
/// rewrites `tag:<key>` request filters into structured tag predicates and
/// attaches a `tagSet` to every projection backed by a shadow record that
/// has tags. All other capabilities are forwarded to the wrapped strategy.
///
/// ```ignore
/// let describer = Reconciler::new(&registry, &store, Tagged::new(VolumeStrategy))?;
/// ```
pub struct Tagged<S> {
    inner: S,
}

impl<S> Tagged<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

/// Rewrite `tag:<key>` filters into a `tag` filter with one predicate
///
/// Everything after the prefix is the key, colons included.
fn rewrite_tag_filter(filter: Filter) -> Filter {
    let Some(key) = filter.name.strip_prefix(TAG_FILTER_PREFIX) else {
        return filter;
    };
    let values = filter
        .values
        .iter()
        .filter_map(|value| match value {
            FilterValue::Pattern(pattern) => Some(pattern.clone()),
            FilterValue::Tag(_) => None,
        })
        .collect();
    Filter {
        name: "tag".to_string(),
        values: vec![FilterValue::Tag(TagPredicate {
            key: key.to_string(),
            values,
        })],
    }
}

/// Whether any `{key, value}` pair in `candidate` satisfies `predicate`
fn tag_predicate_matches(predicate: &TagPredicate, candidate: &Value) -> bool {
    let Some(pairs) = candidate.as_array() else {
        return false;
    };
    pairs
        .iter()
        .filter(|pair| pair.get("key").and_then(Value::as_str) == Some(predicate.key.as_str()))
        .filter_map(|pair| pair.get("value").and_then(candidate_text))
        .any(|value| {
            predicate
                .values
                .iter()
                .any(|pattern| wildcard_match(pattern, &value))
        })
}

impl<S: ResourceStrategy> ResourceStrategy for Tagged<S> {
    fn kind(&self) -> &ResourceKind {
        self.inner.kind()
    }

    fn schema_extensions(&self) -> FilterSchema {
        let mut schema = self.inner.schema_extensions();
        schema.insert("tag-key", FilterPath::element(TAG_SET_FIELD, "key"));
        schema.insert("tag-value", FilterPath::element(TAG_SET_FIELD, "value"));
        schema.insert("tag", FilterPath::attribute(TAG_SET_FIELD));
        schema
    }

    fn fetch_local(&self, pass: &PassContext<'_>) -> Result<Vec<LocalRecord>> {
        self.inner.fetch_local(pass)
    }

    fn fetch_external(&self, scope: &Scope) -> Result<Vec<ExternalItem>> {
        self.inner.fetch_external(scope)
    }

    fn project(
        &self,
        local: Option<&LocalRecord>,
        external: Option<&ExternalItem>,
    ) -> Option<ProjectedRecord> {
        self.inner.project(local, external)
    }

    fn post_process(
        &self,
        pass: &mut PassContext<'_>,
        projected: &mut ProjectedRecord,
        local: Option<&LocalRecord>,
    ) -> Result<()> {
        self.inner.post_process(pass, projected, local)?;

        let Some(record) = local else {
            return Ok(());
        };
        if let Some(tag_set) = pass.tag_index()?.tag_set(&record.id) {
            projected.insert(TAG_SET_FIELD, tag_set);
        }
        Ok(())
    }

    fn delete_obsolete(&self, pass: &PassContext<'_>, record: &LocalRecord) -> Result<()> {
        self.inner.delete_obsolete(pass, record)
    }

    fn prepare_filters(&self, filters: Vec<Filter>) -> Vec<Filter> {
        self.inner
            .prepare_filters(filters)
            .into_iter()
            .map(rewrite_tag_filter)
            .collect()
    }

    fn value_matches(&self, filter_value: &FilterValue, candidate: &Value) -> bool {
        match filter_value {
            FilterValue::Tag(predicate) => tag_predicate_matches(predicate, candidate),
            FilterValue::Pattern(_) => self.inner.value_matches(filter_value, candidate),
        }
    }
}
