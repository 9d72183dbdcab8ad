//! Describe passes
//!
//! - [`Reconciler`]: pairs provider items with shadow records, creating and
//!   deleting records as needed
//! - [`LocalOnlyDescriber`]: projects shadow records of kinds that have no
//!   provider counterpart
//! - [`Tagged`]: strategy decorator adding tag filters and `tagSet` output to
//!   either describer

mod local_only;
mod reconciler;
mod tagged;

pub use local_only::LocalOnlyDescriber;
pub use reconciler::Reconciler;
pub use tagged::Tagged;

use crate::Result;
use crate::filter::{Filter, filtered_out};
use crate::record::{ProjectedRecord, ResourceKind, Scope};
use crate::registry::{KindRegistry, KindSpec};
use crate::strategy::ResourceStrategy;
use serde::{Deserialize, Serialize};

/// A describe call's selection and filters
///
/// `ids` and `names` set to `None` describe the whole kind; `Some` makes the
/// call selective, even when the list is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
}

impl DescribeRequest {
    /// Describe every resource of the kind
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_ids<I, V>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_names<I, V>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Whether the call names explicit ids or names
    pub fn is_selective(&self) -> bool {
        self.ids.is_some() || self.names.is_some()
    }
}

/// Anything that can answer a describe call for one kind
pub trait Describe {
    fn kind(&self) -> &ResourceKind;

    /// Run a full pass and return the filtered projections in order
    fn describe(&self, scope: &Scope, request: DescribeRequest) -> Result<Vec<ProjectedRecord>>;
}

/// Registered spec of the strategy's kind, with the strategy's filter
/// extensions merged in and validated.
fn resolve_spec<S: ResourceStrategy>(registry: &KindRegistry, strategy: &S) -> Result<KindSpec> {
    let mut spec = registry.spec(strategy.kind())?.clone();
    spec.filters.extend(strategy.schema_extensions());
    spec.filters.validate(spec.kind.as_str())?;
    Ok(spec)
}

fn is_filtered_out<S: ResourceStrategy>(
    spec: &KindSpec,
    strategy: &S,
    record: &ProjectedRecord,
    filters: Option<&[Filter]>,
) -> Result<bool> {
    filtered_out(&spec.filters, record, filters, |value, candidate| {
        strategy.value_matches(value, candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_is_still_selective() {
        assert!(!DescribeRequest::all().is_selective());
        assert!(DescribeRequest::all().with_ids(Vec::<String>::new()).is_selective());
        assert!(DescribeRequest::all().with_names(["web"]).is_selective());
    }
}
