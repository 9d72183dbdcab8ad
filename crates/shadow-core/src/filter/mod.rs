//! Filter predicate language
//!
//! A request carries a list of [`Filter`]s. Each filter names an entry of the
//! active kind's [`FilterSchema`] and lists values that are OR-matched with
//! shell-style wildcards against the projected record.

mod matcher;
mod schema;
mod wildcard;

pub use matcher::{candidate_text, filtered_out, is_truthy, pattern_matches};
pub use schema::{FilterPath, FilterSchema};
pub use wildcard::{Wildcard, wildcard_match};

use serde::{Deserialize, Serialize};

/// A single named filter from a describe request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    #[serde(rename = "value", alias = "values", default)]
    pub values: Vec<FilterValue>,
}

impl Filter {
    /// Create a filter whose values are plain wildcard patterns
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|v| FilterValue::Pattern(v.into()))
                .collect(),
        }
    }
}

/// One value of a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Wildcard pattern compared against a scalar attribute
    Pattern(String),
    /// Structured predicate over a `{key, value}` collection
    Tag(TagPredicate),
}

/// Matches a `{key, value}` pair whose key is equal and whose value
/// wildcard-matches any of `values`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPredicate {
    pub key: String,
    #[serde(rename = "value", alias = "values", default)]
    pub values: Vec<String>,
}
