//! Declarative per-kind filter schemas

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a filter reads its candidate values from in a projected record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PathRepr", into = "PathRepr")]
pub enum FilterPath {
    /// A top-level field of the record
    Attribute(String),
    /// `element` of every item in the `collection` field
    Element { collection: String, element: String },
}

impl FilterPath {
    pub fn attribute(path: impl Into<String>) -> Self {
        Self::Attribute(path.into())
    }

    pub fn element(collection: impl Into<String>, element: impl Into<String>) -> Self {
        Self::Element {
            collection: collection.into(),
            element: element.into(),
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            Self::Attribute(path) => !path.trim().is_empty(),
            Self::Element {
                collection,
                element,
            } => !collection.trim().is_empty() && !element.trim().is_empty(),
        }
    }
}

/// On-disk form: `"path"` or `["collection", "element"]`
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PathRepr {
    Simple(String),
    Compound(Vec<String>),
}

impl TryFrom<PathRepr> for FilterPath {
    type Error = String;

    fn try_from(repr: PathRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            PathRepr::Simple(path) => Ok(Self::Attribute(path)),
            PathRepr::Compound(parts) => match <[String; 2]>::try_from(parts) {
                Ok([collection, element]) => Ok(Self::Element {
                    collection,
                    element,
                }),
                Err(parts) => Err(format!(
                    "compound filter path needs exactly 2 segments, got {}",
                    parts.len()
                )),
            },
        }
    }
}

impl From<FilterPath> for PathRepr {
    fn from(path: FilterPath) -> Self {
        match path {
            FilterPath::Attribute(path) => Self::Simple(path),
            FilterPath::Element {
                collection,
                element,
            } => Self::Compound(vec![collection, element]),
        }
    }
}

/// Table resolving filter names to record paths for one kind
///
/// # Example
///
/// ```
/// use shadow_core::filter::{FilterPath, FilterSchema};
///
/// let schema = FilterSchema::new()
///     .attribute("vpc-id", "vpcId")
///     .element("cidr", "cidrBlockAssociationSet", "cidrBlock");
///
/// assert_eq!(schema.resolve("vpc-id"), Some(&FilterPath::attribute("vpcId")));
/// assert!(schema.resolve("owner-id").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSchema {
    entries: BTreeMap<String, FilterPath>,
}

impl FilterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a simple attribute entry
    pub fn attribute(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.insert(name, FilterPath::attribute(path));
        self
    }

    /// Add a collection-element entry
    pub fn element(
        mut self,
        name: impl Into<String>,
        collection: impl Into<String>,
        element: impl Into<String>,
    ) -> Self {
        self.insert(name, FilterPath::element(collection, element));
        self
    }

    /// Insert or replace an entry, returning the previous path
    pub fn insert(&mut self, name: impl Into<String>, path: FilterPath) -> Option<FilterPath> {
        self.entries.insert(name.into(), path)
    }

    /// Overlay `other` on top of this schema
    pub fn extend(&mut self, other: FilterSchema) {
        self.entries.extend(other.entries);
    }

    pub fn resolve(&self, name: &str) -> Option<&FilterPath> {
        self.entries.get(name)
    }

    /// Filter names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every entry once, before the schema serves any request
    ///
    /// Names must be non-empty, free of whitespace, and must not use the
    /// `tag:` prefix, which request preprocessing reserves for tag filters.
    pub fn validate(&self, kind: &str) -> Result<()> {
        for (name, path) in &self.entries {
            let invalid = |message: String| Error::InvalidSchema {
                kind: kind.to_string(),
                message,
            };
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(invalid(format!("invalid filter name '{}'", name)));
            }
            if name.starts_with("tag:") {
                return Err(invalid(format!(
                    "filter name '{}' uses the reserved 'tag:' prefix",
                    name
                )));
            }
            if !path.is_valid() {
                return Err(invalid(format!("filter '{}' has an empty path", name)));
            }
        }
        Ok(())
    }
}
