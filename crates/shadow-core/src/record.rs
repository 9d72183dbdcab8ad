//! Record types flowing through a describe pass
//!
//! - [`LocalRecord`]: persisted shadow entry owned by the local store
//! - [`ExternalItem`]: provider object fetched fresh for every pass
//! - [`TagRecord`]: auxiliary key/value pair attached to a local record
//! - [`ProjectedRecord`]: client-facing output of the projection hook

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Output field that carries the tag set of a projected record.
pub const TAG_SET_FIELD: &str = "tagSet";

/// Resource kind tag (e.g. `vpc`, `subnet`, `i`)
///
/// The kind selects the filter schema, the auto-create policy and the
/// not-found error code that apply to a describe pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKind(String);

impl ResourceKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKind {
    fn from(kind: &str) -> Self {
        Self(kind.to_string())
    }
}

impl From<String> for ResourceKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

/// The caller's project; every store operation is confined to it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    project_id: String,
}

impl Scope {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

/// A persisted shadow record
///
/// The core only reads, creates and deletes local records; it never
/// modifies one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
    /// Stable internal identity (e.g. "vpc-1a2b3c4d")
    pub id: String,
    /// Project that owns the record
    pub project_id: String,
    /// Resource kind of the record
    pub kind: ResourceKind,
    /// Identity of the provider item this record shadows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Kind-specific metadata kept alongside the record
    #[serde(default = "empty_object")]
    pub attributes: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl LocalRecord {
    /// Create a record with no attributes
    pub fn new(
        id: impl Into<String>,
        scope: &Scope,
        kind: ResourceKind,
        external_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: scope.project_id().to_string(),
            kind,
            external_id,
            attributes: empty_object(),
        }
    }

    /// Replace the attributes of the record
    pub fn with_attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }
}

/// A provider item fetched for the current pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalItem {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default = "empty_object")]
    attributes: Value,
}

impl ExternalItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            attributes: empty_object(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }

    /// External identity used to pair the item with a local record
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, matched against explicitly requested names
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Provider-native attributes
    pub fn attributes(&self) -> &Value {
        &self.attributes
    }

    /// Look up a single provider attribute
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// A key/value tag owned by a local record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub project_id: String,
    /// Id of the owning local record
    pub item_id: String,
    pub key: String,
    pub value: String,
}

impl TagRecord {
    pub fn new(
        scope: &Scope,
        item_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            project_id: scope.project_id().to_string(),
            item_id: item_id.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Client-facing projection of a resource, keyed by output field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectedRecord(Map<String, Value>);

impl ProjectedRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a projection from a JSON value; only objects qualify.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// The attached tag set, if any
    pub fn tag_set(&self) -> Option<&Vec<Value>> {
        self.0.get(TAG_SET_FIELD).and_then(Value::as_array)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for ProjectedRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
