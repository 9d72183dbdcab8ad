//! Registry of resource kinds
//!
//! The registry is built once at initialisation from a [`KindsManifest`] and
//! answers the per-kind questions a describe pass asks: which filter schema
//! applies, whether missing shadow records may be created, and which error
//! reports an unresolved id.

use crate::config::KindsManifest;
use crate::filter::FilterSchema;
use crate::record::ResourceKind;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Validated settings for one resource kind
#[derive(Debug, Clone, PartialEq)]
pub struct KindSpec {
    pub kind: ResourceKind,
    /// Error code for unresolved ids and names
    pub not_found_code: String,
    /// Whether unpaired external items get a shadow record
    pub auto_create: bool,
    pub filters: FilterSchema,
}

impl KindSpec {
    /// Build the not-found error for `id`
    pub fn not_found(&self, id: impl Into<String>) -> Error {
        Error::NotFound {
            kind: self.kind.clone(),
            code: self.not_found_code.clone(),
            id: id.into(),
        }
    }
}

/// Registry mapping resource kinds to their [`KindSpec`]
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: BTreeMap<ResourceKind, KindSpec>,
}

impl KindRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in kinds registered
    pub fn with_builtins() -> Result<Self> {
        Self::from_manifest(&KindsManifest::builtin()?)
    }

    /// Create a registry from the built-in kinds overlaid with `overlay`
    pub fn with_overlay(overlay: &KindsManifest) -> Result<Self> {
        let mut manifest = KindsManifest::builtin()?;
        manifest.merge(overlay);
        Self::from_manifest(&manifest)
    }

    /// Validate and register every kind declared in `manifest`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] for a kind without a not-found code
    /// or with an invalid filter schema.
    pub fn from_manifest(manifest: &KindsManifest) -> Result<Self> {
        let mut registry = Self::new();
        for (kind, section) in &manifest.kinds {
            let not_found_code = section.not_found.clone().ok_or_else(|| Error::InvalidSchema {
                kind: kind.clone(),
                message: "missing not_found error code".to_string(),
            })?;
            registry.register(KindSpec {
                kind: ResourceKind::new(kind.clone()),
                not_found_code,
                auto_create: section.auto_create.unwrap_or(true),
                filters: section.filters.clone(),
            })?;
        }
        tracing::debug!(kinds = registry.len(), "Kind registry initialised");
        Ok(registry)
    }

    /// Register a kind, replacing any previous entry
    pub fn register(&mut self, spec: KindSpec) -> Result<()> {
        if spec.kind.as_str().is_empty() {
            return Err(Error::InvalidSchema {
                kind: String::new(),
                message: "empty kind name".to_string(),
            });
        }
        spec.filters.validate(spec.kind.as_str())?;
        self.kinds.insert(spec.kind.clone(), spec);
        Ok(())
    }

    /// Look up a kind
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKind`] if the kind was never registered.
    pub fn spec(&self, kind: &ResourceKind) -> Result<&KindSpec> {
        self.kinds.get(kind).ok_or_else(|| Error::UnknownKind { kind: kind.clone() })
    }

    /// Build the not-found error of `kind` for `id`
    pub fn not_found(&self, kind: &ResourceKind, id: impl Into<String>) -> Result<Error> {
        Ok(self.spec(kind)?.not_found(id))
    }

    /// Whether shadow records of `kind` may be created implicitly
    pub fn is_auto_creatable(&self, kind: &ResourceKind) -> bool {
        self.kinds.get(kind).is_some_and(|spec| spec.auto_create)
    }

    /// Registered kinds in sorted order
    pub fn kinds(&self) -> impl Iterator<Item = &ResourceKind> {
        self.kinds.keys()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
