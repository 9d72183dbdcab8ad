//! Manifest parsing for kind declarations

use crate::Result;
use crate::filter::FilterSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind declarations shipped with the crate
pub const BUILTIN_KINDS: &str = include_str!("builtin_kinds.toml");

/// Declaration of a single resource kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindSection {
    /// Error code raised when a requested id of this kind is not found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_found: Option<String>,

    /// Whether missing shadow records are created during a describe pass
    ///
    /// Unset means `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_create: Option<bool>,

    /// Filter name to record path table
    #[serde(default)]
    pub filters: FilterSchema,
}

impl KindSection {
    fn merge(&mut self, other: &KindSection) {
        if other.not_found.is_some() {
            self.not_found = other.not_found.clone();
        }
        if other.auto_create.is_some() {
            self.auto_create = other.auto_create;
        }
        self.filters.extend(other.filters.clone());
    }
}

/// A parsed kinds manifest
///
/// ```
/// use shadow_core::config::KindsManifest;
///
/// let manifest = KindsManifest::parse(r#"
/// [kinds.vol]
/// not_found = "InvalidVolume.NotFound"
///
/// [kinds.vol.filters]
/// status = "status"
/// "attachment.instance-id" = ["attachmentSet", "instanceId"]
/// "#).unwrap();
///
/// assert_eq!(manifest.kinds["vol"].filters.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindsManifest {
    #[serde(default)]
    pub kinds: BTreeMap<String, KindSection>,
}

impl KindsManifest {
    /// Parse a manifest from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: KindsManifest = toml::from_str(content)?;
        Ok(manifest)
    }

    /// The manifest of built-in kinds
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_KINDS)
    }

    /// Overlay `other` on top of this manifest
    ///
    /// Scalars set in `other` win; filter tables are merged entry by entry,
    /// so an overlay can add or redirect filters without restating the rest.
    pub fn merge(&mut self, other: &KindsManifest) {
        for (kind, section) in &other.kinds {
            match self.kinds.get_mut(kind) {
                Some(base) => base.merge(section),
                None => {
                    self.kinds.insert(kind.clone(), section.clone());
                }
            }
        }
    }
}
