//! Configuration for resource kinds
//!
//! Kinds are declared in TOML manifests: each entry names the kind's
//! not-found error code, whether shadow records may be created for it
//! automatically, and its filter schema. Manifests can be layered with
//! [`KindsManifest::merge`] and are turned into a validated
//! [`KindRegistry`](crate::KindRegistry) at startup.

mod manifest;

pub use manifest::{BUILTIN_KINDS, KindSection, KindsManifest};
