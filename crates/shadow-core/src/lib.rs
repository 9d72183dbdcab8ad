//! Shadow record reconciliation and filtered projection
//!
//! This crate keeps a project-scoped store of shadow records in step with the
//! items an external provider reports, and answers describe calls over them:
//!
//! - **Reconciliation**: pair provider items with shadow records, create
//!   missing records for auto-creatable kinds and delete obsolete ones
//! - **Projection**: turn each pairing into a client-facing record through a
//!   per-kind [`ResourceStrategy`]
//! - **Filtering**: evaluate named filters with wildcard patterns against a
//!   declarative per-kind [`FilterSchema`]
//! - **Tags**: expose stored tags as `tagSet` and as `tag:<key>` filters
//! - **Ledger**: a TOML file store implementing [`LocalStore`]
//!
//! # Architecture
//!
//! ```text
//!          Describe (Reconciler / LocalOnlyDescriber)
//!                  |                  |
//!        ResourceStrategy        KindRegistry
//!         (Tagged<S>)          (KindsManifest)
//!                  |
//!             LocalStore
//!           (LedgerStore)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use shadow_core::{Describe, DescribeRequest, KindRegistry, LedgerStore, Reconciler, Scope};
//!
//! let registry = KindRegistry::with_builtins()?;
//! let store = LedgerStore::new("state/ledger.toml");
//! let volumes = Reconciler::new(&registry, &store, VolumeStrategy::new(client))?;
//! let records = volumes.describe(&Scope::new("project-a"), DescribeRequest::all())?;
//! ```

pub mod config;
pub mod describe;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod record;
pub mod registry;
pub mod store;
pub mod strategy;
pub mod tags;

pub use config::{KindSection, KindsManifest};
pub use describe::{Describe, DescribeRequest, LocalOnlyDescriber, Reconciler, Tagged};
pub use error::{Error, Result};
pub use filter::{Filter, FilterPath, FilterSchema, FilterValue, TagPredicate};
pub use ledger::{Ledger, LedgerStore};
pub use record::{ExternalItem, LocalRecord, ProjectedRecord, ResourceKind, Scope, TagRecord};
pub use registry::{KindRegistry, KindSpec};
pub use store::LocalStore;
pub use strategy::{PassContext, ResourceStrategy};
pub use tags::TagIndex;
