//! Kind manifests overlaid on the built-in kinds

use pretty_assertions::assert_eq;
use serde_json::json;
use shadow_core::{
    Describe, DescribeRequest, Error, Filter, KindRegistry, KindsManifest, Reconciler, Scope,
};
use shadow_test_utils::{MemoryStore, ScriptedStrategy};

#[test]
fn test_overlay_adds_a_new_kind() {
    let overlay = KindsManifest::parse(
        r#"
[kinds.bucket]
not_found = "NoSuchBucket"

[kinds.bucket.filters]
name = "bucketName"
"#,
    )
    .unwrap();
    let registry = KindRegistry::with_overlay(&overlay).unwrap();
    let store = MemoryStore::new();
    let strategy = ScriptedStrategy::new("bucket")
        .item("os-b-1", json!({"bucketName": "logs"}))
        .item("os-b-2", json!({"bucketName": "assets"}));

    let records = Reconciler::new(&registry, &store, strategy)
        .unwrap()
        .describe(
            &Scope::new("p"),
            DescribeRequest::all().with_filters(vec![Filter::new("name", ["lo*"])]),
        )
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(store.created().len(), 2);
}

#[test]
fn test_overlay_can_protect_a_builtin_kind() {
    let overlay = KindsManifest::parse(
        r#"
[kinds.vol]
auto_create = false
"#,
    )
    .unwrap();
    let registry = KindRegistry::with_overlay(&overlay).unwrap();
    let store = MemoryStore::new();
    let strategy = ScriptedStrategy::new("vol").item("os-vol-1", json!({"status": "available"}));

    let records = Reconciler::new(&registry, &store, strategy)
        .unwrap()
        .describe(
            &Scope::new("p"),
            DescribeRequest::all().with_filters(vec![Filter::new("status", ["available"])]),
        )
        .unwrap();

    assert_eq!(records.len(), 1, "builtin filters survive the overlay");
    assert!(store.created().is_empty());
}

#[test]
fn test_kind_without_not_found_code_is_rejected() {
    let overlay = KindsManifest::parse(
        r#"
[kinds.queue.filters]
name = "queueName"
"#,
    )
    .unwrap();

    let err = KindRegistry::with_overlay(&overlay).unwrap_err();

    assert!(matches!(err, Error::InvalidSchema { ref kind, .. } if kind == "queue"));
}

#[test]
fn test_reserved_tag_prefix_is_rejected() {
    let overlay = KindsManifest::parse(
        r#"
[kinds.queue]
not_found = "NoSuchQueue"

[kinds.queue.filters]
"tag:Name" = "name"
"#,
    )
    .unwrap();

    assert!(KindRegistry::with_overlay(&overlay).is_err());
}
