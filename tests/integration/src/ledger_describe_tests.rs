//! End-to-end describe passes over the file-backed ledger
//!
//! These tests exercise the complete flow: registry loading -> describe pass
//! -> shadow records persisted in the ledger -> later passes reading them back.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use shadow_core::{
    Describe, DescribeRequest, Filter, KindRegistry, LedgerStore, LocalOnlyDescriber, LocalStore,
    ProjectedRecord, Reconciler, Scope, Tagged,
};
use shadow_test_utils::{ScriptedStrategy, TempLedger, init_tracing};
use std::collections::BTreeSet;

fn scope() -> Scope {
    Scope::new("tenant-1")
}

fn ids(records: &[ProjectedRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn snapshots() -> ScriptedStrategy {
    ScriptedStrategy::new("snap")
        .item("os-snap-1", json!({"status": "completed", "volumeSize": 1}))
        .item("os-snap-2", json!({"status": "pending", "volumeSize": 2}))
}

#[test]
fn test_shadow_ids_are_stable_across_passes() {
    init_tracing();
    let ledger = TempLedger::new();
    let registry = KindRegistry::with_builtins().unwrap();

    let first = Reconciler::new(&registry, ledger.store(), snapshots())
        .unwrap()
        .describe(&scope(), DescribeRequest::all())
        .unwrap();
    let second = Reconciler::new(&registry, ledger.store(), snapshots())
        .unwrap()
        .describe(&scope(), DescribeRequest::all())
        .unwrap();

    assert_eq!(ids(&first), ids(&second));
    assert!(ids(&first).iter().all(|id| id.starts_with("snap-")));
    assert_eq!(ledger.load().unwrap().records().len(), 2);
}

#[test]
fn test_vanished_item_is_pruned_from_the_ledger() {
    let ledger = TempLedger::new();
    let registry = KindRegistry::with_builtins().unwrap();
    Reconciler::new(&registry, ledger.store(), snapshots())
        .unwrap()
        .describe(&scope(), DescribeRequest::all())
        .unwrap();

    let remaining = ScriptedStrategy::new("snap").item("os-snap-2", json!({"status": "pending"}));
    let records = Reconciler::new(&registry, ledger.store(), remaining)
        .unwrap()
        .describe(&scope(), DescribeRequest::all())
        .unwrap();

    let persisted = ledger.load().unwrap();
    assert_eq!(persisted.records().len(), 1);
    assert_eq!(persisted.records()[0].external_id.as_deref(), Some("os-snap-2"));
    assert_eq!(ids(&records), vec![persisted.records()[0].id.clone()]);
}

#[test]
fn test_not_found_still_persists_cleanup() {
    let ledger = TempLedger::new();
    let registry = KindRegistry::with_builtins().unwrap();
    let stale = ledger
        .register(&scope(), &"snap".into(), Some("os-snap-gone"), json!({}))
        .unwrap();

    let err = Reconciler::new(&registry, ledger.store(), snapshots())
        .unwrap()
        .describe(
            &scope(),
            DescribeRequest::all().with_ids([stale.id.as_str(), "snap-00000000"]),
        )
        .unwrap_err();

    assert_eq!(err.code(), "InvalidSnapshot.NotFound");
    assert!(ledger.load().unwrap().records().is_empty());
}

#[test]
fn test_registered_vpc_is_described_with_tags() {
    let ledger = TempLedger::new();
    let registry = KindRegistry::with_builtins().unwrap();
    let vpc = ledger
        .register(&scope(), &"vpc".into(), Some("os-router-1"), json!({}))
        .unwrap();
    ledger
        .add_tags(&scope(), &vpc.id, &[("Name", "main"), ("env", "prod")])
        .unwrap();

    let strategy = ScriptedStrategy::new("vpc")
        .item("os-router-1", json!({"state": "available", "cidrBlock": "10.0.0.0/16"}))
        .item("os-router-2", json!({"state": "available", "cidrBlock": "10.1.0.0/16"}));
    let describer = Reconciler::new(&registry, ledger.store(), Tagged::new(strategy)).unwrap();

    let records = describer
        .describe(
            &scope(),
            DescribeRequest::all().with_filters(vec![Filter::new("tag:Name", ["ma*"])]),
        )
        .unwrap();

    assert_eq!(ids(&records), vec![vpc.id.clone()]);
    assert_eq!(records[0].tag_set().map(Vec::len), Some(2));
    assert_eq!(ledger.load().unwrap().records().len(), 1, "vpc is never auto-created");
}

#[test]
fn test_projects_are_isolated() {
    let ledger = TempLedger::new();
    let registry = KindRegistry::with_builtins().unwrap();
    let other = Scope::new("tenant-2");
    ledger
        .register(&other, &"snap".into(), Some("os-snap-elsewhere"), json!({}))
        .unwrap();

    Reconciler::new(&registry, ledger.store(), snapshots())
        .unwrap()
        .describe(&scope(), DescribeRequest::all())
        .unwrap();

    let theirs = ledger
        .fetch(&other, &"snap".into(), &BTreeSet::new())
        .unwrap();
    assert_eq!(theirs.len(), 1);
}

#[test]
fn test_local_only_kind_reads_registered_attributes() {
    let ledger = TempLedger::new();
    let registry = KindRegistry::with_builtins().unwrap();
    ledger
        .register(
            &scope(),
            &"dopt".into(),
            None,
            json!({"dhcpConfigurationSet": [{"key": "domain-name", "value": "corp.local"}]}),
        )
        .unwrap();

    let describer =
        LocalOnlyDescriber::new(&registry, ledger.store(), ScriptedStrategy::new("dopt")).unwrap();
    let records = describer
        .describe(
            &scope(),
            DescribeRequest::all().with_filters(vec![Filter::new("key", ["domain-*"])]),
        )
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].get("dhcpConfigurationSet"),
        Some(&json!([{"key": "domain-name", "value": "corp.local"}]))
    );
}

#[test]
fn test_ledger_in_missing_directory_is_created_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let store = LedgerStore::new(dir.path().join("state").join("shadow.toml"));
    let registry = KindRegistry::with_builtins().unwrap();

    Reconciler::new(&registry, &store, snapshots())
        .unwrap()
        .describe(&scope(), DescribeRequest::all())
        .unwrap();

    assert!(store.path().exists());
}
