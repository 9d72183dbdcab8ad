//! Tests for tag filters and tag sets

use serde_json::{Value, json};
use shadow_core::{
    Describe, DescribeRequest, Filter, KindRegistry, LocalOnlyDescriber, ProjectedRecord,
    Reconciler, Scope, Tagged,
};
use shadow_test_utils::{MemoryStore, ScriptedStrategy};

fn scope() -> Scope {
    Scope::new("project-a")
}

fn ids(records: &[ProjectedRecord]) -> Vec<&str> {
    records
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_str))
        .collect()
}

/// Three instances: two tagged web servers and one untagged.
fn instances() -> (MemoryStore, KindRegistry, Tagged<ScriptedStrategy>) {
    let store = MemoryStore::new();
    store.seed_with_id(&scope(), "i-web1", Some("os-1"));
    store.seed_with_id(&scope(), "i-web2", Some("os-2"));
    store.seed_with_id(&scope(), "i-bare", Some("os-3"));
    store.tag(&scope(), "i-web1", "Name", "web-1");
    store.tag(&scope(), "i-web1", "env", "prod");
    store.tag(&scope(), "i-web2", "Name", "web-2");
    store.tag(&scope(), "i-web2", "aws:stack-name", "frontend");

    let strategy = ScriptedStrategy::new("i")
        .item("os-1", json!({"instanceType": "m1.small"}))
        .item("os-2", json!({"instanceType": "m1.large"}))
        .item("os-3", json!({"instanceType": "m1.small"}));

    let registry = KindRegistry::with_builtins().unwrap();
    (store, registry, Tagged::new(strategy))
}

fn describe(filters: Option<Vec<Filter>>) -> Vec<ProjectedRecord> {
    let (store, registry, strategy) = instances();
    let describer = Reconciler::new(&registry, &store, strategy).unwrap();
    let request = match filters {
        Some(filters) => DescribeRequest::all().with_filters(filters),
        None => DescribeRequest::all(),
    };
    describer.describe(&scope(), request).unwrap()
}

mod tag_set_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tag_set_is_attached_in_store_order() {
        let records = describe(None);

        assert_eq!(
            records[0].get("tagSet"),
            Some(&json!([
                {"key": "Name", "value": "web-1"},
                {"key": "env", "value": "prod"}
            ]))
        );
    }

    #[test]
    fn test_untagged_record_has_no_tag_set() {
        let records = describe(None);

        assert_eq!(ids(&records), vec!["i-web1", "i-web2", "i-bare"]);
        assert!(!records[2].contains("tagSet"));
    }

    #[test]
    fn test_wrapped_hooks_still_run() {
        let (store, registry, strategy) = instances();
        let describer = Reconciler::new(&registry, &store, strategy).unwrap();

        describer.describe(&scope(), DescribeRequest::all()).unwrap();

        assert_eq!(describer.strategy().inner().post_processed(), 3);
    }

    #[test]
    fn test_tags_of_selected_records_only() {
        let (store, registry, strategy) = instances();
        let describer = Reconciler::new(&registry, &store, strategy).unwrap();

        let records = describer
            .describe(&scope(), DescribeRequest::all().with_ids(["i-web2"]))
            .unwrap();

        assert_eq!(ids(&records), vec!["i-web2"]);
        assert_eq!(
            records[0].tag_set().map(Vec::len),
            Some(2),
            "tag set should hold both tags of i-web2"
        );
    }
}

mod tag_filter_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tag_key_filter() {
        let records = describe(Some(vec![Filter::new("tag-key", ["env"])]));
        assert_eq!(ids(&records), vec!["i-web1"]);
    }

    #[test]
    fn test_tag_value_filter_with_wildcard() {
        let records = describe(Some(vec![Filter::new("tag-value", ["web-*"])]));
        assert_eq!(ids(&records), vec!["i-web1", "i-web2"]);
    }

    #[test]
    fn test_tag_prefixed_filter_matches_key_and_value() {
        let records = describe(Some(vec![Filter::new("tag:Name", ["web-2"])]));
        assert_eq!(ids(&records), vec!["i-web2"]);
    }

    #[test]
    fn test_tag_prefixed_filter_requires_the_key() {
        let records = describe(Some(vec![Filter::new("tag:env", ["web-*"])]));
        assert!(records.is_empty());
    }

    #[test]
    fn test_tag_key_may_contain_colons() {
        let records = describe(Some(vec![Filter::new("tag:aws:stack-name", ["front*"])]));
        assert_eq!(ids(&records), vec!["i-web2"]);
    }

    #[test]
    fn test_tag_filter_combines_with_schema_filters() {
        let records = describe(Some(vec![
            Filter::new("tag:Name", ["nothing"]),
            Filter::new("instance-type", ["m1.large"]),
        ]));
        assert_eq!(ids(&records), vec!["i-web2"]);
    }

    #[test]
    fn test_tag_filters_are_unknown_without_the_wrapper() {
        let (store, registry, strategy) = instances();
        let describer = Reconciler::new(&registry, &store, strategy.into_inner()).unwrap();

        let err = describer
            .describe(
                &scope(),
                DescribeRequest::all().with_filters(vec![Filter::new("tag-key", ["Name"])]),
            )
            .unwrap_err();

        assert_eq!(err.code(), "InvalidParameterValue");
    }
}

mod local_only_tag_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_local_only_describer_exposes_tags() {
        let store = MemoryStore::new();
        store.seed_with_id(&scope(), "dopt-1", None);
        store.seed_with_id(&scope(), "dopt-2", None);
        store.tag(&scope(), "dopt-2", "Name", "corp");
        let registry = KindRegistry::with_builtins().unwrap();
        let describer =
            LocalOnlyDescriber::new(&registry, &store, Tagged::new(ScriptedStrategy::new("dopt")))
                .unwrap();

        let records = describer
            .describe(
                &scope(),
                DescribeRequest::all().with_filters(vec![Filter::new("tag:Name", ["corp"])]),
            )
            .unwrap();

        assert_eq!(ids(&records), vec!["dopt-2"]);
    }
}
