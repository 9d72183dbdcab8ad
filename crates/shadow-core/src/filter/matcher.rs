//! Evaluation of a filter list against a projected record

use super::{Filter, FilterPath, FilterSchema, FilterValue, wildcard_match};
use crate::record::ProjectedRecord;
use crate::{Error, Result};
use serde_json::Value;
use std::borrow::Cow;

/// Decide whether `record` is dropped from a describe result
///
/// `filters = None` keeps every record. Otherwise each filter is resolved
/// through `schema` and its candidate values are read from the record:
///
/// - a filter with no candidate values drops the record at once;
/// - the first `(filter value, candidate)` pair accepted by `matches` keeps
///   the record, without looking at the remaining filters;
/// - a record no filter matched is dropped.
///
/// The second rule makes distinct filter names OR-combined.
///
/// # Errors
///
/// Returns [`Error::InvalidParameterValue`] for a name missing from `schema`.
pub fn filtered_out<F>(
    schema: &FilterSchema,
    record: &ProjectedRecord,
    filters: Option<&[Filter]>,
    matches: F,
) -> Result<bool>
where
    F: Fn(&FilterValue, &Value) -> bool,
{
    let Some(filters) = filters else {
        return Ok(false);
    };

    for filter in filters {
        let path = schema
            .resolve(&filter.name)
            .ok_or_else(|| Error::invalid_filter(&filter.name))?;

        let candidates = candidates(record, path);
        if candidates.is_empty() {
            return Ok(true);
        }

        for value in &filter.values {
            if candidates.iter().any(|candidate| matches(value, candidate)) {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn candidates<'a>(record: &'a ProjectedRecord, path: &FilterPath) -> Vec<&'a Value> {
    match path {
        FilterPath::Attribute(field) => record.get(field).filter(|v| is_truthy(v)).into_iter().collect(),
        FilterPath::Element {
            collection,
            element,
        } => record
            .get(collection)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|item| item.get(element)).collect())
            .unwrap_or_default(),
    }
}

/// Whether a field value counts as present
///
/// Null, `false`, zero, empty strings and empty collections do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Text a scalar candidate is compared as; collections have none.
pub fn candidate_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Plain value matching: a pattern against a scalar candidate
///
/// Structured predicates never match here; the tag wrapper handles them.
pub fn pattern_matches(filter_value: &FilterValue, candidate: &Value) -> bool {
    match filter_value {
        FilterValue::Pattern(pattern) => {
            candidate_text(candidate).is_some_and(|text| wildcard_match(pattern, &text))
        }
        FilterValue::Tag(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> FilterSchema {
        FilterSchema::new()
            .attribute("status", "status")
            .attribute("size", "size")
            .element("attachment.state", "attachmentSet", "state")
    }

    fn record(value: Value) -> ProjectedRecord {
        ProjectedRecord::from_value(value).unwrap()
    }

    fn run(record: &ProjectedRecord, filters: Option<&[Filter]>) -> Result<bool> {
        filtered_out(&schema(), record, filters, pattern_matches)
    }

    #[test]
    fn no_filters_keeps_everything() {
        assert_eq!(run(&record(json!({})), None).unwrap(), false);
    }

    #[test]
    fn empty_filter_list_drops_the_record() {
        assert_eq!(run(&record(json!({"status": "running"})), Some(&[])).unwrap(), true);
    }

    #[test]
    fn simple_attribute_is_wildcard_matched() {
        let filters = [Filter::new("status", ["run*"])];
        assert_eq!(run(&record(json!({"status": "running"})), Some(&filters)).unwrap(), false);
        assert_eq!(run(&record(json!({"status": "stopped"})), Some(&filters)).unwrap(), true);
    }

    #[test]
    fn absent_or_empty_attribute_is_dropped_regardless_of_pattern() {
        let filters = [Filter::new("status", ["*"])];
        assert!(run(&record(json!({})), Some(&filters)).unwrap());
        assert!(run(&record(json!({"status": ""})), Some(&filters)).unwrap());
        assert!(run(&record(json!({"status": null})), Some(&filters)).unwrap());
    }

    #[test]
    fn numbers_match_through_their_text() {
        let filters = [Filter::new("size", ["1?"])];
        assert!(!run(&record(json!({"size": 10})), Some(&filters)).unwrap());
        assert!(run(&record(json!({"size": 100})), Some(&filters)).unwrap());
    }

    #[test]
    fn compound_path_matches_any_collection_element() {
        let filters = [Filter::new("attachment.state", ["attached"])];
        let attached = record(json!({
            "attachmentSet": [{"state": "detaching"}, {"state": "attached"}]
        }));
        let detached = record(json!({"attachmentSet": [{"state": "detached"}]}));
        let empty = record(json!({"attachmentSet": []}));

        assert!(!run(&attached, Some(&filters)).unwrap());
        assert!(run(&detached, Some(&filters)).unwrap());
        assert!(run(&empty, Some(&filters)).unwrap());
        assert!(run(&record(json!({})), Some(&filters)).unwrap());
    }

    #[test]
    fn first_matching_filter_keeps_the_record() {
        // The second filter would not match, but evaluation stops at the first.
        let filters = [
            Filter::new("status", ["running"]),
            Filter::new("size", ["999"]),
        ];
        let r = record(json!({"status": "running", "size": 8}));
        assert!(!run(&r, Some(&filters)).unwrap());
    }

    #[test]
    fn missing_candidate_in_a_later_filter_still_drops() {
        let filters = [
            Filter::new("status", ["stopped"]),
            Filter::new("size", ["8"]),
        ];
        let r = record(json!({"status": "running"}));
        assert!(run(&r, Some(&filters)).unwrap());
    }

    #[test]
    fn unknown_filter_name_is_invalid_parameter() {
        let filters = [Filter::new("owner-id", ["123"])];
        let err = run(&record(json!({"status": "running"})), Some(&filters)).unwrap_err();

        match err {
            Error::InvalidParameterValue {
                parameter, value, ..
            } => {
                assert_eq!(parameter, "filter");
                assert_eq!(value, "owner-id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn truthiness_follows_json_emptiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([{"key": "a"}])));
    }
}
