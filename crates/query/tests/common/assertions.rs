//! JSON assertion helpers.

use serde_json::Value;

/// Asserts that a compiled body carries a top-level key.
pub fn assert_has_key(body: &Value, key: &str) {
    assert!(
        body.get(key).is_some(),
        "expected key {:?} in {}",
        key,
        body
    );
}

/// Asserts that a compiled body lacks a top-level key.
pub fn assert_no_key(body: &Value, key: &str) {
    assert!(
        body.get(key).is_none(),
        "unexpected key {:?} in {}",
        key,
        body
    );
}

/// Returns the `must` clauses of a compiled body, or an empty list.
pub fn must_clauses(body: &Value) -> Vec<Value> {
    body["query"]["bool"]["must"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

/// Returns the `must_not` clauses of a compiled body, or an empty list.
pub fn must_not_clauses(body: &Value) -> Vec<Value> {
    body["query"]["bool"]["must_not"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

/// Asserts that a validation error renders exactly as expected.
pub fn assert_validation_message<E: std::fmt::Display>(result: Result<(), E>, expected: &str) {
    match result {
        Ok(()) => panic!("expected validation error {:?}", expected),
        Err(err) => assert_eq!(err.to_string(), expected),
    }
}
