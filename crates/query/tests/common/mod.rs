//! Test infrastructure for the query compiler.
//!
//! Shared fixtures, JSON assertions and the `range_test!` macro used by the
//! integration test files.

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;

/// Defines a test that compiles a range predicate and checks the clause.
///
/// # Example
///
/// ```ignore
/// range_test!(gt, Operator::Gt, 5);
/// ```
#[macro_export]
macro_rules! range_test {
    ($name:ident, $operator:expr, $value:expr) => {
        paste::paste! {
            #[test]
            fn [<test_range_ $name _number>]() {
                let params = $crate::common::device_search(vec![
                    reporting_query::types::FilterPredicate::new("inventory", "mem", $operator, $value),
                ]);
                let body = $crate::common::compile(&params);
                assert_eq!(
                    body["query"]["bool"]["must"],
                    serde_json::json!([
                        {"range": {"inventory_mem_num": {stringify!($name): $value}}}
                    ])
                );
            }

            #[test]
            fn [<test_range_ $name _string>]() {
                let params = $crate::common::device_search(vec![
                    reporting_query::types::FilterPredicate::new("inventory", "fw", $operator, "1.2"),
                ]);
                let body = $crate::common::compile(&params);
                assert_eq!(
                    body["query"]["bool"]["must"],
                    serde_json::json!([
                        {"range": {"inventory_fw_str": {stringify!($name): "1.2"}}}
                    ])
                );
            }

            #[test]
            fn [<test_range_ $name _rejects_array>]() {
                let params = $crate::common::device_search(vec![
                    reporting_query::types::FilterPredicate::new("inventory", "mem", $operator, vec!["1"]),
                ]);
                let err = reporting_query::build_query(&params).unwrap_err();
                assert_eq!(err.to_string(), "filter doesn't support array values");
            }
        }
    };
}
