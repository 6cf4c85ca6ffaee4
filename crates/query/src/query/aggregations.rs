//! Terms aggregation documents.
//!
//! Built from validated aggregation terms; the output maps each term name to
//! a `terms` aggregation with optional nested `aggs`:
//!
//! ```text
//! {"by_mac": {"terms": {"field": "identity_mac_str", "size": 10}, "aggs": {...}}}
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{
    AggregationTerm, DEFAULT_AGGREGATION_LIMIT, DeploymentsAggregationTerm, Type, to_attr,
};

/// Aggregations keyed by term name. A repeated name replaces the earlier
/// entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Aggregations(BTreeMap<String, Aggregation>);

impl Aggregations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, aggregation: Aggregation) {
        self.0.insert(name.into(), aggregation);
    }

    pub fn get(&self, name: &str) -> Option<&Aggregation> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub terms: TermsAggregation,
    #[serde(skip_serializing_if = "Aggregations::is_empty")]
    pub aggs: Aggregations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermsAggregation {
    pub field: String,
    pub size: i64,
}

impl Aggregation {
    /// A zero or negative limit falls back to the default bucket count.
    pub fn terms(field: impl Into<String>, limit: i64) -> Self {
        let size = if limit <= 0 {
            DEFAULT_AGGREGATION_LIMIT
        } else {
            limit
        };
        Self {
            terms: TermsAggregation {
                field: field.into(),
                size,
            },
            aggs: Aggregations::new(),
        }
    }

    pub fn with_aggs(mut self, aggs: Aggregations) -> Self {
        self.aggs = aggs;
        self
    }
}

/// Builds aggregations over scoped device attributes.
///
/// Terms aggregate on the string variant of the attribute.
pub fn build_aggregations(terms: &[AggregationTerm]) -> Aggregations {
    let mut aggregations = Aggregations::new();
    for term in terms {
        let field = to_attr(&term.scope, &term.attribute, Type::String);
        let aggregation =
            Aggregation::terms(field, term.limit).with_aggs(build_aggregations(&term.aggregations));
        aggregations.insert(term.name.clone(), aggregation);
    }
    aggregations
}

/// Builds aggregations over flat deployment attributes.
pub fn build_deployments_aggregations(terms: &[DeploymentsAggregationTerm]) -> Aggregations {
    let mut aggregations = Aggregations::new();
    for term in terms {
        let aggregation = Aggregation::terms(term.attribute.clone(), term.limit)
            .with_aggs(build_deployments_aggregations(&term.aggregations));
        aggregations.insert(term.name.clone(), aggregation);
    }
    aggregations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_term() {
        let terms = vec![AggregationTerm::new("by_mac", "identity", "mac")];
        assert_eq!(
            serde_json::to_value(build_aggregations(&terms)).unwrap(),
            json!({"by_mac": {"terms": {"field": "identity_mac_str", "size": 10}}})
        );
    }

    #[test]
    fn test_limit_defaults() {
        for limit in [0, -5] {
            let aggregation = Aggregation::terms("f", limit);
            assert_eq!(aggregation.terms.size, DEFAULT_AGGREGATION_LIMIT);
        }
        assert_eq!(Aggregation::terms("f", 3).terms.size, 3);
    }

    #[test]
    fn test_nested_terms() {
        let terms = vec![
            AggregationTerm::new("by_type", "inventory", "device_type")
                .with_limit(5)
                .with_aggregation(AggregationTerm::new("by_os", "inventory", "os.name")),
        ];
        assert_eq!(
            serde_json::to_value(build_aggregations(&terms)).unwrap(),
            json!({
                "by_type": {
                    "terms": {"field": "inventory_device_type_str", "size": 5},
                    "aggs": {
                        "by_os": {"terms": {"field": r"inventory_os\\name_str", "size": 10}}
                    }
                }
            })
        );
    }

    #[test]
    fn test_duplicate_names_overwrite() {
        let terms = vec![
            AggregationTerm::new("same", "identity", "mac"),
            AggregationTerm::new("same", "inventory", "ip"),
        ];
        let aggregations = build_aggregations(&terms);
        assert_eq!(aggregations.len(), 1);
        assert_eq!(
            aggregations.get("same").unwrap().terms.field,
            "inventory_ip_str"
        );
    }

    #[test]
    fn test_deployments_use_raw_attribute() {
        let terms = vec![
            DeploymentsAggregationTerm::new("by_status", "device_status")
                .with_aggregation(DeploymentsAggregationTerm::new("by_name", "deployment_name").with_limit(3)),
        ];
        assert_eq!(
            serde_json::to_value(build_deployments_aggregations(&terms)).unwrap(),
            json!({
                "by_status": {
                    "terms": {"field": "device_status", "size": 10},
                    "aggs": {"by_name": {"terms": {"field": "deployment_name", "size": 3}}}
                }
            })
        );
    }
}
