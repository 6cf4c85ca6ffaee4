//! Aggregation request types.
//!
//! An aggregation request is a tree of terms aggregations. Structural limits
//! keep it bounded: at most [`MAX_AGGREGATION_TERMS`] terms per level and a
//! nesting budget of [`MAX_NESTED_AGGREGATIONS`].

use serde::{Deserialize, Serialize};

use super::deployments::DeploymentsFilterPredicate;
use super::geo::{GeoBoundingBoxFilter, GeoDistanceFilter};
use super::search_params::{FilterPredicate, geo_fields};
use crate::validation::{
    MSG_REQUIRED, Validate, ValidationErrors, length, min, required, validate_each,
};

/// Bucket count used when a term leaves `limit` at zero.
pub const DEFAULT_AGGREGATION_LIMIT: i64 = 10;

/// Maximum number of terms on one level of the tree.
pub const MAX_AGGREGATION_TERMS: usize = 100;

/// Nesting budget of an aggregation tree.
pub const MAX_NESTED_AGGREGATIONS: usize = 5;

/// A node of an aggregation tree.
pub trait AggregationNode: Sized {
    fn children(&self) -> &[Self];
}

/// Checks the nesting budget of the subtree under a term.
///
/// Each level that has nested terms spends one unit of budget. Only the
/// first term with children is followed at every level; siblings are not
/// walked.
pub fn check_max_nested<T: AggregationNode>(terms: &[T], budget: usize) -> Option<String> {
    if budget == 0 {
        return Some(format!(
            "too many nested aggregations, limit is {}",
            MAX_NESTED_AGGREGATIONS
        ));
    }
    terms
        .iter()
        .find(|term| !term.children().is_empty())
        .and_then(|term| check_max_nested(term.children(), budget - 1))
}

/// Adds the `aggregations` field errors of a term: size and nesting rules
/// first, then each nested term.
fn nested_terms<T: AggregationNode + Validate>(errors: &mut ValidationErrors, terms: &[T]) {
    if terms.is_empty() {
        return;
    }
    let rules = [
        length(terms.len(), 0, MAX_AGGREGATION_TERMS),
        check_max_nested(terms, MAX_NESTED_AGGREGATIONS),
    ];
    match rules.into_iter().flatten().next() {
        Some(message) => errors.add("aggregations", message),
        None => errors.nest("aggregations", validate_each(terms)),
    }
}

/// Adds the `aggregations` field errors of a request's top level.
fn top_level_terms<T: Validate>(errors: &mut ValidationErrors, terms: &[T]) {
    if terms.is_empty() {
        errors.add("aggregations", MSG_REQUIRED);
        return;
    }
    match length(terms.len(), 1, MAX_AGGREGATION_TERMS) {
        Some(message) => errors.add("aggregations", message),
        None => errors.nest("aggregations", validate_each(terms)),
    }
}

/// One terms aggregation over a scoped attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationTerm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub aggregations: Vec<AggregationTerm>,
}

impl AggregationTerm {
    pub fn new(
        name: impl Into<String>,
        scope: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            scope: scope.into(),
            attribute: attribute.into(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_aggregation(mut self, term: AggregationTerm) -> Self {
        self.aggregations.push(term);
        self
    }
}

impl AggregationNode for AggregationTerm {
    fn children(&self) -> &[Self] {
        &self.aggregations
    }
}

impl Validate for AggregationTerm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("name", [required(&self.name)]);
        errors.check("attribute", [required(&self.attribute)]);
        errors.check("scope", [required(&self.scope)]);
        errors.check("limit", [min(self.limit, 0)]);
        nested_terms(&mut errors, &self.aggregations);
        errors.into_result()
    }
}

/// A device aggregation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateParams {
    #[serde(default)]
    pub aggregations: Vec<AggregationTerm>,
    #[serde(default)]
    pub filters: Vec<FilterPredicate>,
    #[serde(default)]
    pub geo_distance_filter: Option<GeoDistanceFilter>,
    #[serde(default)]
    pub geo_bounding_box_filter: Option<GeoBoundingBoxFilter>,
    #[serde(skip)]
    pub groups: Vec<String>,
    #[serde(skip)]
    pub tenant_id: String,
}

impl Validate for AggregateParams {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        top_level_terms(&mut errors, &self.aggregations);
        geo_fields(
            &mut errors,
            self.geo_distance_filter.as_ref(),
            self.geo_bounding_box_filter.as_ref(),
        );
        errors.into_result()?;

        for filter in &self.filters {
            filter.validate()?;
        }
        Ok(())
    }
}

/// One terms aggregation over a flat deployment attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentsAggregationTerm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub aggregations: Vec<DeploymentsAggregationTerm>,
}

impl DeploymentsAggregationTerm {
    pub fn new(name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute: attribute.into(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_aggregation(mut self, term: DeploymentsAggregationTerm) -> Self {
        self.aggregations.push(term);
        self
    }
}

impl AggregationNode for DeploymentsAggregationTerm {
    fn children(&self) -> &[Self] {
        &self.aggregations
    }
}

impl Validate for DeploymentsAggregationTerm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("name", [required(&self.name)]);
        errors.check("attribute", [required(&self.attribute)]);
        errors.check("limit", [min(self.limit, 0)]);
        nested_terms(&mut errors, &self.aggregations);
        errors.into_result()
    }
}

/// A deployment aggregation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateDeploymentsParams {
    #[serde(default)]
    pub aggregations: Vec<DeploymentsAggregationTerm>,
    #[serde(default)]
    pub filters: Vec<DeploymentsFilterPredicate>,
    #[serde(skip)]
    pub deployment_groups: Vec<String>,
    #[serde(skip)]
    pub tenant_id: String,
}

impl Validate for AggregateDeploymentsParams {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        top_level_terms(&mut errors, &self.aggregations);
        errors.into_result()?;

        for filter in &self.filters {
            filter.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(name: &str) -> AggregationTerm {
        AggregationTerm::new(name, "identity", "mac").with_limit(10)
    }

    /// A root term with `levels` single-child levels nested below it.
    fn chain(levels: usize) -> AggregationTerm {
        (0..levels).fold(mac("leaf"), |child, _| mac("mac").with_aggregation(child))
    }

    #[test]
    fn test_check_max_nested_budget() {
        assert_eq!(check_max_nested::<AggregationTerm>(&[], 5), None);
        assert!(check_max_nested::<AggregationTerm>(&[], 0).is_some());
        assert_eq!(check_max_nested(&[chain(4)], 5), None);
        assert!(check_max_nested(&[chain(5)], 5).is_some());
    }

    #[test]
    fn test_depth_walks_first_nested_branch_only() {
        // The deep chain sits behind a sibling that already has children,
        // so only the shallow branch is walked.
        let shallow = mac("shallow").with_aggregation(mac("leaf"));
        let root = mac("root")
            .with_aggregation(shallow)
            .with_aggregation(chain(8));
        assert_eq!(check_max_nested(&root.aggregations, MAX_NESTED_AGGREGATIONS), None);
    }

    #[test]
    fn test_term_chain_limits() {
        assert!(chain(5).validate().is_ok());
        assert_eq!(
            chain(6).validate().unwrap_err().to_string(),
            "aggregations: too many nested aggregations, limit is 5."
        );
    }

    #[test]
    fn test_too_many_nested_siblings() {
        let mut term = mac("mac");
        term.aggregations = vec![mac("child"); MAX_AGGREGATION_TERMS + 1];
        assert_eq!(
            term.validate().unwrap_err().to_string(),
            "aggregations: the length must be no more than 100."
        );
    }

    #[test]
    fn test_term_blank_fields() {
        let term = AggregationTerm::default();
        assert_eq!(
            term.validate().unwrap_err().to_string(),
            "attribute: cannot be blank; name: cannot be blank; scope: cannot be blank."
        );
    }

    #[test]
    fn test_negative_limit() {
        let term = mac("mac").with_limit(-1);
        assert_eq!(
            term.validate().unwrap_err().to_string(),
            "limit: must be no less than 0."
        );
    }

    #[test]
    fn test_deployments_term_blank_fields() {
        let term = DeploymentsAggregationTerm::default();
        assert_eq!(
            term.validate().unwrap_err().to_string(),
            "attribute: cannot be blank; name: cannot be blank."
        );
    }

    #[test]
    fn test_aggregate_params_requires_terms() {
        let params = AggregateParams::default();
        assert_eq!(
            params.validate().unwrap_err().to_string(),
            "aggregations: cannot be blank."
        );

        let params = AggregateDeploymentsParams::default();
        assert_eq!(
            params.validate().unwrap_err().to_string(),
            "aggregations: cannot be blank."
        );
    }

    #[test]
    fn test_aggregate_params_too_many_top_level_terms() {
        let params = AggregateParams {
            aggregations: vec![mac("mac"); MAX_AGGREGATION_TERMS + 1],
            ..Default::default()
        };
        assert_eq!(
            params.validate().unwrap_err().to_string(),
            "aggregations: the length must be between 1 and 100."
        );
    }
}
