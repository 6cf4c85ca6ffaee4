//! Device search request types.
//!
//! This module defines the client-facing search request for the device
//! domain, where every attribute lives in a scope, along with the filter
//! operators shared with the deployments domain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::geo::{GeoBoundingBoxFilter, GeoDistanceFilter};
use super::value::FilterValue;
use crate::validation::{MSG_NOT_NIL, Validate, ValidationErrors, one_of, required};

/// Default page for search requests.
pub const DEFAULT_PAGE: i64 = 0;

/// Default page size for search requests.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Ascending sort order.
pub const SORT_ORDER_ASC: &str = "asc";

/// Descending sort order.
pub const SORT_ORDER_DESC: &str = "desc";

/// Accepted sort orders.
pub const VALID_SORT_ORDERS: [&str; 2] = [SORT_ORDER_ASC, SORT_ORDER_DESC];

/// Filter operators accepted from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Exists,
    Regex,
}

impl Operator {
    /// All operators, in whitelist order.
    pub const ALL: [Operator; 10] = [
        Operator::Eq,
        Operator::Gt,
        Operator::Gte,
        Operator::In,
        Operator::Lt,
        Operator::Lte,
        Operator::Ne,
        Operator::Nin,
        Operator::Exists,
        Operator::Regex,
    ];

    /// Returns the wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::In => "$in",
            Operator::Nin => "$nin",
            Operator::Exists => "$exists",
            Operator::Regex => "$regex",
        }
    }

    /// Returns the wire names of all operators.
    pub fn names() -> [&'static str; 10] {
        Self::ALL.map(|op| op.as_str())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown filter operator: {}", s))
    }
}

/// Common view over scoped and flat filter predicates.
///
/// Flat predicates report an empty scope, which makes the attribute namer
/// leave their attribute names unscoped.
pub trait Predicate {
    fn scope(&self) -> &str;
    fn attribute(&self) -> &str;
    fn operator(&self) -> &str;
    fn value(&self) -> &FilterValue;
}

/// One client filter clause over a scoped attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub attribute: String,
    #[serde(rename = "type", default)]
    pub operator: String,
    #[serde(default)]
    pub value: FilterValue,
}

impl FilterPredicate {
    pub fn new(
        scope: impl Into<String>,
        attribute: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            scope: scope.into(),
            attribute: attribute.into(),
            operator: operator.as_str().to_string(),
            value: value.into(),
        }
    }
}

impl Predicate for FilterPredicate {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn attribute(&self) -> &str {
        &self.attribute
    }

    fn operator(&self) -> &str {
        &self.operator
    }

    fn value(&self) -> &FilterValue {
        &self.value
    }
}

impl Validate for FilterPredicate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("scope", [required(&self.scope)]);
        validate_predicate(&mut errors, self);
        errors.into_result()
    }
}

/// Checks the fields every predicate carries: attribute, operator, value.
pub(crate) fn validate_predicate(errors: &mut ValidationErrors, predicate: &impl Predicate) {
    errors.check("attribute", [required(predicate.attribute())]);
    errors.check(
        "type",
        [
            required(predicate.operator()),
            one_of(predicate.operator(), &Operator::names()),
        ],
    );
    if predicate.value().is_null() {
        errors.add("value", MSG_NOT_NIL);
    }
}

/// Checks a sort order: required and in the whitelist.
pub(crate) fn validate_order(errors: &mut ValidationErrors, order: &str) {
    errors.check("order", [required(order), one_of(order, &VALID_SORT_ORDERS)]);
}

/// One sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriteria {
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub order: String,
}

impl Validate for SortCriteria {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("scope", [required(&self.scope)]);
        errors.check("attribute", [required(&self.attribute)]);
        validate_order(&mut errors, &self.order);
        errors.into_result()
    }
}

/// One attribute to project into search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectAttribute {
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub attribute: String,
}

impl Validate for SelectAttribute {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("scope", [required(&self.scope)]);
        errors.check("attribute", [required(&self.attribute)]);
        errors.into_result()
    }
}

/// A device search request.
///
/// `groups` and `tenant_id` come from the request context, never from the
/// request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub per_page: i64,
    #[serde(default)]
    pub filters: Vec<FilterPredicate>,
    #[serde(default)]
    pub geo_distance_filter: Option<GeoDistanceFilter>,
    #[serde(default)]
    pub geo_bounding_box_filter: Option<GeoBoundingBoxFilter>,
    #[serde(default)]
    pub sort: Vec<SortCriteria>,
    #[serde(default)]
    pub attributes: Vec<SelectAttribute>,
    #[serde(default)]
    pub device_ids: Vec<String>,
    #[serde(skip)]
    pub groups: Vec<String>,
    #[serde(skip)]
    pub tenant_id: String,
}

impl SearchParams {
    /// Creates an empty request for the given page.
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page,
            per_page,
            ..Default::default()
        }
    }
}

impl Validate for SearchParams {
    /// Geo filters are checked first and reported under their field names;
    /// after that the first failing filter, sort criterion or attribute is
    /// reported on its own.
    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_geo_filters(
            self.geo_distance_filter.as_ref(),
            self.geo_bounding_box_filter.as_ref(),
        )?;

        for filter in &self.filters {
            filter.validate()?;
        }
        for sort in &self.sort {
            sort.validate()?;
        }
        for attribute in &self.attributes {
            attribute.validate()?;
        }
        Ok(())
    }
}

/// Validates the optional geo filters of a request.
pub(crate) fn validate_geo_filters(
    distance: Option<&GeoDistanceFilter>,
    bounding_box: Option<&GeoBoundingBoxFilter>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    geo_fields(&mut errors, distance, bounding_box);
    errors.into_result()
}

/// Adds geo filter errors to an existing error set.
pub(crate) fn geo_fields(
    errors: &mut ValidationErrors,
    distance: Option<&GeoDistanceFilter>,
    bounding_box: Option<&GeoBoundingBoxFilter>,
) {
    if let Some(filter) = distance {
        errors.nest("geo_distance_filter", filter.validate());
    }
    if let Some(filter) = bounding_box {
        errors.nest("geo_bounding_box_filter", filter.validate());
    }
}
