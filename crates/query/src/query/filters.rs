//! Filter query parts.
//!
//! One part type per operator. Every part is built through [`Filter::new`],
//! which classifies the predicate value, applies the operator's array and
//! type policies, and resolves the target field name.

use serde_json::{Value, json};
use tracing::warn;

use super::{Query, QueryPart};
use crate::error::FilterError;
use crate::types::{AttrVariants, Operator, Predicate, Type, TypePolicy, special_attr, to_attr};

/// Whether an operator takes array values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayPolicy {
    NotAllowed,
    Allowed,
    Required,
}

/// The resolved field and value shared by all filter parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub attr: String,
    pub value: Value,
}

impl Filter {
    pub fn new(
        predicate: &impl Predicate,
        arrays: ArrayPolicy,
        types: TypePolicy,
    ) -> Result<Self, FilterError> {
        let (typ, is_array) = predicate.value().value_type()?;

        match (arrays, is_array) {
            (ArrayPolicy::NotAllowed, true) => return Err(FilterError::ArrayNotSupported),
            (ArrayPolicy::Required, false) => return Err(FilterError::ArrayRequired),
            _ => {}
        }

        // The error names the type the value actually has.
        if !types.accepts(typ) {
            return Err(match typ {
                Type::String => FilterError::StrRequired,
                Type::Number => FilterError::NumRequired,
                Type::Boolean => FilterError::BoolRequired,
            });
        }

        let attr = match special_attr(predicate.attribute()) {
            Some(field) => field.to_string(),
            None => to_attr(predicate.scope(), predicate.attribute(), typ),
        };

        Ok(Self {
            attr,
            value: predicate.value().to_value(),
        })
    }

    /// `{kind: {attr: value}}`
    fn clause(&self, kind: &str) -> Value {
        json!({ kind: { self.attr.as_str(): &self.value } })
    }
}

/// `$eq`: the field matches the value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEq(pub Filter);

impl FilterEq {
    pub fn new(predicate: &impl Predicate) -> Result<Self, FilterError> {
        Filter::new(predicate, ArrayPolicy::NotAllowed, TypePolicy::Any).map(Self)
    }
}

impl QueryPart for FilterEq {
    fn add_to(&self, query: Query) -> Query {
        query.must(self.0.clause("match"))
    }
}

/// `$ne`: the field does not match the value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNe(pub Filter);

impl FilterNe {
    pub fn new(predicate: &impl Predicate) -> Result<Self, FilterError> {
        Filter::new(predicate, ArrayPolicy::NotAllowed, TypePolicy::Any).map(Self)
    }
}

impl QueryPart for FilterNe {
    fn add_to(&self, query: Query) -> Query {
        query.must_not(self.0.clause("match"))
    }
}

/// Range bound of a `$gt`/`$gte`/`$lt`/`$lte` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl RangeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeOp::Gt => "gt",
            RangeOp::Gte => "gte",
            RangeOp::Lt => "lt",
            RangeOp::Lte => "lte",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterRange {
    pub filter: Filter,
    pub op: RangeOp,
}

impl FilterRange {
    pub fn new(predicate: &impl Predicate, op: RangeOp) -> Result<Self, FilterError> {
        let filter = Filter::new(predicate, ArrayPolicy::NotAllowed, TypePolicy::Any)?;
        Ok(Self { filter, op })
    }
}

impl QueryPart for FilterRange {
    fn add_to(&self, query: Query) -> Query {
        query.must(json!({
            "range": {
                self.filter.attr.as_str(): { self.op.as_str(): &self.filter.value }
            }
        }))
    }
}

/// `$in`: the field matches any of the values.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterIn(pub Filter);

impl FilterIn {
    pub fn new(predicate: &impl Predicate) -> Result<Self, FilterError> {
        Filter::new(predicate, ArrayPolicy::Required, TypePolicy::Any).map(Self)
    }
}

impl QueryPart for FilterIn {
    fn add_to(&self, query: Query) -> Query {
        query.must(self.0.clause("terms"))
    }
}

/// `$nin`: the field matches none of the values.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNin(pub Filter);

impl FilterNin {
    pub fn new(predicate: &impl Predicate) -> Result<Self, FilterError> {
        Filter::new(predicate, ArrayPolicy::Required, TypePolicy::Any).map(Self)
    }
}

impl QueryPart for FilterNin {
    fn add_to(&self, query: Query) -> Query {
        query.must_not(self.0.clause("terms"))
    }
}

/// `$regex`: the string field matches a regular expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRegex(pub Filter);

impl FilterRegex {
    pub fn new(predicate: &impl Predicate) -> Result<Self, FilterError> {
        Filter::new(predicate, ArrayPolicy::NotAllowed, TypePolicy::Only(Type::String)).map(Self)
    }
}

impl QueryPart for FilterRegex {
    fn add_to(&self, query: Query) -> Query {
        query.must(self.0.clause("regexp"))
    }
}

/// `$exists`: the attribute is (or is not) present under any type.
///
/// Existence ignores the value type, so the check covers all three
/// type-suffixed fields of the attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExists {
    pub variants: AttrVariants,
    pub exists: bool,
}

impl FilterExists {
    pub fn new(predicate: &impl Predicate) -> Result<Self, FilterError> {
        Filter::new(predicate, ArrayPolicy::NotAllowed, TypePolicy::Only(Type::Boolean))?;
        let exists = predicate
            .value()
            .as_bool()
            .ok_or(FilterError::BoolRequired)?;
        Ok(Self {
            variants: AttrVariants::new(predicate.scope(), predicate.attribute()),
            exists,
        })
    }
}

impl QueryPart for FilterExists {
    fn add_to(&self, query: Query) -> Query {
        let clauses = self
            .variants
            .to_array()
            .map(|field| json!({ "exists": { "field": field } }));

        if self.exists {
            return query.must(json!({
                "bool": {
                    "minimum_should_match": 1,
                    "should": clauses,
                }
            }));
        }
        clauses.into_iter().fold(query, Query::must_not)
    }
}

/// Builds the query part for a predicate's operator.
pub fn filter_part(predicate: &impl Predicate) -> Result<Box<dyn QueryPart>, FilterError> {
    let Ok(operator) = predicate.operator().parse::<Operator>() else {
        warn!(
            operator = predicate.operator(),
            attribute = predicate.attribute(),
            "Unsupported filter operator"
        );
        return Err(FilterError::UnsupportedOperator {
            operator: predicate.operator().to_string(),
        });
    };

    let part: Box<dyn QueryPart> = match operator {
        Operator::Eq => Box::new(FilterEq::new(predicate)?),
        Operator::Ne => Box::new(FilterNe::new(predicate)?),
        Operator::Gt => Box::new(FilterRange::new(predicate, RangeOp::Gt)?),
        Operator::Gte => Box::new(FilterRange::new(predicate, RangeOp::Gte)?),
        Operator::Lt => Box::new(FilterRange::new(predicate, RangeOp::Lt)?),
        Operator::Lte => Box::new(FilterRange::new(predicate, RangeOp::Lte)?),
        Operator::In => Box::new(FilterIn::new(predicate)?),
        Operator::Nin => Box::new(FilterNin::new(predicate)?),
        Operator::Exists => Box::new(FilterExists::new(predicate)?),
        Operator::Regex => Box::new(FilterRegex::new(predicate)?),
    };
    Ok(part)
}

/// `terms` filter on a fixed, unscoped field: device IDs, deployment IDs,
/// deployment groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsFilter {
    pub field: String,
    pub values: Vec<String>,
}

impl TermsFilter {
    pub fn new(field: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            values,
        }
    }
}

impl QueryPart for TermsFilter {
    fn add_to(&self, query: Query) -> Query {
        query.must(json!({ "terms": { self.field.as_str(): &self.values } }))
    }
}

/// `term` filter on a fixed, unscoped field, e.g. the tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFilter {
    pub field: String,
    pub value: String,
}

impl TermFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl QueryPart for TermFilter {
    fn add_to(&self, query: Query) -> Query {
        query.must(json!({ "term": { self.field.as_str(): &self.value } }))
    }
}
