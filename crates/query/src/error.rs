//! Error types for the query compiler.
//!
//! Every error produced here is the result of malformed or out-of-policy
//! client input. Callers are expected to render them as client errors:
//! - [`ValidationErrors`] for structural problems found by `validate()`
//! - [`FilterError`] for predicates an operator cannot accept

use thiserror::Error;

pub use crate::validation::{FieldError, ValidationErrors};

/// The primary error type returned by the `build_*` and `compile_*` functions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Structural validation errors
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Operator/value mismatch errors
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Errors raised while turning a filter predicate into a query part.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The predicate operator is not one of the supported selectors.
    #[error("filter type not supported")]
    UnsupportedOperator { operator: String },

    /// An array value was given to an operator that compares scalars.
    #[error("filter doesn't support array values")]
    ArrayNotSupported,

    /// A scalar value was given to a membership operator.
    #[error("filter supports only array values")]
    ArrayRequired,

    #[error("filter supports only string values")]
    StrRequired,

    #[error("filter supports only numeric values")]
    NumRequired,

    #[error("filter supports only boolean values")]
    BoolRequired,

    /// The value is null, an object, a nested or mixed array.
    #[error("unknown attribute value type: {value} {type_name}")]
    UnknownValueType { value: String, type_name: String },
}

/// Result type for compiler operations.
pub type QueryResult<T> = Result<T, QueryError>;
