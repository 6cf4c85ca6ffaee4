//! Structural validation of client requests.
//!
//! Errors are collected per field and rendered in a stable, client-facing
//! shape: fields are sorted by name and joined with `"; "`, nested errors
//! are parenthesized, and the whole list ends with a period:
//!
//! ```text
//! aggregations: (0: (attribute: cannot be blank; name: cannot be blank.).).
//! ```
//!
//! List elements are keyed by their index, so a nested list renders as
//! `(0: (...).)`.

use std::collections::BTreeMap;
use std::fmt;

/// Message for a missing or empty required field.
pub const MSG_REQUIRED: &str = "cannot be blank";

/// Message for a field that must be present but may be empty.
pub const MSG_NOT_NIL: &str = "is required";

/// Message for a value outside its whitelist.
pub const MSG_NOT_IN: &str = "must be a valid value";

/// Types that can check their own structure.
pub trait Validate {
    /// Returns all structural errors found in `self`, keyed by field name.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// A single field failure: either a rule message or the errors of a
/// nested structure or list.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    Message(String),
    Nested(ValidationErrors),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Message(message) => write!(f, "{}", message),
            FieldError::Nested(errors) => write!(f, "({})", errors),
        }
    }
}

/// Field name to failure mapping, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(BTreeMap<String, FieldError>);

impl ValidationErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of failed fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the failure recorded for a field.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    /// Records a rule failure for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0
            .insert(field.into(), FieldError::Message(message.into()));
    }

    /// Records the first failing rule for a field, if any.
    pub fn check(&mut self, field: &str, rules: impl IntoIterator<Item = Option<String>>) {
        if let Some(message) = rules.into_iter().flatten().next() {
            self.add(field, message);
        }
    }

    /// Records the errors of a nested value under a field name.
    pub fn nest(&mut self, field: impl Into<String>, result: Result<(), ValidationErrors>) {
        if let Err(errors) = result {
            if !errors.is_empty() {
                self.0.insert(field.into(), FieldError::Nested(errors));
            }
        }
    }

    /// Converts into a result, `Ok` when nothing failed.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, error)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, error)?;
        }
        write!(f, ".")
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates every element of a list, keying failures by element index.
pub fn validate_each<T: Validate>(items: &[T]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for (i, item) in items.iter().enumerate() {
        errors.nest(i.to_string(), item.validate());
    }
    errors.into_result()
}

/// Fails when the string is empty.
pub fn required(value: &str) -> Option<String> {
    value.is_empty().then(|| MSG_REQUIRED.to_string())
}

/// Fails when a non-empty string is outside the whitelist.
///
/// Empty values pass; combine with [`required`] to reject them.
pub fn one_of(value: &str, allowed: &[&str]) -> Option<String> {
    (!value.is_empty() && !allowed.contains(&value)).then(|| MSG_NOT_IN.to_string())
}

/// Fails when the value is below `min`.
pub fn min<T: PartialOrd + fmt::Display>(value: T, min: T) -> Option<String> {
    (value < min).then(|| format!("must be no less than {}", min))
}

/// Fails when the value is above `max`.
pub fn max<T: PartialOrd + fmt::Display>(value: T, max: T) -> Option<String> {
    (value > max).then(|| format!("must be no greater than {}", max))
}

/// Fails when the length falls outside `min..=max`.
pub fn length(len: usize, min: usize, max: usize) -> Option<String> {
    if len >= min && len <= max {
        return None;
    }
    if min == 0 {
        Some(format!("the length must be no more than {}", max))
    } else {
        Some(format!("the length must be between {} and {}", min, max))
    }
}
