//! Filter predicate operands.
//!
//! Clients send operands as loosely typed JSON: a string, number, boolean,
//! or a homogeneous array of those. [`FilterValue`] classifies the operand
//! once, when it is decoded, so the filter factory can match on the variant
//! instead of re-inspecting raw JSON.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use super::attribute::Type;
use crate::error::FilterError;

/// A classified predicate operand.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Number(Number),
    Boolean(bool),
    StringArray(Vec<String>),
    NumberArray(Vec<Number>),
    BooleanArray(Vec<bool>),
    /// Anything else: null, objects, nested or mixed arrays.
    Invalid(Value),
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Invalid(Value::Null)
    }
}

impl FilterValue {
    /// Returns true when the operand is missing or JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Invalid(Value::Null))
    }

    /// Returns the operand's type and whether it is an array.
    ///
    /// An array's element type is set by its first element; an empty array
    /// counts as a string array.
    pub fn value_type(&self) -> Result<(Type, bool), FilterError> {
        match self {
            FilterValue::String(_) => Ok((Type::String, false)),
            FilterValue::Number(_) => Ok((Type::Number, false)),
            FilterValue::Boolean(_) => Ok((Type::Boolean, false)),
            FilterValue::StringArray(_) => Ok((Type::String, true)),
            FilterValue::NumberArray(_) => Ok((Type::Number, true)),
            FilterValue::BooleanArray(_) => Ok((Type::Boolean, true)),
            FilterValue::Invalid(value) => Err(unknown_value_type(offending(value))),
        }
    }

    /// Returns the boolean operand, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FilterValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts the operand back into JSON, unchanged.
    pub fn to_value(&self) -> Value {
        match self {
            FilterValue::String(s) => Value::String(s.clone()),
            FilterValue::Number(n) => Value::Number(n.clone()),
            FilterValue::Boolean(b) => Value::Bool(*b),
            FilterValue::StringArray(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FilterValue::NumberArray(items) => {
                Value::Array(items.iter().cloned().map(Value::Number).collect())
            }
            FilterValue::BooleanArray(items) => {
                Value::Array(items.iter().copied().map(Value::Bool).collect())
            }
            FilterValue::Invalid(value) => value.clone(),
        }
    }
}

/// For arrays, the element that broke classification; otherwise the value.
fn offending(value: &Value) -> &Value {
    let Value::Array(items) = value else {
        return value;
    };
    let Some(first) = items.first() else {
        return value;
    };
    let expected = std::mem::discriminant(first);
    items
        .iter()
        .find(|item| !is_scalar(item) || std::mem::discriminant(*item) != expected)
        .unwrap_or(first)
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn unknown_value_type(value: &Value) -> FilterError {
    let (repr, type_name) = match value {
        Value::Null => ("<nil>".to_string(), "<nil>"),
        Value::Bool(b) => (b.to_string(), "bool"),
        Value::Number(n) => (n.to_string(), "number"),
        Value::String(s) => (s.clone(), "string"),
        Value::Array(_) => (value.to_string(), "array"),
        Value::Object(_) => (value.to_string(), "object"),
    };
    FilterError::UnknownValueType {
        value: repr,
        type_name: type_name.to_string(),
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => FilterValue::String(s),
            Value::Number(n) => FilterValue::Number(n),
            Value::Bool(b) => FilterValue::Boolean(b),
            Value::Array(items) => classify_array(items),
            other => FilterValue::Invalid(other),
        }
    }
}

fn classify_array(items: Vec<Value>) -> FilterValue {
    match items.first() {
        None => FilterValue::StringArray(Vec::new()),
        Some(Value::String(_)) => {
            let strings: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            strings
                .map(FilterValue::StringArray)
                .unwrap_or(FilterValue::Invalid(Value::Array(items)))
        }
        Some(Value::Number(_)) => {
            let numbers: Option<Vec<Number>> = items
                .iter()
                .map(|item| match item {
                    Value::Number(n) => Some(n.clone()),
                    _ => None,
                })
                .collect();
            numbers
                .map(FilterValue::NumberArray)
                .unwrap_or(FilterValue::Invalid(Value::Array(items)))
        }
        Some(Value::Bool(_)) => {
            let bools: Option<Vec<bool>> = items.iter().map(Value::as_bool).collect();
            bools
                .map(FilterValue::BooleanArray)
                .unwrap_or(FilterValue::Invalid(Value::Array(items)))
        }
        Some(_) => FilterValue::Invalid(Value::Array(items)),
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Boolean(b)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        FilterValue::Number(n.into())
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n.into())
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n)
            .map(FilterValue::Number)
            .unwrap_or(FilterValue::Invalid(Value::Null))
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        FilterValue::StringArray(items)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(items: Vec<&str>) -> Self {
        FilterValue::StringArray(items.into_iter().map(str::to_string).collect())
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(FilterValue::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(value: Value) -> Result<(Type, bool), FilterError> {
        FilterValue::from(value).value_type()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(classify(json!("a")).unwrap(), (Type::String, false));
        assert_eq!(classify(json!(1.0)).unwrap(), (Type::Number, false));
        assert_eq!(classify(json!(7)).unwrap(), (Type::Number, false));
        assert_eq!(classify(json!(true)).unwrap(), (Type::Boolean, false));
    }

    #[test]
    fn test_arrays() {
        assert_eq!(classify(json!(["a"])).unwrap(), (Type::String, true));
        assert_eq!(classify(json!([1.0, 2])).unwrap(), (Type::Number, true));
        assert_eq!(classify(json!([true])).unwrap(), (Type::Boolean, true));
        assert_eq!(classify(json!([])).unwrap(), (Type::String, true));
    }

    #[test]
    fn test_null() {
        let err = classify(Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "unknown attribute value type: <nil> <nil>");
    }

    #[test]
    fn test_null_in_array() {
        let err = classify(json!([null])).unwrap_err();
        assert_eq!(err.to_string(), "unknown attribute value type: <nil> <nil>");
    }

    #[test]
    fn test_mixed_array_reports_offending_element() {
        let err = classify(json!(["a", 1])).unwrap_err();
        assert_eq!(err.to_string(), "unknown attribute value type: 1 number");
    }

    #[test]
    fn test_object() {
        let err = classify(json!({"a": 1})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown attribute value type: {\"a\":1} object"
        );
    }

    #[test]
    fn test_value_is_passed_through() {
        for value in [json!("a"), json!(1.5), json!(false), json!(["a", "b"]), json!([1, 2])] {
            assert_eq!(FilterValue::from(value.clone()).to_value(), value);
        }
    }

    #[test]
    fn test_missing_value_defaults_to_null() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default)]
            value: FilterValue,
        }
        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert!(holder.value.is_null());
    }
}
