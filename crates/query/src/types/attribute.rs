//! Attribute types and the flattened field-naming scheme.
//!
//! Device attributes carry no fixed type: the same attribute may hold a
//! string on one device and a number on another. The search index stores
//! each attribute under a type-suffixed field name,
//! `<scope>_<name>_<str|num|bool>`, and every filter, sort and selection has
//! to pick (or fan out across) one of those variants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Scope of attributes reported by the device identity.
pub const SCOPE_IDENTITY: &str = "identity";
/// Scope of attributes reported by the device inventory.
pub const SCOPE_INVENTORY: &str = "inventory";
/// Scope of attributes reported by device monitoring.
pub const SCOPE_MONITOR: &str = "monitor";
/// Scope of attributes maintained by the system (groups, timestamps).
pub const SCOPE_SYSTEM: &str = "system";
/// Scope of user-defined tags.
pub const SCOPE_TAGS: &str = "tags";

/// All known attribute scopes.
pub const SCOPES: [&str; 5] = [
    SCOPE_IDENTITY,
    SCOPE_INVENTORY,
    SCOPE_MONITOR,
    SCOPE_SYSTEM,
    SCOPE_TAGS,
];

/// System attribute holding the device group.
pub const ATTR_NAME_GROUP: &str = "group";

/// Device identifier field.
pub const FIELD_NAME_ID: &str = "id";
/// Tenant identifier field.
pub const FIELD_NAME_TENANT_ID: &str = "tenant_id";
/// Device geo location field.
pub const FIELD_NAME_LOCATION: &str = "location";
/// Last check-in time field.
pub const FIELD_NAME_CHECK_IN: &str = "check_in_time";
/// Device identifier field of deployment documents.
pub const FIELD_NAME_DEVICE_ID: &str = "device_id";
/// Deployment identifier field of deployment documents.
pub const FIELD_NAME_DEPLOYMENT_ID: &str = "deployment_id";
/// Target groups field of deployment documents.
pub const FIELD_NAME_DEPLOYMENT_GROUPS: &str = "deployment_groups";

/// Attribute name clients use to address the device identifier.
pub const ATTR_DEVICE_ID: &str = "id";

/// Substitute for `.` in attribute names, which the index would read as a
/// path separator.
pub const DOT_REPLACEMENT: &str = r"\\";

/// The disambiguated kind of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    String,
    Number,
    Boolean,
}

impl Type {
    /// All value types, in fan-out order.
    pub const ALL: [Type; 3] = [Type::String, Type::Number, Type::Boolean];

    /// Returns the field-name suffix for this type.
    pub fn suffix(&self) -> &'static str {
        match self {
            Type::String => "str",
            Type::Number => "num",
            Type::Boolean => "bool",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl FromStr for Type {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" => Ok(Type::String),
            "num" => Ok(Type::Number),
            "bool" => Ok(Type::Boolean),
            _ => Err(format!("unknown attribute type: {}", s)),
        }
    }
}

/// Which value types an operator accepts.
///
/// `Any` bypasses the type check; it never tags data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePolicy {
    Any,
    Only(Type),
}

impl TypePolicy {
    /// Returns true if a value of `typ` passes this policy.
    pub fn accepts(&self, typ: Type) -> bool {
        match self {
            TypePolicy::Any => true,
            TypePolicy::Only(required) => *required == typ,
        }
    }
}

/// Replaces characters the index reads as path separators.
pub fn dedot(name: &str) -> String {
    name.replace('.', DOT_REPLACEMENT)
}

/// Undoes [`dedot`].
pub fn redot(name: &str) -> String {
    name.replace(DOT_REPLACEMENT, ".")
}

/// Maps `(scope, name, type)` to its flattened field name.
///
/// Unscoped names (deployment attributes, special fields) are only
/// dedotted.
///
/// ```
/// use reporting_query::types::{Type, to_attr};
///
/// assert_eq!(to_attr("identity", "mac", Type::String), "identity_mac_str");
/// assert_eq!(to_attr("", "mac", Type::String), "mac");
/// ```
pub fn to_attr(scope: &str, name: &str, typ: Type) -> String {
    if scope.is_empty() {
        return dedot(name);
    }
    format!("{}_{}_{}", scope, dedot(name), typ.suffix())
}

/// Resolves attributes that live in fixed, unscoped fields.
///
/// Returns `None` for regular scoped attributes.
pub fn special_attr(name: &str) -> Option<&'static str> {
    match name {
        ATTR_DEVICE_ID => Some(FIELD_NAME_ID),
        _ => None,
    }
}

/// Recovers `(scope, name)` from a type-suffixed field name.
///
/// Fields outside the known scopes or without a type suffix yield `None`.
pub fn parse_attr(field: &str) -> Option<(&'static str, String)> {
    let scope = SCOPES
        .iter()
        .find(|scope| field.starts_with(&format!("{}_", scope)))?;
    let rest = &field[scope.len() + 1..];
    let (name, suffix) = rest.rsplit_once('_')?;
    if name.is_empty() {
        return None;
    }
    suffix.parse::<Type>().ok()?;
    Some((*scope, redot(name)))
}

/// The three type-suffixed field names of one attribute.
///
/// Used wherever an attribute of unknown type has to be addressed under
/// every type at once: existence checks, sorting and projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrVariants {
    pub string: String,
    pub number: String,
    pub boolean: String,
}

impl AttrVariants {
    /// Builds the variants for a scoped (or, with an empty scope, flat)
    /// attribute.
    pub fn new(scope: &str, name: &str) -> Self {
        let [string, number, boolean] = Type::ALL.map(|typ| to_attr(scope, name, typ));
        Self {
            string,
            number,
            boolean,
        }
    }

    /// Returns the names in fan-out order: string, number, boolean.
    pub fn to_array(&self) -> [&str; 3] {
        [&self.string, &self.number, &self.boolean]
    }
}
