//! Deployment search request types.
//!
//! Deployment documents are flat: attributes have no scope, so these types
//! mirror the device request types minus the `scope` field.

use serde::{Deserialize, Serialize};

use super::search_params::{Operator, Predicate, validate_order, validate_predicate};
use super::value::FilterValue;
use crate::validation::{Validate, ValidationErrors, required};

/// One client filter clause over a flat deployment attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentsFilterPredicate {
    #[serde(default)]
    pub attribute: String,
    #[serde(rename = "type", default)]
    pub operator: String,
    #[serde(default)]
    pub value: FilterValue,
}

impl DeploymentsFilterPredicate {
    pub fn new(
        attribute: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator: operator.as_str().to_string(),
            value: value.into(),
        }
    }
}

impl Predicate for DeploymentsFilterPredicate {
    fn scope(&self) -> &str {
        ""
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

impl Validate for DeploymentsFilterPredicate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_predicate(&mut errors, self);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentsSortCriteria {
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub order: String,
}

impl Validate for DeploymentsSortCriteria {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("attribute", [required(&self.attribute)]);
        validate_order(&mut errors, &self.order);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentsSelectAttribute {
    #[serde(default)]
    pub attribute: String,
}

impl Validate for DeploymentsSelectAttribute {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("attribute", [required(&self.attribute)]);
        errors.into_result()
    }
}

/// A deployment search request.
///
/// `deployment_groups` and `tenant_id` come from the request context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentsSearchParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub per_page: i64,
    #[serde(default)]
    pub filters: Vec<DeploymentsFilterPredicate>,
    #[serde(default)]
    pub sort: Vec<DeploymentsSortCriteria>,
    #[serde(default)]
    pub attributes: Vec<DeploymentsSelectAttribute>,
    #[serde(default)]
    pub device_ids: Vec<String>,
    #[serde(default)]
    pub deployment_ids: Vec<String>,
    #[serde(skip)]
    pub deployment_groups: Vec<String>,
    #[serde(skip)]
    pub tenant_id: String,
}

impl DeploymentsSearchParams {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page,
            per_page,
            ..Default::default()
        }
    }
}

impl Validate for DeploymentsSearchParams {
    fn validate(&self) -> Result<(), ValidationErrors> {
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
