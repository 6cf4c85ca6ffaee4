//! Field projection query part.

use super::{Query, QueryPart};
use crate::types::{
    AttrVariants, DeploymentsSelectAttribute, FIELD_NAME_CHECK_IN, FIELD_NAME_ID, SelectAttribute,
};

/// Projects the requested attributes, under all three types each.
///
/// The device identifier and check-in time are always included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub fields: Vec<String>,
}

impl Select {
    pub fn new<'a>(attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut fields: Vec<String> = attributes
            .into_iter()
            .flat_map(|(scope, attribute)| {
                let AttrVariants {
                    string,
                    number,
                    boolean,
                } = AttrVariants::new(scope, attribute);
                [string, number, boolean]
            })
            .collect();
        fields.push(FIELD_NAME_ID.to_string());
        fields.push(FIELD_NAME_CHECK_IN.to_string());
        Self { fields }
    }

    pub fn from_attributes(attributes: &[SelectAttribute]) -> Self {
        Self::new(
            attributes
                .iter()
                .map(|a| (a.scope.as_str(), a.attribute.as_str())),
        )
    }

    /// Flat attributes keep the uniform shape: their one name, three times.
    pub fn from_deployments_attributes(attributes: &[DeploymentsSelectAttribute]) -> Self {
        Self::new(attributes.iter().map(|a| ("", a.attribute.as_str())))
    }
}

impl QueryPart for Select {
    fn add_to(&self, query: Query) -> Query {
        query.with_projection(self.fields.clone())
    }
}
