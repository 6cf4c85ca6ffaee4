//! Sort query part.

use serde_json::json;

use super::{Query, QueryPart};
use crate::types::{AttrVariants, DeploymentsSortCriteria, SORT_ORDER_ASC, SortCriteria};

/// Sorts on an attribute of unknown type.
///
/// Emits one clause on the string field and one on the numeric field, each
/// with an `unmapped_type` so documents lacking one of them still sort.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub variants: AttrVariants,
    pub order: String,
}

impl Sort {
    /// Builds a sort; an empty order means ascending.
    pub fn new(scope: &str, attribute: &str, order: &str) -> Self {
        let order = if order.is_empty() { SORT_ORDER_ASC } else { order };
        Self {
            variants: AttrVariants::new(scope, attribute),
            order: order.to_string(),
        }
    }
}

impl From<&SortCriteria> for Sort {
    fn from(criteria: &SortCriteria) -> Self {
        Sort::new(&criteria.scope, &criteria.attribute, &criteria.order)
    }
}

impl From<&DeploymentsSortCriteria> for Sort {
    fn from(criteria: &DeploymentsSortCriteria) -> Self {
        Sort::new("", &criteria.attribute, &criteria.order)
    }
}

impl QueryPart for Sort {
    fn add_to(&self, query: Query) -> Query {
        query
            .with_sort(json!({
                self.variants.string.as_str(): {
                    "order": self.order,
                    "unmapped_type": "keyword",
                }
            }))
            .with_sort(json!({
                self.variants.number.as_str(): {
                    "order": self.order,
                    "unmapped_type": "double",
                }
            }))
    }
}
