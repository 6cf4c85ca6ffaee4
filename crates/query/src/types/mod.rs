//! Request types for the reporting query compiler.
//!
//! Device requests address attributes by `(scope, attribute)`; deployment
//! requests use flat attribute names. Both decode from the JSON bodies the
//! reporting API accepts and validate with [`Validate`](crate::Validate).

pub mod aggregation;
pub mod attribute;
pub mod deployments;
pub mod geo;
pub mod search_params;
pub mod value;

pub use aggregation::{
    AggregateDeploymentsParams, AggregateParams, AggregationNode, AggregationTerm,
    DEFAULT_AGGREGATION_LIMIT, DeploymentsAggregationTerm, MAX_AGGREGATION_TERMS,
    MAX_NESTED_AGGREGATIONS, check_max_nested,
};
pub use attribute::{
    ATTR_DEVICE_ID, ATTR_NAME_GROUP, AttrVariants, DOT_REPLACEMENT, FIELD_NAME_CHECK_IN,
    FIELD_NAME_DEPLOYMENT_GROUPS, FIELD_NAME_DEPLOYMENT_ID, FIELD_NAME_DEVICE_ID, FIELD_NAME_ID,
    FIELD_NAME_LOCATION, FIELD_NAME_TENANT_ID, SCOPE_IDENTITY, SCOPE_INVENTORY, SCOPE_MONITOR,
    SCOPE_SYSTEM, SCOPE_TAGS, SCOPES, Type, TypePolicy, dedot, parse_attr, redot, special_attr,
    to_attr,
};
pub use deployments::{
    DeploymentsFilterPredicate, DeploymentsSearchParams, DeploymentsSelectAttribute,
    DeploymentsSortCriteria,
};
pub use geo::{
    BoundingBox, GeoBoundingBox, GeoBoundingBoxFilter, GeoDistance, GeoDistanceFilter, GeoPoint,
};
pub use search_params::{
    DEFAULT_PAGE, DEFAULT_PER_PAGE, FilterPredicate, Operator, Predicate, SORT_ORDER_ASC,
    SORT_ORDER_DESC, SearchParams, SelectAttribute, SortCriteria, VALID_SORT_ORDERS,
};
pub use value::FilterValue;
