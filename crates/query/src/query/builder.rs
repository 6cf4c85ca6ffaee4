//! Search request to query compilation.
//!
//! Parts are applied in a fixed order, which is observable in the order of
//! the emitted `must` clauses:
//!
//! 1. client filters
//! 2. group membership
//! 3. sort criteria
//! 4. paging
//! 5. field projection
//! 6. device IDs
//! 7. geo filters (devices only)
//!
//! The first failing part aborts the build.

use tracing::debug;

use super::filters::{FilterIn, TermsFilter, filter_part};
use super::geo::GeoFilters;
use super::select::Select;
use super::sort::Sort;
use super::{Query, QueryPart};
use crate::error::QueryResult;
use crate::types::{
    ATTR_NAME_GROUP, DeploymentsSearchParams, FIELD_NAME_DEPLOYMENT_GROUPS, FIELD_NAME_DEVICE_ID,
    FIELD_NAME_ID, FilterPredicate, Operator, SCOPE_SYSTEM, SearchParams,
};

/// Compiles a device search request into a query.
pub fn build_query(params: &SearchParams) -> QueryResult<Query> {
    debug!(
        filters = params.filters.len(),
        groups = params.groups.len(),
        sort = params.sort.len(),
        attributes = params.attributes.len(),
        device_ids = params.device_ids.len(),
        "Building device query"
    );

    let mut query = Query::new();

    for predicate in &params.filters {
        query = filter_part(predicate)?.add_to(query);
    }

    if !params.groups.is_empty() {
        let predicate = FilterPredicate::new(
            SCOPE_SYSTEM,
            ATTR_NAME_GROUP,
            Operator::In,
            params.groups.clone(),
        );
        query = FilterIn::new(&predicate)?.add_to(query);
    }

    for criteria in &params.sort {
        query = Sort::from(criteria).add_to(query);
    }

    query = query.with_page(params.page, params.per_page);

    if !params.attributes.is_empty() {
        query = Select::from_attributes(&params.attributes).add_to(query);
    }

    if !params.device_ids.is_empty() {
        query = TermsFilter::new(FIELD_NAME_ID, params.device_ids.clone()).add_to(query);
    }

    let geo = GeoFilters::new(
        params.geo_distance_filter.as_ref(),
        params.geo_bounding_box_filter.as_ref(),
    );
    if !geo.is_empty() {
        query = geo.add_to(query);
    }

    Ok(query)
}

/// Compiles a deployment search request into a query.
///
/// Deployment documents are flat and carry no location, so groups match
/// the deployment's target groups and there is no geo step.
pub fn build_deployments_query(params: &DeploymentsSearchParams) -> QueryResult<Query> {
    debug!(
        filters = params.filters.len(),
        deployment_groups = params.deployment_groups.len(),
        sort = params.sort.len(),
        attributes = params.attributes.len(),
        device_ids = params.device_ids.len(),
        "Building deployments query"
    );

    let mut query = Query::new();

    for predicate in &params.filters {
        query = filter_part(predicate)?.add_to(query);
    }

    if !params.deployment_groups.is_empty() {
        query = TermsFilter::new(
            FIELD_NAME_DEPLOYMENT_GROUPS,
            params.deployment_groups.clone(),
        )
        .add_to(query);
    }

    for criteria in &params.sort {
        query = Sort::from(criteria).add_to(query);
    }

    query = query.with_page(params.page, params.per_page);

    if !params.attributes.is_empty() {
        query = Select::from_deployments_attributes(&params.attributes).add_to(query);
    }

    if !params.device_ids.is_empty() {
        query = TermsFilter::new(FIELD_NAME_DEVICE_ID, params.device_ids.clone()).add_to(query);
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FilterError, QueryError};
    use serde_json::json;

    #[test]
    fn test_empty_params() {
        let query = build_query(&SearchParams::new(0, 20)).unwrap();
        assert_eq!(
            serde_json::to_string(&query).unwrap(),
            r#"{"query":{"bool":{}},"from":-20,"size":20}"#
        );
    }

    #[test]
    fn test_groups_filter() {
        let params = SearchParams {
            groups: vec!["g1".to_string(), "g2".to_string()],
            ..SearchParams::new(1, 20)
        };
        let query = build_query(&params).unwrap();
        assert_eq!(
            query.must_clauses(),
            &[json!({"terms": {"system_group_str": ["g1", "g2"]}})]
        );
    }

    #[test]
    fn test_filter_error_aborts_build() {
        let params = SearchParams {
            filters: vec![FilterPredicate::new("identity", "mac", Operator::In, "a")],
            ..SearchParams::new(1, 20)
        };
        assert_eq!(
            build_query(&params).unwrap_err(),
            QueryError::Filter(FilterError::ArrayRequired)
        );
    }

    #[test]
    fn test_deployments_groups_and_devices() {
        let params = DeploymentsSearchParams {
            deployment_groups: vec!["prod".to_string()],
            device_ids: vec!["d1".to_string()],
            ..DeploymentsSearchParams::new(1, 10)
        };
        let query = build_deployments_query(&params).unwrap();
        assert_eq!(
            query.must_clauses(),
            &[
                json!({"terms": {"deployment_groups": ["prod"]}}),
                json!({"terms": {"device_id": ["d1"]}}),
            ]
        );
        assert_eq!(query.from(), 0);
        assert_eq!(query.size(), 10);
    }
}
