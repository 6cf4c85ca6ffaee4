//! Complete search requests.
//!
//! The `build_*` functions compile what the client asked for. A search
//! request adds what the service enforces on top: the tenant, context
//! groups and the target index, plus paging defaults for requests that
//! leave paging out.

use serde::Serialize;
use tracing::debug;

use crate::config::ReportingConfig;
use crate::error::QueryResult;
use crate::query::{
    Query, QueryPart, TermFilter, TermsFilter, build_aggregations, build_deployments_aggregations,
    build_deployments_query, build_query,
};
use crate::types::{
    AggregateDeploymentsParams, AggregateParams, DeploymentsSearchParams,
    FIELD_NAME_DEPLOYMENT_ID, FIELD_NAME_TENANT_ID, SearchParams,
};
use crate::validation::Validate;

/// First page, used when a request gives none.
pub const FIRST_PAGE: i64 = 1;

/// A query body ready to be sent, with the index it targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub index: String,
    pub body: Query,
}

/// Compiles validated client requests into search requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCompiler {
    devices_index: String,
    deployments_index: String,
    default_per_page: i64,
    max_per_page: i64,
}

impl Default for RequestCompiler {
    fn default() -> Self {
        Self::new(&ReportingConfig::default())
    }
}

impl RequestCompiler {
    pub fn new(config: &ReportingConfig) -> Self {
        Self {
            devices_index: config.devices_index_name.clone(),
            deployments_index: config.deployments_index_name.clone(),
            default_per_page: config.default_per_page,
            max_per_page: config.max_per_page,
        }
    }

    /// Fills in missing paging and caps the page size.
    fn paging(&self, page: i64, per_page: i64) -> (i64, i64) {
        let page = if page <= 0 { FIRST_PAGE } else { page };
        let per_page = if per_page <= 0 {
            self.default_per_page
        } else {
            per_page.min(self.max_per_page)
        };
        (page, per_page)
    }

    /// Compiles a device search.
    pub fn compile_device_search(&self, params: &SearchParams) -> QueryResult<SearchRequest> {
        params.validate()?;

        let (page, per_page) = self.paging(params.page, params.per_page);
        let params = SearchParams {
            page,
            per_page,
            ..params.clone()
        };

        let body = with_tenant(build_query(&params)?, &params.tenant_id);
        debug!(index = %self.devices_index, page, per_page, "Compiled device search");

        Ok(SearchRequest {
            index: self.devices_index.clone(),
            body,
        })
    }

    /// Compiles a device aggregation: the matching devices are not
    /// returned, only the buckets.
    pub fn compile_device_aggregation(
        &self,
        params: &AggregateParams,
    ) -> QueryResult<SearchRequest> {
        params.validate()?;

        let search = SearchParams {
            filters: params.filters.clone(),
            geo_distance_filter: params.geo_distance_filter.clone(),
            geo_bounding_box_filter: params.geo_bounding_box_filter.clone(),
            groups: params.groups.clone(),
            tenant_id: params.tenant_id.clone(),
            ..Default::default()
        };

        let body = with_tenant(build_query(&search)?, &search.tenant_id)
            .with_size(0)
            .with_aggregations(build_aggregations(&params.aggregations));
        debug!(
            index = %self.devices_index,
            aggregations = params.aggregations.len(),
            "Compiled device aggregation"
        );

        Ok(SearchRequest {
            index: self.devices_index.clone(),
            body,
        })
    }

    /// Compiles a deployment search.
    pub fn compile_deployments_search(
        &self,
        params: &DeploymentsSearchParams,
    ) -> QueryResult<SearchRequest> {
        params.validate()?;

        let (page, per_page) = self.paging(params.page, params.per_page);
        let params = DeploymentsSearchParams {
            page,
            per_page,
            ..params.clone()
        };

        let mut body = with_tenant(build_deployments_query(&params)?, &params.tenant_id);
        if !params.deployment_ids.is_empty() {
            body = TermsFilter::new(FIELD_NAME_DEPLOYMENT_ID, params.deployment_ids.clone())
                .add_to(body);
        }
        debug!(index = %self.deployments_index, page, per_page, "Compiled deployments search");

        Ok(SearchRequest {
            index: self.deployments_index.clone(),
            body,
        })
    }

    /// Compiles a deployment aggregation.
    pub fn compile_deployments_aggregation(
        &self,
        params: &AggregateDeploymentsParams,
    ) -> QueryResult<SearchRequest> {
        params.validate()?;

        let search = DeploymentsSearchParams {
            filters: params.filters.clone(),
            deployment_groups: params.deployment_groups.clone(),
            tenant_id: params.tenant_id.clone(),
            ..Default::default()
        };

        let body = with_tenant(build_deployments_query(&search)?, &search.tenant_id)
            .with_size(0)
            .with_aggregations(build_deployments_aggregations(&params.aggregations));
        debug!(
            index = %self.deployments_index,
            aggregations = params.aggregations.len(),
            "Compiled deployments aggregation"
        );

        Ok(SearchRequest {
            index: self.deployments_index.clone(),
            body,
        })
    }
}

/// Restricts a query to one tenant; an empty tenant leaves it unrestricted.
fn with_tenant(query: Query, tenant_id: &str) -> Query {
    if tenant_id.is_empty() {
        return query;
    }
    TermFilter::new(FIELD_NAME_TENANT_ID, tenant_id).add_to(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compiler() -> RequestCompiler {
        RequestCompiler::new(&ReportingConfig::for_testing())
    }

    #[test]
    fn test_paging_defaults_and_cap() {
        let compiler = compiler();
        assert_eq!(compiler.paging(0, 0), (1, 10));
        assert_eq!(compiler.paging(-3, -1), (1, 10));
        assert_eq!(compiler.paging(2, 1000), (2, 100));
        assert_eq!(compiler.paging(4, 25), (4, 25));
    }

    #[test]
    fn test_tenant_term() {
        let params = SearchParams {
            tenant_id: "t1".to_string(),
            ..Default::default()
        };
        let request = compiler().compile_device_search(&params).unwrap();
        assert_eq!(request.index, "test_devices");
        assert_eq!(
            serde_json::to_value(&request.body).unwrap(),
            json!({
                "query": {"bool": {"must": [{"term": {"tenant_id": "t1"}}]}},
                "from": 0,
                "size": 10
            })
        );
    }

    #[test]
    fn test_no_tenant_no_term() {
        let request = compiler()
            .compile_device_search(&SearchParams::default())
            .unwrap();
        assert!(request.body.must_clauses().is_empty());
    }
}
