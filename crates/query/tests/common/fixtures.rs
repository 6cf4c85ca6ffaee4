//! Request fixtures.

use serde_json::Value;

use reporting_query::types::{
    AggregationTerm, DeploymentsAggregationTerm, FilterPredicate, GeoBoundingBoxFilter,
    GeoDistanceFilter, GeoPoint, SearchParams,
};
use reporting_query::{ReportingConfig, RequestCompiler, build_query};

/// A device search on the first page with the given filters.
pub fn device_search(filters: Vec<FilterPredicate>) -> SearchParams {
    SearchParams {
        filters,
        ..SearchParams::new(1, 20)
    }
}

/// Builds a device query and returns its JSON body.
pub fn compile(params: &SearchParams) -> Value {
    let query = build_query(params).expect("query should build");
    serde_json::to_value(&query).expect("query should serialize")
}

/// A request compiler over the test configuration.
pub fn test_compiler() -> RequestCompiler {
    RequestCompiler::new(&ReportingConfig::for_testing())
}

/// A 10km distance filter around a point.
pub fn distance_filter(lat: f32, lon: f32) -> GeoDistanceFilter {
    GeoDistanceFilter::new("10km", GeoPoint::new(lat, lon))
}

/// A bounding box filter between two corners.
pub fn bounding_box_filter(top_left: (f32, f32), bottom_right: (f32, f32)) -> GeoBoundingBoxFilter {
    GeoBoundingBoxFilter::new(
        GeoPoint::new(top_left.0, top_left.1),
        GeoPoint::new(bottom_right.0, bottom_right.1),
    )
}

/// A term with `levels` single-child levels nested below it.
pub fn nested_chain(levels: usize) -> AggregationTerm {
    (0..levels).fold(
        AggregationTerm::new("leaf", "inventory", "device_type"),
        |child, level| {
            AggregationTerm::new(format!("level_{}", level), "inventory", "device_type")
                .with_aggregation(child)
        },
    )
}

/// Deployment term with `levels` single-child levels nested below it.
pub fn nested_deployments_chain(levels: usize) -> DeploymentsAggregationTerm {
    (0..levels).fold(
        DeploymentsAggregationTerm::new("leaf", "device_status"),
        |child, level| {
            DeploymentsAggregationTerm::new(format!("level_{}", level), "device_status")
                .with_aggregation(child)
        },
    )
}
