//! Search engine query documents.
//!
//! [`Query`] accumulates the pieces of a boolean query. Each piece of client
//! input is turned into a [`QueryPart`] that knows where in the query it
//! belongs, and parts are applied in a fixed order by the builders in
//! [`builder`]. Serializing a query produces the request body:
//!
//! ```text
//! {
//!   "query": {"bool": {"must": [...], "must_not": [...], "filter": {...}}},
//!   "sort": [...],
//!   "from": 0,
//!   "size": 20,
//!   "fields": [...], "_source": false,
//!   "aggs": {...}
//! }
//! ```
//!
//! Empty `must`/`must_not`/`sort` lists are left out; `from` and `size` are
//! always present.

pub mod aggregations;
pub mod builder;
pub mod filters;
pub mod geo;
pub mod select;
pub mod sort;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::types::{DEFAULT_PAGE, DEFAULT_PER_PAGE, GeoBoundingBoxFilter, GeoDistanceFilter};

pub use aggregations::{
    Aggregation, Aggregations, TermsAggregation, build_aggregations,
    build_deployments_aggregations,
};
pub use builder::{build_deployments_query, build_query};
pub use filters::{
    ArrayPolicy, Filter, FilterEq, FilterExists, FilterIn, FilterNe, FilterNin, FilterRange,
    FilterRegex, RangeOp, TermFilter, TermsFilter, filter_part,
};
pub use geo::GeoFilters;
pub use select::Select;
pub use sort::Sort;

/// A piece of query logic that knows where it goes in a [`Query`].
pub trait QueryPart {
    fn add_to(&self, query: Query) -> Query;
}

/// An explicit field projection: only `fields` are returned, no `_source`.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub fields: Vec<String>,
}

/// Boolean query accumulator.
///
/// Parts can only be added; nothing added can be removed again.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    must: Vec<Value>,
    must_not: Vec<Value>,
    sort: Vec<Value>,
    geo_distance_filter: Option<GeoDistanceFilter>,
    geo_bounding_box_filter: Option<GeoBoundingBoxFilter>,
    from: i64,
    size: i64,
    projection: Option<Projection>,
    aggregations: Option<Aggregations>,
    extra: Vec<(String, Value)>,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    /// Creates an empty query on the default page.
    pub fn new() -> Self {
        Self {
            must: Vec::new(),
            must_not: Vec::new(),
            sort: Vec::new(),
            geo_distance_filter: None,
            geo_bounding_box_filter: None,
            from: page_offset(DEFAULT_PAGE, DEFAULT_PER_PAGE),
            size: DEFAULT_PER_PAGE,
            projection: None,
            aggregations: None,
            extra: Vec::new(),
        }
    }

    /// Adds a clause documents must match.
    pub fn must(mut self, condition: Value) -> Self {
        self.must.push(condition);
        self
    }

    /// Adds a clause documents must not match.
    pub fn must_not(mut self, condition: Value) -> Self {
        self.must_not.push(condition);
        self
    }

    /// Adds a sort clause after the existing ones.
    pub fn with_sort(mut self, sort: Value) -> Self {
        self.sort.push(sort);
        self
    }

    /// Sets `from = (page - 1) * per_page` and `size = per_page`.
    ///
    /// Pages are 1-based. Page 0 or below yields a negative `from`; the
    /// caller is expected to have rejected those.
    pub fn with_page(mut self, page: i64, per_page: i64) -> Self {
        self.from = page_offset(page, per_page);
        self.size = per_page;
        self
    }

    /// Overrides `size` only.
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    /// Sets the geo filters. A distance filter takes precedence over a
    /// bounding box when both are set.
    pub fn with_geo_filters(
        mut self,
        distance: Option<GeoDistanceFilter>,
        bounding_box: Option<GeoBoundingBoxFilter>,
    ) -> Self {
        self.geo_distance_filter = distance;
        self.geo_bounding_box_filter = bounding_box;
        self
    }

    /// Replaces the field projection.
    pub fn with_projection(mut self, fields: Vec<String>) -> Self {
        self.projection = Some(Projection { fields });
        self
    }

    /// Replaces the aggregations.
    pub fn with_aggregations(mut self, aggregations: Aggregations) -> Self {
        self.aggregations = Some(aggregations);
        self
    }

    /// Adds a top-level key to the document.
    ///
    /// A later call with the same key overwrites the earlier value in place.
    /// A key the query emits itself (`query`, `sort`, `from`, `size`,
    /// `fields`, `_source`, `aggs`) takes the extra value, keeping its
    /// position in the document.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.extra.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.extra.push((key, value)),
        }
        self
    }

    pub fn must_clauses(&self) -> &[Value] {
        &self.must
    }

    pub fn must_not_clauses(&self) -> &[Value] {
        &self.must_not
    }

    pub fn sort_clauses(&self) -> &[Value] {
        &self.sort
    }

    pub fn from(&self) -> i64 {
        self.from
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn aggregations(&self) -> Option<&Aggregations> {
        self.aggregations.as_ref()
    }

    /// Returns the geo filter that goes into the `filter` slot.
    fn geo_filter(&self) -> Option<GeoFilterRef<'_>> {
        match (&self.geo_distance_filter, &self.geo_bounding_box_filter) {
            (Some(distance), _) => Some(GeoFilterRef::Distance(distance)),
            (None, Some(bounding_box)) => Some(GeoFilterRef::BoundingBox(bounding_box)),
            (None, None) => None,
        }
    }

    fn extra_value(&self, key: &str) -> Option<&Value> {
        self.extra.iter().find(|(k, _)| k == key).map(|(_, value)| value)
    }

    /// Writes `key`, letting an extra value with the same key win.
    fn entry<M, T>(&self, map: &mut M, key: &str, value: &T) -> Result<(), M::Error>
    where
        M: SerializeMap,
        T: Serialize + ?Sized,
    {
        match self.extra_value(key) {
            Some(extra) => map.serialize_entry(key, extra),
            None => map.serialize_entry(key, value),
        }
    }

    /// Returns true if the document already carries `key`.
    fn emits(&self, key: &str) -> bool {
        match key {
            "query" | "from" | "size" => true,
            "sort" => !self.sort.is_empty(),
            "fields" | "_source" => self.projection.is_some(),
            "aggs" => self.aggregations.is_some(),
            _ => false,
        }
    }
}

fn page_offset(page: i64, per_page: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeoFilterRef<'a> {
    Distance(&'a GeoDistanceFilter),
    BoundingBox(&'a GeoBoundingBoxFilter),
}

fn no_clauses(clauses: &&[Value]) -> bool {
    clauses.is_empty()
}

#[derive(Serialize)]
struct BoolQuery<'a> {
    #[serde(skip_serializing_if = "no_clauses")]
    must: &'a [Value],
    #[serde(skip_serializing_if = "no_clauses")]
    must_not: &'a [Value],
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<GeoFilterRef<'a>>,
}

#[derive(Serialize)]
struct QueryClause<'a> {
    bool: BoolQuery<'a>,
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.entry(
            &mut map,
            "query",
            &QueryClause {
                bool: BoolQuery {
                    must: &self.must,
                    must_not: &self.must_not,
                    filter: self.geo_filter(),
                },
            },
        )?;
        if !self.sort.is_empty() {
            self.entry(&mut map, "sort", &self.sort)?;
        }
        self.entry(&mut map, "from", &self.from)?;
        self.entry(&mut map, "size", &self.size)?;
        if let Some(projection) = &self.projection {
            self.entry(&mut map, "fields", &projection.fields)?;
            self.entry(&mut map, "_source", &false)?;
        }
        if let Some(aggregations) = &self.aggregations {
            self.entry(&mut map, "aggs", aggregations)?;
        }
        for (key, value) in &self.extra {
            if !self.emits(key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;
    use serde_json::json;

    #[test]
    fn test_empty_query() {
        let query = Query::new();
        assert_eq!(
            serde_json::to_string(&query).unwrap(),
            r#"{"query":{"bool":{}},"from":-20,"size":20}"#
        );
    }

    #[test]
    fn test_clause_order_preserved() {
        let query = Query::new()
            .must(json!({"a": 1}))
            .must_not(json!({"b": 2}))
            .must(json!({"c": 3}))
            .with_sort(json!({"d": "asc"}));
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "query": {"bool": {
                    "must": [{"a": 1}, {"c": 3}],
                    "must_not": [{"b": 2}]
                }},
                "sort": [{"d": "asc"}],
                "from": -20,
                "size": 20
            })
        );
    }

    #[test]
    fn test_paging() {
        let query = Query::new().with_page(3, 10);
        assert_eq!(query.from(), 20);
        assert_eq!(query.size(), 10);

        let query = Query::new().with_page(0, 20);
        assert_eq!(query.from(), -20);

        let query = Query::new().with_page(2, 50).with_size(0);
        assert_eq!(query.from(), 50);
        assert_eq!(query.size(), 0);
    }

    #[test]
    fn test_paging_saturates() {
        let query = Query::new().with_page(i64::MIN, 2);
        assert_eq!(query.from(), i64::MIN);
    }

    #[test]
    fn test_distance_wins_over_bounding_box() {
        let distance = GeoDistanceFilter::new("5km", GeoPoint::new(1.0, 2.0));
        let bounding_box =
            GeoBoundingBoxFilter::new(GeoPoint::new(3.0, 4.0), GeoPoint::new(1.0, 5.0));
        let query = Query::new().with_geo_filters(Some(distance), Some(bounding_box.clone()));
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["query"]["bool"]["filter"]["geo_distance"]["distance"], "5km");
        assert!(body["query"]["bool"]["filter"].get("geo_bounding_box").is_none());

        let query = Query::new().with_geo_filters(None, Some(bounding_box));
        let body = serde_json::to_value(&query).unwrap();
        assert!(body["query"]["bool"]["filter"].get("geo_bounding_box").is_some());
    }

    #[test]
    fn test_extra_keys_merge_in_order() {
        let query = Query::new()
            .with("track_total_hits", true)
            .with("timeout", "1s")
            .with("track_total_hits", false);
        assert_eq!(
            serde_json::to_string(&query).unwrap(),
            r#"{"query":{"bool":{}},"from":-20,"size":20,"track_total_hits":false,"timeout":"1s"}"#
        );
    }

    #[test]
    fn test_extra_keys_override_emitted_keys() {
        let query = Query::new().with("size", 0).with("_source", true);
        assert_eq!(
            serde_json::to_string(&query).unwrap(),
            r#"{"query":{"bool":{}},"from":-20,"size":0,"_source":true}"#
        );
    }

    #[test]
    fn test_extra_keys_override_projection_in_place() {
        let query = Query::new()
            .with_projection(vec!["id".to_string()])
            .with("_source", true)
            .with("size", 99)
            .with("size", 5);
        assert_eq!(
            serde_json::to_string(&query).unwrap(),
            r#"{"query":{"bool":{}},"from":-20,"size":5,"fields":["id"],"_source":true}"#
        );
    }
}
