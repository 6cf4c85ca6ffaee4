//! Geo filter query part.

use super::{Query, QueryPart};
use crate::types::{GeoBoundingBoxFilter, GeoDistanceFilter};

/// Places the request's geo filters into the boolean `filter` slot.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFilters {
    pub distance: Option<GeoDistanceFilter>,
    pub bounding_box: Option<GeoBoundingBoxFilter>,
}

impl GeoFilters {
    pub fn new(
        distance: Option<&GeoDistanceFilter>,
        bounding_box: Option<&GeoBoundingBoxFilter>,
    ) -> Self {
        Self {
            distance: distance.cloned(),
            bounding_box: bounding_box.cloned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_none() && self.bounding_box.is_none()
    }
}

impl QueryPart for GeoFilters {
    fn add_to(&self, query: Query) -> Query {
        query.with_geo_filters(self.distance.clone(), self.bounding_box.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;
    use serde_json::json;

    #[test]
    fn test_bounding_box_filter() {
        let bounding_box =
            GeoBoundingBoxFilter::new(GeoPoint::new(10.0, -10.0), GeoPoint::new(-10.0, 10.0));
        let filters = GeoFilters::new(None, Some(&bounding_box));
        assert!(!filters.is_empty());

        let body = serde_json::to_value(filters.add_to(Query::new())).unwrap();
        assert_eq!(
            body["query"]["bool"]["filter"],
            json!({"geo_bounding_box": {"location": {
                "top_left": {"lat": 10.0, "lon": -10.0},
                "bottom_right": {"lat": -10.0, "lon": 10.0}
            }}})
        );
    }

    #[test]
    fn test_empty() {
        assert!(GeoFilters::new(None, None).is_empty());
    }
}
