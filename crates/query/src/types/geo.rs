//! Geo filter request types.
//!
//! These serialize verbatim into the `filter` slot of the boolean query, so
//! their JSON shape is the search engine's `geo_distance` /
//! `geo_bounding_box` syntax over the `location` field.

use serde::{Deserialize, Serialize};

use crate::validation::{MSG_NOT_NIL, MSG_REQUIRED, Validate, ValidationErrors, max, min, required};

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "lat")]
    pub latitude: Option<f32>,
    #[serde(rename = "lon")]
    pub longitude: Option<f32>,
}

impl GeoPoint {
    pub fn new(latitude: f32, longitude: f32) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }
}

impl Validate for GeoPoint {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("lat", coordinate(self.latitude, 90.0));
        errors.check("lon", coordinate(self.longitude, 180.0));
        errors.into_result()
    }
}

fn coordinate(value: Option<f32>, bound: f32) -> [Option<String>; 3] {
    match value {
        None => [Some(MSG_NOT_NIL.to_string()), None, None],
        Some(v) => [None, min(v, -bound), max(v, bound)],
    }
}

/// Required nested fields fail with "cannot be blank" when absent or
/// empty.
fn nest_required<T: Validate + Default + PartialEq>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&T>,
) {
    match value {
        Some(value) if *value != T::default() => errors.nest(field, value.validate()),
        _ => errors.add(field, MSG_REQUIRED),
    }
}

/// Matches documents within `distance` of a point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoDistanceFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_distance: Option<GeoDistance>,
}

impl GeoDistanceFilter {
    pub fn new(distance: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            geo_distance: Some(GeoDistance {
                distance: distance.into(),
                location: Some(location),
            }),
        }
    }
}

impl Validate for GeoDistanceFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        nest_required(&mut errors, "geo_distance", self.geo_distance.as_ref());
        errors.into_result()
    }
}

/// Distance (e.g. `"10km"`) around a center point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoDistance {
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl Validate for GeoDistance {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("distance", [required(&self.distance)]);
        nest_required(&mut errors, "location", self.location.as_ref());
        errors.into_result()
    }
}

/// Matches documents inside a rectangle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBoxFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_bounding_box: Option<GeoBoundingBox>,
}

impl GeoBoundingBoxFilter {
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Self {
        Self {
            geo_bounding_box: Some(GeoBoundingBox {
                location: Some(BoundingBox {
                    top_left: Some(top_left),
                    bottom_right: Some(bottom_right),
                }),
            }),
        }
    }
}

impl Validate for GeoBoundingBoxFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        nest_required(&mut errors, "geo_bounding_box", self.geo_bounding_box.as_ref());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<BoundingBox>,
}

impl Validate for GeoBoundingBox {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        nest_required(&mut errors, "location", self.location.as_ref());
        errors.into_result()
    }
}

/// Rectangle given by its top-left and bottom-right corners.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub top_left: Option<GeoPoint>,
    #[serde(default)]
    pub bottom_right: Option<GeoPoint>,
}

impl Validate for BoundingBox {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        nest_required(&mut errors, "top_left", self.top_left.as_ref());
        nest_required(&mut errors, "bottom_right", self.bottom_right.as_ref());
        errors.into_result()
    }
}
