//! Typed GeoJSON export structures.
//!
//! Every exported entity has an explicit serializer type; nothing relies on
//! runtime introspection. Coordinate order follows the GeoJSON spec:
//! `[lng, lat]`, with altitude as an optional third element.

use chrono::{DateTime, Utc};
use geo::Polygon;
use serde::{Deserialize, Serialize};

use crate::query::QueryBox;
use crate::tracks::GridCellTrack;
use crate::volume::Radius;

/// GeoJSON geometry, internally tagged on `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: Vec<f64> },
    LineString { coordinates: Vec<Vec<f64>> },
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature<P> {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub properties: P,
    pub geometry: GeoJsonGeometry,
}

impl<P> Feature<P> {
    pub fn new(properties: P, geometry: GeoJsonGeometry) -> Self {
        Self {
            feature_type: "Feature".to_string(),
            properties,
            geometry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            collection_type: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// Properties attached to an exported circular track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackProperties {
    pub radius: Radius,
}

/// Properties attached to an exported query box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryBoxProperties {
    pub timestamp_before: DateTime<Utc>,
    pub timestamp_after: DateTime<Utc>,
}

fn polygon_coordinates(polygon: &Polygon<f64>) -> Vec<Vec<Vec<f64>>> {
    let ring = polygon
        .exterior()
        .coords()
        .map(|c| vec![c.x, c.y])
        .collect();
    vec![ring]
}

/// One circular track as a Polygon feature carrying its buffer radius.
pub fn track_feature(cell_track: &GridCellTrack, radius_m: f64) -> Feature<TrackProperties> {
    let ring = cell_track
        .track
        .points
        .iter()
        .map(|p| vec![p.lng, p.lat, p.alt])
        .collect();
    Feature::new(
        TrackProperties {
            radius: Radius::meters(radius_m),
        },
        GeoJsonGeometry::Polygon {
            coordinates: vec![ring],
        },
    )
}

/// A query box as a Polygon feature carrying its observation window.
pub fn query_box_feature(query_box: &QueryBox) -> Feature<QueryBoxProperties> {
    Feature::new(
        QueryBoxProperties {
            timestamp_before: query_box.timestamp_before,
            timestamp_after: query_box.timestamp_after,
        },
        GeoJsonGeometry::Polygon {
            coordinates: polygon_coordinates(&query_box.shape),
        },
    )
}
