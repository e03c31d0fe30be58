//! Nested query bounding boxes around the study-area centroid.

use chrono::{DateTime, Duration, Utc};
use geo::{Coord, MapCoords, Polygon, Rect};

use crate::bounds::BoundingBox;
use crate::error::ProjectionError;
use crate::projection::Projection;

/// Buffer radii of the three query boxes, in planar meters, smallest first.
pub const QUERY_BOX_RADII_M: [f64; 3] = [150.0, 380.0, 3000.0];

/// A named query region with its relative observation window.
#[derive(Debug, Clone)]
pub struct QueryBox {
    pub name: String,
    pub shape: Polygon<f64>,
    pub timestamp_before: DateTime<Utc>,
    pub timestamp_after: DateTime<Utc>,
}

struct QueryBoxSpec {
    radius_m: f64,
    name: &'static str,
    after_offset_s: i64,
    before_offset_s: i64,
}

const QUERY_BOX_SPECS: [QueryBoxSpec; 3] = [
    QueryBoxSpec {
        radius_m: QUERY_BOX_RADII_M[0],
        name: "zoomed_in_detail",
        after_offset_s: 60,
        before_offset_s: 90,
    },
    QueryBoxSpec {
        radius_m: QUERY_BOX_RADII_M[1],
        name: "whole_flight_area",
        after_offset_s: 30,
        before_offset_s: 60,
    },
    QueryBoxSpec {
        radius_m: QUERY_BOX_RADII_M[2],
        name: "too_large_query",
        after_offset_s: 10,
        before_offset_s: 30,
    },
];

/// Buffer the bounding-box centroid by each query radius and return the
/// axis-aligned planar envelope of each buffer, reprojected to geographic
/// coordinates. The three shapes strictly increase in area with the radii.
pub fn generate_query_boxes(
    bbox: &BoundingBox,
    projection: Projection,
    now: DateTime<Utc>,
) -> Result<Vec<QueryBox>, ProjectionError> {
    let center = projection.to_planar(bbox.centroid())?;

    Ok(QUERY_BOX_SPECS
        .iter()
        .map(|spec| {
            // The envelope of a buffered point is the square centered on it,
            // built directly rather than via an intermediate circle.
            let envelope = Rect::new(
                Coord {
                    x: center.x - spec.radius_m,
                    y: center.y - spec.radius_m,
                },
                Coord {
                    x: center.x + spec.radius_m,
                    y: center.y + spec.radius_m,
                },
            );
            let shape = envelope
                .to_polygon()
                .map_coords(|c| projection.to_geographic(c));
            QueryBox {
                name: spec.name.to_string(),
                shape,
                timestamp_after: now + Duration::seconds(spec.after_offset_s),
                timestamp_before: now + Duration::seconds(spec.before_offset_s),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::GeodesicArea;

    fn bern_bbox() -> BoundingBox {
        BoundingBox::new(
            7.473_578_453_063_965,
            46.974_674_412_821_841,
            7.478_621_006_011_962,
            46.977_631_819_579_912,
        )
        .unwrap()
    }

    #[test]
    fn produces_three_named_boxes_in_order() {
        let boxes =
            generate_query_boxes(&bern_bbox(), Projection::WebMercator, Utc::now()).unwrap();
        let names: Vec<&str> = boxes.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            ["zoomed_in_detail", "whole_flight_area", "too_large_query"]
        );
    }

    #[test]
    fn box_widths_match_the_published_radii() {
        let projection = Projection::WebMercator;
        let bbox = bern_bbox();
        let boxes = generate_query_boxes(&bbox, projection, Utc::now()).unwrap();
        let center = projection.to_planar(bbox.centroid()).unwrap();

        for (b, radius) in boxes.iter().zip(QUERY_BOX_RADII_M) {
            // Each envelope corner sits one radius away from the centroid on
            // both axes.
            for c in b.shape.exterior().coords() {
                let planar = projection.to_planar(*c).unwrap();
                assert!(((planar.x - center.x).abs() - radius).abs() < 1e-6);
                assert!(((planar.y - center.y).abs() - radius).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn areas_strictly_increase_with_radius() {
        let boxes =
            generate_query_boxes(&bern_bbox(), Projection::WebMercator, Utc::now()).unwrap();
        let areas: Vec<f64> = boxes
            .iter()
            .map(|b| b.shape.geodesic_area_unsigned())
            .collect();
        assert!(areas[0] < areas[1] && areas[1] < areas[2], "areas {areas:?}");
    }

    #[test]
    fn observation_windows_follow_the_fixed_offsets() {
        let now = Utc::now();
        let boxes = generate_query_boxes(&bern_bbox(), Projection::WebMercator, now).unwrap();

        let offsets: Vec<(i64, i64)> = boxes
            .iter()
            .map(|b| {
                (
                    (b.timestamp_after - now).num_seconds(),
                    (b.timestamp_before - now).num_seconds(),
                )
            })
            .collect();
        assert_eq!(offsets, [(60, 90), (30, 60), (10, 30)]);
    }

    #[test]
    fn shapes_stay_centered_on_the_study_area() {
        let bbox = bern_bbox();
        let boxes = generate_query_boxes(&bbox, Projection::WebMercator, Utc::now()).unwrap();
        let center = bbox.centroid();
        for b in &boxes {
            use geo::Centroid;
            let c = b.shape.centroid().expect("non-empty polygon");
            assert!((c.x() - center.x).abs() < 1e-3);
            assert!((c.y() - center.y).abs() < 1e-3);
        }
    }
}
