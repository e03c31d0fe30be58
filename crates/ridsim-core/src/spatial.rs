//! Planar buffering primitives.
//!
//! Everything here operates on projected (metric) coordinates; callers
//! project first and reproject the result. See [`crate::projection`].

use geo::{Coord, ConvexHull, CoordsIter, Geometry, LineString, MultiPoint, Point, Polygon};

/// Segments used to approximate a circle. 64 segments yields a 65-vertex
/// closed ring, matching the resolution of the existing fixture data.
pub const CIRCLE_SEGMENTS: usize = 64;

/// Euclidean distance between two planar coordinates, in meters.
pub fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Closed circular ring (first vertex == last vertex) of `segments` chords
/// around a planar center.
pub fn circle_ring(center: Coord<f64>, radius_m: f64, segments: usize) -> LineString<f64> {
    let mut coords = Vec::with_capacity(segments + 1);
    for i in 0..segments {
        let theta = std::f64::consts::TAU * i as f64 / segments as f64;
        coords.push(Coord {
            x: center.x + radius_m * theta.cos(),
            y: center.y + radius_m * theta.sin(),
        });
    }
    coords.push(coords[0]);
    LineString::new(coords)
}

/// Circular polygon of the given radius around a planar center.
pub fn buffer_point(center: Coord<f64>, radius_m: f64) -> Polygon<f64> {
    Polygon::new(circle_ring(center, radius_m, CIRCLE_SEGMENTS), vec![])
}

/// Lateral buffer of a convex planar geometry by `margin_m`, computed as the
/// convex hull of sampled disks around every vertex (a Minkowski sum with a
/// disk, exact for convex inputs up to the circle approximation).
///
/// Only valid for convex geometries; the generators feeding this function
/// produce 2-vertex segments and axis-aligned rectangle envelopes.
pub fn buffer_convex(geometry: &Geometry<f64>, margin_m: f64) -> Polygon<f64> {
    let mut cloud: Vec<Point<f64>> = Vec::new();
    for vertex in geometry.coords_iter() {
        for i in 0..CIRCLE_SEGMENTS {
            let theta = std::f64::consts::TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            cloud.push(Point::new(
                vertex.x + margin_m * theta.cos(),
                vertex.y + margin_m * theta.sin(),
            ));
        }
    }
    MultiPoint::new(cloud).convex_hull()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, Area, Contains, Intersects};

    #[test]
    fn circle_ring_is_closed_with_expected_resolution() {
        let ring = circle_ring(coord! { x: 1000.0, y: -500.0 }, 70.0, CIRCLE_SEGMENTS);
        assert_eq!(ring.0.len(), CIRCLE_SEGMENTS + 1);
        assert_eq!(ring.0.first(), ring.0.last());
        for c in &ring.0 {
            let d = planar_distance(*c, coord! { x: 1000.0, y: -500.0 });
            assert!((d - 70.0).abs() < 1e-9, "vertex off the circle: {d}");
        }
    }

    #[test]
    fn buffer_point_area_approximates_disk() {
        let disk = buffer_point(coord! { x: 0.0, y: 0.0 }, 100.0);
        let expected = std::f64::consts::PI * 100.0 * 100.0;
        let actual = disk.unsigned_area();
        // 64-gon area is within ~0.2% of the true disk.
        assert!((actual - expected).abs() / expected < 0.005);
    }

    #[test]
    fn buffer_convex_contains_the_source_segment() {
        let segment = Geometry::LineString(LineString::from(vec![
            (0.0, 0.0),
            (200.0, 80.0),
        ]));
        let hull = buffer_convex(&segment, 15.0);
        assert!(hull.contains(&Point::new(0.0, 0.0)));
        assert!(hull.contains(&Point::new(200.0, 80.0)));
        assert!(hull.contains(&Point::new(100.0, 40.0)));
        assert!(!hull.intersects(&Point::new(0.0, -20.0)));
    }

    #[test]
    fn buffer_convex_offsets_rectangle_by_margin() {
        let rect = geo::Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 100.0, y: 50.0 });
        let hull = buffer_convex(&Geometry::Polygon(rect.to_polygon()), 15.0);

        // Points just inside the offset boundary are covered, points beyond
        // it are not.
        assert!(hull.contains(&Point::new(-14.0, 25.0)));
        assert!(hull.contains(&Point::new(114.0, 25.0)));
        assert!(hull.contains(&Point::new(50.0, 64.0)));
        assert!(!hull.intersects(&Point::new(-16.0, 25.0)));
        assert!(!hull.intersects(&Point::new(50.0, 66.0)));
    }
}
