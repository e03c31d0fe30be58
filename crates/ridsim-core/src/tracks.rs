//! Circular flight-track synthesis, one track per grid cell.

use serde::{Deserialize, Serialize};

use crate::bounds::GridCell;
use crate::error::ProjectionError;
use crate::projection::Projection;
use crate::spatial::{circle_ring, CIRCLE_SEGMENTS};

/// Buffer radius of each circular track, in planar meters.
pub const TRACK_RADIUS_M: f64 = 70.0;
/// Fixed flight altitude above ground level, in meters.
pub const DEFAULT_ALTITUDE_AGL_M: f64 = 50.0;
/// Height of the geoid above the WGS84 ellipsoid (EGM96) for the default
/// Bern study area.
pub const BERN_GROUND_LEVEL_WGS84_M: f64 = 48.73;

/// One vertex of a flight track: WGS84 degrees plus altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightPoint {
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
}

/// A closed ring of flight points approximating a circle around a cell
/// centroid. First and last point coincide.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub points: Vec<FlightPoint>,
}

impl Track {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// A grid cell together with the track synthesized inside it.
#[derive(Debug, Clone)]
pub struct GridCellTrack {
    pub cell: GridCell,
    pub track: Track,
}

/// Synthesis parameters with the Bern study-area defaults.
#[derive(Debug, Clone, Copy)]
pub struct TrackParams {
    pub radius_m: f64,
    pub ground_level_wgs84_m: f64,
    pub altitude_agl_m: f64,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            radius_m: TRACK_RADIUS_M,
            ground_level_wgs84_m: BERN_GROUND_LEVEL_WGS84_M,
            altitude_agl_m: DEFAULT_ALTITUDE_AGL_M,
        }
    }
}

/// Build one circular track per grid cell: project the centroid to planar
/// coordinates, buffer it by the track radius, and reproject every ring
/// vertex back to geographic coordinates at a fixed altitude.
pub fn synthesize_tracks(
    cells: &[GridCell],
    projection: Projection,
    params: TrackParams,
) -> Result<Vec<GridCellTrack>, ProjectionError> {
    let altitude = params.ground_level_wgs84_m + params.altitude_agl_m;

    cells
        .iter()
        .map(|cell| {
            let center = projection.to_planar(cell.centroid())?;
            let ring = circle_ring(center, params.radius_m, CIRCLE_SEGMENTS);
            let points = ring
                .0
                .iter()
                .map(|planar| {
                    let geographic = projection.to_geographic(*planar);
                    FlightPoint {
                        lat: geographic.y,
                        lng: geographic.x,
                        alt: altitude,
                    }
                })
                .collect();
            Ok(GridCellTrack {
                cell: *cell,
                track: Track { points },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::{BoundingBox, DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS};
    use crate::spatial::planar_distance;
    use geo::Coord;

    fn bern_cells() -> Vec<GridCell> {
        let bbox = BoundingBox::new(
            7.473_578_453_063_965,
            46.974_674_412_821_841,
            7.478_621_006_011_962,
            46.977_631_819_579_912,
        )
        .expect("Bern extents are valid");
        bbox.partition(DEFAULT_GRID_ROWS, DEFAULT_GRID_COLS)
    }

    #[test]
    fn one_closed_track_per_cell() {
        let tracks = synthesize_tracks(
            &bern_cells(),
            Projection::WebMercator,
            TrackParams::default(),
        )
        .expect("projection in domain");

        assert_eq!(tracks.len(), 6);
        for t in &tracks {
            assert_eq!(t.track.len(), CIRCLE_SEGMENTS + 1);
            assert!(t.track.is_closed());
        }
    }

    #[test]
    fn vertices_stay_on_the_buffer_circle() {
        let projection = Projection::WebMercator;
        let tracks = synthesize_tracks(&bern_cells(), projection, TrackParams::default())
            .expect("projection in domain");

        for t in &tracks {
            let center = projection.to_planar(t.cell.centroid()).unwrap();
            for p in &t.track.points {
                let planar = projection
                    .to_planar(Coord { x: p.lng, y: p.lat })
                    .unwrap();
                let d = planar_distance(planar, center);
                assert!(
                    (d - TRACK_RADIUS_M).abs() < 0.01,
                    "vertex {d} m from centroid, expected {TRACK_RADIUS_M}"
                );
            }
        }
    }

    #[test]
    fn altitude_is_ground_level_plus_agl() {
        let tracks = synthesize_tracks(
            &bern_cells(),
            Projection::WebMercator,
            TrackParams::default(),
        )
        .unwrap();
        let expected = BERN_GROUND_LEVEL_WGS84_M + DEFAULT_ALTITUDE_AGL_M;
        for t in &tracks {
            assert!(t.track.points.iter().all(|p| p.alt == expected));
        }
    }
}
