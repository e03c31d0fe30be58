//! Study-area bounding box validation and grid partitioning.

use geo::{coord, Coord, GeodesicArea, Rect};

use crate::error::ValidationError;

/// Minimum geodesic area of a study area (roughly a 300 m x 300 m square).
pub const MIN_AREA_M2: f64 = 90_000.0;
/// Maximum geodesic area of a study area (roughly a 500 m x 500 m square).
pub const MAX_AREA_M2: f64 = 250_000.0;

/// Default grid shape: two rows of three cells, one flight track per cell.
pub const DEFAULT_GRID_ROWS: usize = 2;
pub const DEFAULT_GRID_COLS: usize = 3;

/// A validated geographic bounding box in degrees (WGS84).
///
/// Construction enforces the area window that keeps 70 m circular tracks and
/// up to 3 km query buffers meaningfully scaled to the study area. The box is
/// immutable once validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    minx: f64,
    miny: f64,
    maxx: f64,
    maxy: f64,
}

impl BoundingBox {
    /// Validate and build a bounding box from western/southern/eastern/northern
    /// extents in degrees.
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Result<Self, ValidationError> {
        if !(maxx > minx && maxy > miny) {
            return Err(ValidationError::InvertedExtents {
                minx,
                miny,
                maxx,
                maxy,
            });
        }

        let bbox = Self {
            minx,
            miny,
            maxx,
            maxy,
        };
        let area_m2 = bbox.geodesic_area_m2();
        if !(MIN_AREA_M2..MAX_AREA_M2).contains(&area_m2) {
            return Err(ValidationError::AreaOutOfRange {
                area_m2,
                min_m2: MIN_AREA_M2,
                max_m2: MAX_AREA_M2,
            });
        }
        Ok(bbox)
    }

    pub fn minx(&self) -> f64 {
        self.minx
    }

    pub fn miny(&self) -> f64 {
        self.miny
    }

    pub fn maxx(&self) -> f64 {
        self.maxx
    }

    pub fn maxy(&self) -> f64 {
        self.maxy
    }

    /// The box as a planar rectangle in degree space (x = lng, y = lat).
    pub fn rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.minx, y: self.miny },
            coord! { x: self.maxx, y: self.maxy },
        )
    }

    /// Centroid of the box in degrees.
    pub fn centroid(&self) -> Coord<f64> {
        self.rect().center()
    }

    /// Area of the box polygon on the WGS84 ellipsoid, in square meters.
    pub fn geodesic_area_m2(&self) -> f64 {
        self.rect().to_polygon().geodesic_area_unsigned()
    }

    /// Split the box into `rows * cols` edge-adjacent cells by linear
    /// interpolation of the extents. Cells are ordered bottom row first,
    /// left to right within each row.
    ///
    /// This is an even split in degree space, not a geodesic equal-area
    /// partition; at study-area scale the difference is negligible.
    pub fn partition(&self, rows: usize, cols: usize) -> Vec<GridCell> {
        let cell_size_x = (self.maxx - self.minx) / cols as f64;
        let cell_size_y = (self.maxy - self.miny) / rows as f64;

        let mut cells = Vec::with_capacity(rows * cols);
        for v in 0..rows {
            let y0 = self.miny + v as f64 * cell_size_y;
            for u in 0..cols {
                let x0 = self.minx + u as f64 * cell_size_x;
                cells.push(GridCell {
                    bounds: Rect::new(
                        coord! { x: x0, y: y0 },
                        coord! { x: x0 + cell_size_x, y: y0 + cell_size_y },
                    ),
                });
            }
        }
        cells
    }
}

/// One cell of a partitioned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    bounds: Rect<f64>,
}

impl GridCell {
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn centroid(&self) -> Coord<f64> {
        self.bounds.center()
    }
}
