//! Rule-driven random geometry generation.
//!
//! Produces random 2-vertex lines across the study area, or rectangle
//! envelopes inside one grid cell, optionally constrained to intersect the
//! reference geometry (by default the first geometry generated in a run).

use geo::{Coord, Geometry, Intersects, LineString, Rect};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bounds::{BoundingBox, GridCell};
use crate::error::{GenerationError, ValidationError};

/// Retry budget for the intersection search. Exhaustion is an explicit
/// failure rather than an endless loop.
pub const MAX_INTERSECTION_ATTEMPTS: u32 = 1000;

/// How a geometry should relate to the reference shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryGenerationRule {
    /// Whether the generated geometry must spatially intersect the reference
    /// geometry (the first geometry generated in the run, unless pinned via
    /// [`RandomGeometryGenerator::set_reference`]).
    pub intersect_space: bool,
}

/// A generated line or polygon paired with the rule that produced it.
#[derive(Debug, Clone)]
pub struct GeneratedGeometry {
    pub geometry: Geometry<f64>,
    pub rule: GeometryGenerationRule,
}

/// Random geometry source over a validated bounding box.
///
/// Randomness flows through the injected `Rng`, so a seeded generator
/// reproduces the same sequence of geometries.
#[derive(Debug)]
pub struct RandomGeometryGenerator<R: Rng> {
    bbox: BoundingBox,
    cells: Vec<GridCell>,
    rng: R,
    reference: Option<Geometry<f64>>,
}

impl<R: Rng> RandomGeometryGenerator<R> {
    /// Polygon candidates are drawn from a random grid cell, so the grid must
    /// be non-empty.
    pub fn new(
        bbox: BoundingBox,
        rows: usize,
        cols: usize,
        rng: R,
    ) -> Result<Self, ValidationError> {
        if rows == 0 || cols == 0 {
            return Err(ValidationError::EmptyGrid { rows, cols });
        }
        let cells = bbox.partition(rows, cols);
        Ok(Self {
            bbox,
            cells,
            rng,
            reference: None,
        })
    }

    /// Pin the reference geometry that `intersect_space` candidates are
    /// tested against, instead of the first generated geometry.
    pub fn set_reference(&mut self, geometry: Geometry<f64>) {
        self.reference = Some(geometry);
    }

    pub fn reference(&self) -> Option<&Geometry<f64>> {
        self.reference.as_ref()
    }

    /// Generate one geometry under the given rule.
    ///
    /// The first geometry of a run becomes the reference for later
    /// `intersect_space` requests. The intersection search is rejection
    /// sampling bounded by [`MAX_INTERSECTION_ATTEMPTS`].
    pub fn generate(
        &mut self,
        rule: GeometryGenerationRule,
    ) -> Result<GeneratedGeometry, GenerationError> {
        let geometry = match self.reference.clone() {
            None => {
                let g = self.draw_candidate();
                self.reference = Some(g.clone());
                g
            }
            Some(reference) if rule.intersect_space => {
                let mut found = None;
                for _ in 0..MAX_INTERSECTION_ATTEMPTS {
                    let candidate = self.draw_candidate();
                    if candidate.intersects(&reference) {
                        found = Some(candidate);
                        break;
                    }
                }
                found.ok_or(GenerationError::RetryBudgetExhausted {
                    attempts: MAX_INTERSECTION_ATTEMPTS,
                })?
            }
            Some(_) => self.draw_candidate(),
        };

        Ok(GeneratedGeometry { geometry, rule })
    }

    /// Draw one candidate, biased 2:1 toward lines over cell polygons.
    fn draw_candidate(&mut self) -> Geometry<f64> {
        if self.rng.random_range(0..3) == 2 {
            Geometry::Polygon(self.random_cell_envelope().to_polygon())
        } else {
            Geometry::LineString(self.random_line())
        }
    }

    /// Random 2-vertex line spanning anywhere in the full bounding box.
    fn random_line(&mut self) -> LineString<f64> {
        let a = self.random_coord_in(self.bbox.rect());
        let b = self.random_coord_in(self.bbox.rect());
        LineString::new(vec![a, b])
    }

    /// Axis-aligned envelope of a random 2-vertex line inside one randomly
    /// chosen grid cell, keeping polygon candidates from covering the whole
    /// study area.
    fn random_cell_envelope(&mut self) -> Rect<f64> {
        let cell = self.cells[self.rng.random_range(0..self.cells.len())];
        let a = self.random_coord_in(cell.bounds());
        let b = self.random_coord_in(cell.bounds());
        Rect::new(a, b)
    }

    fn random_coord_in(&mut self, rect: Rect<f64>) -> Coord<f64> {
        Coord {
            x: self.rng.random_range(rect.min().x..rect.max().x),
            y: self.rng.random_range(rect.min().y..rect.max().y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::{DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS};
    use geo::{coord, CoordsIter};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn bern_generator(seed: u64) -> RandomGeometryGenerator<ChaCha8Rng> {
        let bbox = BoundingBox::new(
            7.473_578_453_063_965,
            46.974_674_412_821_841,
            7.478_621_006_011_962,
            46.977_631_819_579_912,
        )
        .unwrap();
        RandomGeometryGenerator::new(
            bbox,
            DEFAULT_GRID_ROWS,
            DEFAULT_GRID_COLS,
            ChaCha8Rng::seed_from_u64(seed),
        )
        .unwrap()
    }

    fn coords_within_bbox(g: &Geometry<f64>) -> bool {
        g.coords_iter().all(|c| {
            (7.473_578_453_063_965..=7.478_621_006_011_962).contains(&c.x)
                && (46.974_674_412_821_841..=46.977_631_819_579_912).contains(&c.y)
        })
    }

    #[test]
    fn same_seed_reproduces_the_same_geometry() {
        let rule = GeometryGenerationRule::default();
        let a = bern_generator(7).generate(rule).unwrap();
        let b = bern_generator(7).generate(rule).unwrap();
        assert_eq!(a.geometry, b.geometry);
    }

    #[test]
    fn candidates_stay_inside_the_bounding_box() {
        let mut generator = bern_generator(11);
        for _ in 0..50 {
            let g = generator
                .generate(GeometryGenerationRule::default())
                .unwrap();
            assert!(coords_within_bbox(&g.geometry));
        }
    }

    #[test]
    fn draws_both_lines_and_polygons() {
        let mut generator = bern_generator(3);
        let mut lines = 0usize;
        let mut polygons = 0usize;
        for _ in 0..100 {
            match generator
                .generate(GeometryGenerationRule::default())
                .unwrap()
                .geometry
            {
                Geometry::LineString(_) => lines += 1,
                Geometry::Polygon(_) => polygons += 1,
                other => panic!("unexpected geometry {other:?}"),
            }
        }
        assert!(lines > polygons, "expected a 2:1 bias, got {lines}/{polygons}");
        assert!(polygons > 0);
    }

    #[test]
    fn intersect_rule_yields_intersecting_geometry() {
        let mut generator = bern_generator(42);
        let first = generator
            .generate(GeometryGenerationRule::default())
            .unwrap();

        for _ in 0..10 {
            let next = generator
                .generate(GeometryGenerationRule {
                    intersect_space: true,
                })
                .unwrap();
            assert!(next.geometry.intersects(&first.geometry));
        }
    }

    #[test]
    fn unconstrained_rule_does_not_filter() {
        let mut generator = bern_generator(5);
        generator
            .generate(GeometryGenerationRule::default())
            .unwrap();
        // No intersection requirement: generation always succeeds.
        for _ in 0..20 {
            generator
                .generate(GeometryGenerationRule {
                    intersect_space: false,
                })
                .unwrap();
        }
    }

    #[test]
    fn zero_grid_dimensions_are_rejected() {
        let bbox = BoundingBox::new(
            7.473_578_453_063_965,
            46.974_674_412_821_841,
            7.478_621_006_011_962,
            46.977_631_819_579_912,
        )
        .unwrap();
        let err = RandomGeometryGenerator::new(bbox, 0, 3, ChaCha8Rng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyGrid { rows: 0, cols: 3 }));

        let err = RandomGeometryGenerator::new(bbox, 2, 0, ChaCha8Rng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyGrid { rows: 2, cols: 0 }));
    }

    #[test]
    fn exhausted_retry_budget_is_an_error() {
        let mut generator = bern_generator(1);
        // A reference far outside the study area can never be hit.
        generator.set_reference(Geometry::LineString(LineString::new(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 0.1, y: 0.1 },
        ])));

        let err = generator
            .generate(GeometryGenerationRule {
                intersect_space: true,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::RetryBudgetExhausted {
                attempts: MAX_INTERSECTION_ATTEMPTS
            }
        ));
    }
}
