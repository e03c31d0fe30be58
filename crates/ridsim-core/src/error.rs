//! Error taxonomy for fixture generation.
//!
//! All failures are raised synchronously at the point of violation. Nothing
//! is retried internally except the bounded rejection-sampling loop in
//! [`crate::random_geometry`], which converts exhaustion into
//! [`GenerationError::RetryBudgetExhausted`].

use thiserror::Error;

/// Rejected input configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(
        "bounding box geodesic area {area_m2:.0} m2 is outside the allowed window \
         [{min_m2:.0} m2, {max_m2:.0} m2)"
    )]
    AreaOutOfRange {
        area_m2: f64,
        min_m2: f64,
        max_m2: f64,
    },

    #[error("bounding box extents are inverted or empty: ({minx}, {miny}) .. ({maxx}, {maxy})")]
    InvertedExtents {
        minx: f64,
        miny: f64,
        maxx: f64,
        maxy: f64,
    },

    #[error("grid needs at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },
}

/// Failure while producing fixture data from valid inputs.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no geometry intersecting the reference shape found after {attempts} attempts")]
    RetryBudgetExhausted { attempts: u32 },

    #[error("no flight tracks available to replay")]
    NoFlightTracks,

    #[error("flight track {flight} has no points")]
    EmptyTrack { flight: usize },
}

/// Coordinate transform failure.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("coordinate ({lat}, {lng}) is outside the projection domain")]
    OutsideDomain { lat: f64, lng: f64 },

    #[error("invalid UTM zone specifier {0:?}")]
    InvalidUtmZone(String),
}

/// Umbrella error for callers driving the whole pipeline.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn umbrella_error_preserves_the_source_message() {
        let err: FixtureError = GenerationError::NoFlightTracks.into();
        assert_eq!(err.to_string(), GenerationError::NoFlightTracks.to_string());
        assert!(matches!(err, FixtureError::Generation(_)));

        let err: FixtureError = ProjectionError::InvalidUtmZone("99Z".to_string()).into();
        assert!(err.to_string().contains("99Z"));
    }
}
