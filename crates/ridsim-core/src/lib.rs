//! Deterministic generation of synthetic flight tracks, telemetry streams,
//! query bounding boxes, and 4D airspace volumes, used as fixtures for
//! testing Remote-ID and strategic-conflict-detection services.
//!
//! The crate is pure computation over in-memory data: it consumes a bounding
//! box, generation rules, and a time budget, and emits tracks, volumes, and
//! telemetry as values. Writing fixtures to disk (and anything network
//! shaped) belongs to downstream collaborators.

pub mod authdata;
pub mod bounds;
pub mod error;
pub mod export;
pub mod projection;
pub mod query;
pub mod random_geometry;
pub mod spatial;
pub mod telemetry;
pub mod tracks;
pub mod volume;

pub use bounds::{BoundingBox, GridCell, DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS};
pub use error::{FixtureError, GenerationError, ProjectionError, ValidationError};
pub use projection::Projection;
pub use query::{generate_query_boxes, QueryBox};
pub use random_geometry::{
    GeneratedGeometry, GeometryGenerationRule, RandomGeometryGenerator,
    MAX_INTERSECTION_ATTEMPTS,
};
pub use telemetry::{replay, AircraftState, FlightTelemetry};
pub use tracks::{synthesize_tracks, FlightPoint, GridCellTrack, Track, TrackParams};
pub use volume::{Volume3D, Volume4D, VolumeBuilder};
