//! ridsim - generate RID/SCD test fixtures from an explicit configuration.
//!
//! `ridsim tracks` writes circular flight tracks, query bounding boxes, and
//! replayed telemetry as GeoJSON/JSON. `ridsim volumes` writes 4D
//! operational-intent volumes paired with flight-authorisation data.

mod writers;

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use ridsim_core::authdata::{
    self, FlightAuthorisationData,
};
use ridsim_core::bounds::{BoundingBox, DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS};
use ridsim_core::projection::Projection;
use ridsim_core::query::generate_query_boxes;
use ridsim_core::random_geometry::{GeometryGenerationRule, RandomGeometryGenerator};
use ridsim_core::telemetry::replay;
use ridsim_core::tracks::{synthesize_tracks, TrackParams};
use ridsim_core::volume::{OperationalIntentDetails, VolumeBuilder};

use crate::writers::FixtureWriter;

/// RID/SCD test fixture generator.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    area: AreaArgs,

    #[command(subcommand)]
    command: Command,
}

/// Study-area configuration. Defaults describe the Bern reference area.
#[derive(Args, Debug)]
struct AreaArgs {
    /// Western edge of the bounding box (degrees longitude)
    #[arg(long, default_value_t = 7.473_578_453_063_965)]
    min_lng: f64,

    /// Southern edge of the bounding box (degrees latitude)
    #[arg(long, default_value_t = 46.974_674_412_821_841)]
    min_lat: f64,

    /// Eastern edge of the bounding box (degrees longitude)
    #[arg(long, default_value_t = 7.478_621_006_011_962)]
    max_lng: f64,

    /// Northern edge of the bounding box (degrees latitude)
    #[arg(long, default_value_t = 46.977_631_819_579_912)]
    max_lat: f64,

    /// ISO 3166-1 alpha-3 country code, used as the output subdirectory
    #[arg(long, default_value = "che")]
    country_code: String,

    /// Directory fixture files are written under
    #[arg(long, default_value = "test_definitions")]
    output_dir: PathBuf,

    /// Seed for all random choices; omit for a nondeterministic run
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate flight tracks, query bounding boxes, and replayed telemetry
    Tracks {
        /// Replay duration in one-second ticks
        #[arg(long, default_value_t = 180)]
        duration: u32,
    },
    /// Generate 4D operational-intent volumes with authorisation data
    Volumes {
        /// UTM zone/band of the study area, e.g. 32T for Switzerland
        #[arg(long, default_value = "32T")]
        utm_zone: String,

        /// Number of operational intents; the first is unconstrained, later
        /// ones may be forced to intersect it
        #[arg(long, default_value_t = 2)]
        count: usize,

        /// Ground level above the WGS84 ellipsoid, in meters
        #[arg(long, default_value_t = 570.0)]
        ground_level: f64,
    },
}

/// Operational-intent fixture: the volume payload, the authorisation data it
/// is submitted with, and the generation rule for the expected outcome.
#[derive(Debug, Serialize)]
struct OperationalIntentFixture {
    operational_intent: OperationalIntentDetails,
    flight_authorisation: FlightAuthorisationData,
    geometry_generation_rule: GeometryGenerationRule,
    incorrect_field: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let bbox = BoundingBox::new(
        cli.area.min_lng,
        cli.area.min_lat,
        cli.area.max_lng,
        cli.area.max_lat,
    )?;
    tracing::info!(
        area_m2 = format!("{:.0}", bbox.geodesic_area_m2()),
        "validated study area"
    );

    let writer = FixtureWriter::new(&cli.area.output_dir, &cli.area.country_code)?;
    // One seedable stream for every random choice in the run.
    let seed = cli.area.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "random stream seeded");
    let rng = ChaCha8Rng::seed_from_u64(seed);

    match cli.command {
        Command::Tracks { duration } => {
            generate_tracks(&bbox, duration, rng, &cli.area, &writer)
        }
        Command::Volumes {
            utm_zone,
            count,
            ground_level,
        } => generate_volumes(&bbox, &utm_zone, count, ground_level, rng, &cli.area, &writer),
    }
}

fn generate_tracks(
    bbox: &BoundingBox,
    duration: u32,
    mut rng: ChaCha8Rng,
    area: &AreaArgs,
    writer: &FixtureWriter,
) -> Result<()> {
    let projection = Projection::WebMercator;
    let params = TrackParams::default();
    let now = Utc::now();

    let cells = bbox.partition(DEFAULT_GRID_ROWS, DEFAULT_GRID_COLS);
    let tracks = synthesize_tracks(&cells, projection, params)?;
    let query_boxes = generate_query_boxes(bbox, projection, now)?;
    let telemetry = replay(&tracks, duration, now)?;

    // Each flight gets operator details anchored at its own cell centroid.
    let registration_prefix = area.country_code.to_ascii_uppercase();
    let details: Vec<_> = telemetry
        .iter()
        .zip(&tracks)
        .map(|(flight, cell_track)| {
            let d = authdata::generate_operator_flight_details(
                &mut rng,
                &registration_prefix,
                cell_track.cell.centroid(),
            );
            (flight.flight_id.clone(), d)
        })
        .collect();

    tracing::info!(
        tracks = tracks.len(),
        query_boxes = query_boxes.len(),
        duration,
        "generated track fixtures"
    );

    writer.write_query_boxes(&query_boxes)?;
    writer.write_tracks(&tracks, params.radius_m)?;
    writer.write_telemetry(&telemetry)?;
    writer.write_flight_details(&details)?;
    Ok(())
}

fn generate_volumes(
    bbox: &BoundingBox,
    utm_zone: &str,
    count: usize,
    ground_level: f64,
    mut rng: ChaCha8Rng,
    area: &AreaArgs,
    writer: &FixtureWriter,
) -> Result<()> {
    let projection = Projection::utm_from_zone(utm_zone)?;
    let builder = VolumeBuilder::new(projection, ground_level);
    let now = Utc::now();

    let registration_prefix = area.country_code.to_ascii_uppercase();

    // Fork the random stream: the generator owns its own RNG so geometry
    // draws and authorisation draws stay independently reproducible.
    let mut generator = RandomGeometryGenerator::new(
        *bbox,
        DEFAULT_GRID_ROWS,
        DEFAULT_GRID_COLS,
        ChaCha8Rng::seed_from_u64(rng.random()),
    )?;

    for index in 0..count {
        // The first intent becomes the reference; later intents intersect it
        // on a 2:1 coin flip.
        let intersect_space = index != 0 && rng.random_range(0..3) == 2;
        let rule = GeometryGenerationRule { intersect_space };

        let authorisation = generate_authorisation(&mut rng, &registration_prefix);
        let generated = generator.generate(rule)?;
        let volume = builder.build(&generated, now)?;
        let fixture = OperationalIntentFixture {
            operational_intent: OperationalIntentDetails {
                volumes: vec![volume],
                priority: 0,
            },
            flight_authorisation: authorisation.0,
            geometry_generation_rule: rule,
            incorrect_field: authorisation.1,
        };

        tracing::info!(index, intersect_space, "generated operational intent");
        writer.write_operational_intent(index, &fixture)?;
    }
    Ok(())
}

/// Generate authorisation data, corrupting one field on a coin flip and
/// recording which.
fn generate_authorisation(
    rng: &mut ChaCha8Rng,
    registration_prefix: &str,
) -> (FlightAuthorisationData, Option<String>) {
    let mut serial = authdata::generate_serial_number(rng);
    let mut operator_id =
        authdata::generate_operator_registration_number(rng, registration_prefix);

    let incorrect_field = if rng.random_range(0..2) == 1 {
        if rng.random_range(0..2) == 1 {
            serial = authdata::corrupt_serial_number(rng, &serial);
            Some("uas_serial_number".to_string())
        } else {
            operator_id = authdata::corrupt_operator_registration_number(rng, &operator_id);
            Some("operator_registration_number".to_string())
        }
    } else {
        None
    };

    (
        FlightAuthorisationData::new(serial, operator_id),
        incorrect_field,
    )
}
