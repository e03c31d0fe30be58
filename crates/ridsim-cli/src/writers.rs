//! Fixture file writers: GeoJSON tracks/query boxes and JSON telemetry and
//! operational-intent volumes, laid out under `<output-dir>/<country-code>/`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use ridsim_core::authdata::OperatorFlightDetails;
use ridsim_core::export::{query_box_feature, track_feature};
use ridsim_core::query::QueryBox;
use ridsim_core::telemetry::FlightTelemetry;
use ridsim_core::tracks::GridCellTrack;

pub struct FixtureWriter {
    output_directory: PathBuf,
}

impl FixtureWriter {
    /// Create the `<output-dir>/<country-code>/` directory if needed.
    pub fn new(output_dir: &Path, country_code: &str) -> Result<Self> {
        let output_directory = output_dir.join(country_code);
        fs::create_dir_all(&output_directory).with_context(|| {
            format!("creating output directory {}", output_directory.display())
        })?;
        Ok(Self { output_directory })
    }

    fn write_json(&self, file_name: &str, value: &impl Serialize) -> Result<PathBuf> {
        let path = self.output_directory.join(file_name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote fixture");
        Ok(path)
    }

    /// One `box_<name>.geojson` per query box.
    pub fn write_query_boxes(&self, boxes: &[QueryBox]) -> Result<()> {
        for query_box in boxes {
            let feature = query_box_feature(query_box);
            self.write_json(&format!("box_{}.geojson", query_box.name), &feature)?;
        }
        Ok(())
    }

    /// One `track_<n>.geojson` per flight track, 1-based like the existing
    /// fixture corpus.
    pub fn write_tracks(&self, tracks: &[GridCellTrack], radius_m: f64) -> Result<()> {
        for (i, cell_track) in tracks.iter().enumerate() {
            let feature = track_feature(cell_track, radius_m);
            self.write_json(&format!("track_{}.geojson", i + 1), &feature)?;
        }
        Ok(())
    }

    /// One `flight_<k>_rid_aircraft_state.json` per flight.
    pub fn write_telemetry(&self, telemetry: &[FlightTelemetry]) -> Result<()> {
        for flight in telemetry {
            self.write_json(
                &format!("flight_{}_rid_aircraft_state.json", flight.flight_id),
                &flight.states,
            )?;
        }
        Ok(())
    }

    /// One `flight_<k>_operator_details.json` per flight.
    pub fn write_flight_details(
        &self,
        details: &[(String, OperatorFlightDetails)],
    ) -> Result<()> {
        for (flight_id, d) in details {
            self.write_json(&format!("flight_{flight_id}_operator_details.json"), d)?;
        }
        Ok(())
    }

    /// One `operational_intent_<n>.json` per generated intent, 1-based.
    pub fn write_operational_intent(
        &self,
        index: usize,
        intent: &impl Serialize,
    ) -> Result<()> {
        self.write_json(&format!("operational_intent_{}.json", index + 1), intent)?;
        Ok(())
    }
}
