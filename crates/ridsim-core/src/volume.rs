//! ASTM-style 3D/4D operational-intent volumes built from generated
//! geometries.

use chrono::{DateTime, Duration, Utc};
use geo::{Geometry, MapCoords};
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::projection::Projection;
use crate::random_geometry::GeneratedGeometry;
use crate::spatial::buffer_convex;
use crate::tracks::DEFAULT_ALTITUDE_AGL_M;

/// Lateral margin applied when a flight geometry becomes a volume outline.
pub const LATERAL_BUFFER_M: f64 = 15.0;
/// Half-height of the altitude band around the nominal flight altitude.
pub const ALTITUDE_ENVELOPE_M: f64 = 15.0;
/// Volume time window, as offsets from the reference instant.
pub const VOLUME_START_OFFSET_MIN: i64 = 3;
pub const VOLUME_END_OFFSET_MIN: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Radius {
    pub value: f64,
    pub units: String,
}

impl Radius {
    pub fn meters(value: f64) -> Self {
        Self {
            value,
            units: "M".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: LatLngPoint,
    pub radius: Radius,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Altitude {
    pub value: f64,
    pub reference: String,
    pub units: String,
}

impl Altitude {
    /// Altitude in meters against the WGS84 ellipsoid.
    pub fn w84_meters(value: f64) -> Self {
        Self {
            value,
            reference: "W84".to_string(),
            units: "M".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePolygon {
    pub vertices: Vec<LatLngPoint>,
}

/// Spatial volume: a polygon or circle outline with an altitude band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume3D {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_polygon: Option<VolumePolygon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_circle: Option<Circle>,
    pub altitude_lower: Altitude,
    pub altitude_upper: Altitude,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Time {
    pub value: DateTime<Utc>,
    pub format: String,
}

impl Time {
    pub fn rfc3339(value: DateTime<Utc>) -> Self {
        Self {
            value,
            format: "RFC3339".to_string(),
        }
    }
}

/// Spatio-temporal volume: a [`Volume3D`] with its validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume4D {
    pub volume: Volume3D,
    pub time_start: Time,
    pub time_end: Time,
}

/// Volumes plus the priority used by strategic conflict detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalIntentDetails {
    pub volumes: Vec<Volume4D>,
    pub priority: i32,
}

/// Converts generated 2D geometries into 3D and 4D volumes. Pure,
/// side-effect-free transformation.
#[derive(Debug, Clone, Copy)]
pub struct VolumeBuilder {
    projection: Projection,
    ground_level_wgs84_m: f64,
    altitude_agl_m: f64,
    altitude_envelope_m: f64,
    lateral_buffer_m: f64,
}

impl VolumeBuilder {
    pub fn new(projection: Projection, ground_level_wgs84_m: f64) -> Self {
        Self {
            projection,
            ground_level_wgs84_m,
            altitude_agl_m: DEFAULT_ALTITUDE_AGL_M,
            altitude_envelope_m: ALTITUDE_ENVELOPE_M,
            lateral_buffer_m: LATERAL_BUFFER_M,
        }
    }

    /// Buffer the geometry laterally in planar space and attach the altitude
    /// band: ground level + AGL offset, +/- the envelope.
    pub fn to_volume_3d(&self, generated: &GeneratedGeometry) -> Result<Volume3D, ProjectionError> {
        let planar = self.projection.project_geometry(&generated.geometry)?;
        let outline = buffer_convex(&planar, self.lateral_buffer_m);
        let outline_geo = outline.map_coords(|c| self.projection.to_geographic(c));

        let vertices = outline_geo
            .exterior()
            .coords()
            .map(|c| LatLngPoint { lat: c.y, lng: c.x })
            .collect();

        let nominal = self.ground_level_wgs84_m + self.altitude_agl_m;
        Ok(Volume3D {
            outline_polygon: Some(VolumePolygon { vertices }),
            outline_circle: None,
            altitude_lower: Altitude::w84_meters(nominal - self.altitude_envelope_m),
            altitude_upper: Altitude::w84_meters(nominal + self.altitude_envelope_m),
        })
    }

    /// Attach the fixed validity window to a 3D volume.
    pub fn to_volume_4d(&self, volume: Volume3D, now: DateTime<Utc>) -> Volume4D {
        Volume4D {
            volume,
            time_start: Time::rfc3339(now + Duration::minutes(VOLUME_START_OFFSET_MIN)),
            time_end: Time::rfc3339(now + Duration::minutes(VOLUME_END_OFFSET_MIN)),
        }
    }

    /// Full 2D geometry -> 4D volume conversion.
    pub fn build(
        &self,
        generated: &GeneratedGeometry,
        now: DateTime<Utc>,
    ) -> Result<Volume4D, ProjectionError> {
        let volume = self.to_volume_3d(generated)?;
        Ok(self.to_volume_4d(volume, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random_geometry::GeometryGenerationRule;
    use geo::{coord, Coord, LineString};

    fn utm32() -> Projection {
        Projection::utm_from_zone("32T").unwrap()
    }

    fn bern_segment() -> GeneratedGeometry {
        GeneratedGeometry {
            geometry: Geometry::LineString(LineString::new(vec![
                coord! { x: 7.4745, y: 46.9752 },
                coord! { x: 7.4772, y: 46.9769 },
            ])),
            rule: GeometryGenerationRule::default(),
        }
    }

    #[test]
    fn altitude_band_wraps_the_nominal_altitude() {
        let builder = VolumeBuilder::new(utm32(), 570.0);
        let v3 = builder.to_volume_3d(&bern_segment()).unwrap();

        assert_eq!(v3.altitude_lower.value, 570.0 + 50.0 - 15.0);
        assert_eq!(v3.altitude_upper.value, 570.0 + 50.0 + 15.0);
        assert_eq!(v3.altitude_lower.reference, "W84");
        assert_eq!(v3.altitude_upper.units, "M");
        assert!(v3.outline_circle.is_none());
    }

    #[test]
    fn outline_stays_within_the_lateral_margin() {
        let projection = utm32();
        let builder = VolumeBuilder::new(projection, 570.0);
        let generated = bern_segment();
        let v3 = builder.to_volume_3d(&generated).unwrap();
        let outline = v3.outline_polygon.expect("polygon outline");

        // Every outline vertex sits within the buffer margin of the planar
        // segment (with slack for the 64-gon approximation and reprojection).
        let a = projection
            .to_planar(coord! { x: 7.4745, y: 46.9752 })
            .unwrap();
        let b = projection
            .to_planar(coord! { x: 7.4772, y: 46.9769 })
            .unwrap();

        for v in &outline.vertices {
            let p = projection
                .to_planar(Coord { x: v.lng, y: v.lat })
                .unwrap();
            let d = segment_distance(p, a, b);
            assert!(
                (d - LATERAL_BUFFER_M).abs() < 0.1,
                "outline vertex {d} m from segment"
            );
        }
    }

    fn segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
        let (px, py) = (p.x - a.x, p.y - a.y);
        let (sx, sy) = (b.x - a.x, b.y - a.y);
        let len_sq = sx * sx + sy * sy;
        let t = ((px * sx + py * sy) / len_sq).clamp(0.0, 1.0);
        ((px - t * sx).powi(2) + (py - t * sy).powi(2)).sqrt()
    }

    #[test]
    fn time_window_uses_the_fixed_offsets() {
        let builder = VolumeBuilder::new(utm32(), 570.0);
        let now = Utc::now();
        let v4 = builder.build(&bern_segment(), now).unwrap();

        assert_eq!((v4.time_start.value - now).num_minutes(), 3);
        assert_eq!((v4.time_end.value - now).num_minutes(), 8);
        assert_eq!(v4.time_start.format, "RFC3339");
    }

    #[test]
    fn volume_4d_survives_a_json_round_trip() {
        let builder = VolumeBuilder::new(utm32(), 570.0);
        let v4 = builder.build(&bern_segment(), Utc::now()).unwrap();

        let json = serde_json::to_string(&v4).unwrap();
        let back: Volume4D = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v4);
    }
}
