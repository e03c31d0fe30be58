//! Geographic <-> planar projection round-tripping.
//!
//! All buffering happens in a metric planar projection: Web Mercator for
//! generic work (tracks, query boxes) and a caller-supplied UTM zone where
//! metric accuracy matters (volume outlines). Forward-then-inverse of any
//! point in the study area returns the original coordinates within 1e-6
//! degrees. Neither projection is usable near its singularities; study areas
//! must stay away from the poles and the +/-180 degree seam.

use geo::{Coord, Geometry, MapCoords};

use crate::error::ProjectionError;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;

const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Web Mercator is undefined at the poles; clip at the conventional limit.
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128;
/// UTM grid coverage.
const UTM_MIN_LAT: f64 = -80.0;
const UTM_MAX_LAT: f64 = 84.0;

/// A planar projection paired with its inverse.
///
/// Coordinates follow the geo convention: `x` = longitude, `y` = latitude in
/// geographic space; meters easting/northing in planar space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Spherical Web Mercator (EPSG:3857-style).
    WebMercator,
    /// Universal Transverse Mercator on the WGS84 ellipsoid.
    Utm { zone: u8, north: bool },
}

impl Projection {
    /// Parse a UTM zone/band specifier such as `"32T"`. Bands `C`..`M` select
    /// the southern grid, `N`..`X` the northern; a bare zone number defaults
    /// to north.
    pub fn utm_from_zone(spec: &str) -> Result<Self, ProjectionError> {
        let spec = spec.trim();
        let digits: String = spec.chars().take_while(|c| c.is_ascii_digit()).collect();
        let band = spec[digits.len()..].trim();

        let zone: u8 = digits
            .parse()
            .map_err(|_| ProjectionError::InvalidUtmZone(spec.to_string()))?;
        if !(1..=60).contains(&zone) {
            return Err(ProjectionError::InvalidUtmZone(spec.to_string()));
        }

        let north = match band {
            "" => true,
            b => {
                let c = b
                    .chars()
                    .next()
                    .map(|c| c.to_ascii_uppercase())
                    .filter(|c| ('C'..='X').contains(c) && *c != 'I' && *c != 'O');
                match c {
                    Some(c) if b.len() == 1 => c >= 'N',
                    _ => return Err(ProjectionError::InvalidUtmZone(spec.to_string())),
                }
            }
        };

        Ok(Projection::Utm { zone, north })
    }

    /// Forward-project a geographic coordinate to planar meters.
    pub fn to_planar(&self, c: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
        match *self {
            Projection::WebMercator => {
                if c.y.abs() > WEB_MERCATOR_MAX_LAT {
                    return Err(ProjectionError::OutsideDomain { lat: c.y, lng: c.x });
                }
                let x = WGS84_A * c.x.to_radians();
                let y = WGS84_A * (std::f64::consts::FRAC_PI_4 + c.y.to_radians() / 2.0)
                    .tan()
                    .ln();
                Ok(Coord { x, y })
            }
            Projection::Utm { zone, north } => {
                if !(UTM_MIN_LAT..=UTM_MAX_LAT).contains(&c.y) {
                    return Err(ProjectionError::OutsideDomain { lat: c.y, lng: c.x });
                }
                Ok(utm_forward(c, zone, north))
            }
        }
    }

    /// Inverse-project a planar coordinate back to geographic degrees.
    pub fn to_geographic(&self, c: Coord<f64>) -> Coord<f64> {
        match *self {
            Projection::WebMercator => {
                let lng = (c.x / WGS84_A).to_degrees();
                let lat = (2.0 * (c.y / WGS84_A).exp().atan() - std::f64::consts::FRAC_PI_2)
                    .to_degrees();
                Coord { x: lng, y: lat }
            }
            Projection::Utm { zone, north } => utm_inverse(c, zone, north),
        }
    }

    /// Forward-project every coordinate of a geometry.
    pub fn project_geometry(&self, g: &Geometry<f64>) -> Result<Geometry<f64>, ProjectionError> {
        g.try_map_coords(|c| self.to_planar(c))
    }

    /// Inverse-project every coordinate of a geometry.
    pub fn unproject_geometry(&self, g: &Geometry<f64>) -> Geometry<f64> {
        g.map_coords(|c| self.to_geographic(c))
    }
}

fn utm_central_meridian_deg(zone: u8) -> f64 {
    (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

/// Third-order Krueger series for the transverse Mercator projection.
/// Millimetre-level accuracy for in-zone coordinates, far inside the 1e-6
/// degree round-trip tolerance.
fn utm_forward(c: Coord<f64>, zone: u8, north: bool) -> Coord<f64> {
    let n = WGS84_F / (2.0 - WGS84_F);
    let n2 = n * n;
    let n3 = n2 * n;
    let a_maj = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

    let lat = c.y.to_radians();
    let dlng = (c.x - utm_central_meridian_deg(zone)).to_radians();

    let e_ratio = 2.0 * n.sqrt() / (1.0 + n);
    let t = (lat.sin().atanh() - e_ratio * (e_ratio * lat.sin()).atanh()).sinh();

    let xi_p = t.atan2(dlng.cos());
    let eta_p = (dlng.sin() / (1.0 + t * t).sqrt()).atanh();

    let alpha = [
        n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
        13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
        61.0 * n3 / 240.0,
    ];

    let mut xi = xi_p;
    let mut eta = eta_p;
    for (j, a) in alpha.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
        eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
    }

    let x = UTM_FALSE_EASTING + UTM_K0 * a_maj * eta;
    let mut y = UTM_K0 * a_maj * xi;
    if !north {
        y += UTM_FALSE_NORTHING_SOUTH;
    }
    Coord { x, y }
}

fn utm_inverse(c: Coord<f64>, zone: u8, north: bool) -> Coord<f64> {
    let n = WGS84_F / (2.0 - WGS84_F);
    let n2 = n * n;
    let n3 = n2 * n;
    let a_maj = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

    let northing = if north {
        c.y
    } else {
        c.y - UTM_FALSE_NORTHING_SOUTH
    };
    let xi = northing / (UTM_K0 * a_maj);
    let eta = (c.x - UTM_FALSE_EASTING) / (UTM_K0 * a_maj);

    let beta = [
        n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
        n2 / 48.0 + n3 / 15.0,
        17.0 * n3 / 480.0,
    ];

    let mut xi_p = xi;
    let mut eta_p = eta;
    for (j, b) in beta.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        xi_p -= b * (k * xi).sin() * (k * eta).cosh();
        eta_p -= b * (k * xi).cos() * (k * eta).sinh();
    }

    let chi = (xi_p.sin() / eta_p.cosh()).asin();

    let delta = [
        2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
        7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
        56.0 * n3 / 15.0,
    ];

    let mut lat = chi;
    for (j, d) in delta.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        lat += d * (k * chi).sin();
    }

    let lng = utm_central_meridian_deg(zone).to_radians() + (eta_p.sinh() / xi_p.cos()).atan();

    Coord {
        x: lng.to_degrees(),
        y: lat.to_degrees(),
    }
}
