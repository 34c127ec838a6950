//! Geodesic circles and the irrigation-well zone.

use incident_map_geography_models::{Coord, Rgba};
use incident_map_records::fields::{GRAVE_MUNICIPALITY_ANY, resolve};
use incident_map_records_models::{GeoPosition, IncidentRecord};
use serde::Serialize;

/// WGS84 equatorial radius, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Municipality the well zone is centered on when present.
pub const WELL_ZONE_MUNICIPALITY: &str = "SAN SALVADOR HUIXCOLOTLA";
/// Default well-zone radius, in meters.
pub const WELL_ZONE_RADIUS_M: f64 = 50_000.0;
/// Ring resolution of the well zone.
pub const WELL_ZONE_SEGMENTS: usize = 96;

/// Closed ring of `segments + 1` points at `radius_m` from `center`,
/// using the spherical destination formula. Longitudes are normalized to
/// `[-180, 180)`.
#[must_use]
pub fn geodesic_circle(center: GeoPosition, radius_m: f64, segments: usize) -> Vec<Coord> {
    let segments = segments.max(1);
    let phi1 = center.latitude.to_radians();
    let lambda1 = center.longitude.to_radians();
    let delta = radius_m / EARTH_RADIUS_M;
    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();

    (0..=segments)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let theta = std::f64::consts::TAU * i as f64 / segments as f64;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let sin_phi2 = sin_phi1.mul_add(cos_delta, cos_phi1 * sin_delta * cos_theta);
            let phi2 = sin_phi2.asin();
            let y = sin_theta * sin_delta * cos_phi1;
            let x = sin_phi1.mul_add(-sin_phi2, cos_delta);
            let lambda2 = lambda1 + y.atan2(x);

            let lon = (lambda2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
            [lon, phi2.to_degrees()]
        })
        .collect()
}

/// Circle marking the area with a high density of irrigation wells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellZone {
    /// Center of the circle.
    pub center: GeoPosition,
    /// Radius in meters.
    pub radius_m: f64,
    /// Closed ring.
    pub ring: Vec<Coord>,
    /// Fill color.
    pub fill: Rgba,
    /// Outline color.
    pub stroke: Rgba,
}

/// Builds the well zone around the first grave in
/// [`WELL_ZONE_MUNICIPALITY`], or the first grave if none is there.
/// Returns `None` when `graves` is empty.
#[must_use]
pub fn well_zone(graves: &[IncidentRecord], radius_m: f64) -> Option<WellZone> {
    let target = graves
        .iter()
        .find(|g| {
            resolve(&g.attributes, GRAVE_MUNICIPALITY_ANY).to_uppercase() == WELL_ZONE_MUNICIPALITY
        })
        .or_else(|| graves.first())?;

    Some(WellZone {
        center: target.position,
        radius_m,
        ring: geodesic_circle(target.position, radius_m, WELL_ZONE_SEGMENTS),
        fill: Rgba::new(49, 130, 206, 120),
        stroke: Rgba::new(49, 130, 206, 220),
    })
}
