//! Lambert Conformal Conic (2SP) for the regional CRS.
//!
//! Source shapefiles use INEGI's Mexico-wide LCC: standard parallels
//! 17.5° and 29.5°, origin latitude 12°, central meridian −102°, false
//! easting 2 500 000 m, GRS80 ellipsoid, no datum shift. [`reproject`]
//! converts those projected metres to WGS84 `[longitude, latitude]`.

use incident_map_geography_models::{Coord, Geometry};
use proj4rs::Proj;

use crate::GeoError;

/// INEGI "Mexico ITRF2008 / LCC" as a proj string.
pub const MEXICO_INEGI_LCC: &str = "+proj=lcc +lat_1=17.5 +lat_2=29.5 +lat_0=12 +lon_0=-102 \
     +x_0=2500000 +y_0=0 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// Geographic WGS84.
pub const WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs";

fn projection_error(message: impl Into<String>) -> GeoError {
    GeoError::Projection {
        message: message.into(),
    }
}

/// A projected grid paired with geographic WGS84.
#[derive(Clone)]
pub struct LambertConformalConic {
    grid: Proj,
    geographic: Proj,
}

impl LambertConformalConic {
    /// Builds the conversion from a proj string describing the grid.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Projection`] if either definition is rejected.
    pub fn from_proj_string(definition: &str) -> Result<Self, GeoError> {
        let grid = Proj::from_proj_string(definition)
            .map_err(|e| projection_error(format!("invalid grid definition: {e}")))?;
        let geographic = Proj::from_proj_string(WGS84)
            .map_err(|e| projection_error(format!("invalid WGS84 definition: {e}")))?;
        Ok(Self { grid, geographic })
    }

    /// INEGI parameters used by the state shapefiles.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Projection`] if the definition is rejected.
    pub fn mexico_inegi() -> Result<Self, GeoError> {
        Self::from_proj_string(MEXICO_INEGI_LCC)
    }

    /// Geographic `[lon, lat]` degrees to projected `[x, y]` metres.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Projection`] for non-finite input, latitudes at
    /// the poles, or a failed transform.
    pub fn forward(&self, [lon, lat]: Coord) -> Result<Coord, GeoError> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() >= 90.0 {
            return Err(projection_error(format!("cannot project [{lon}, {lat}]")));
        }
        let mut point = (lon.to_radians(), lat.to_radians());
        proj4rs::transform::transform(&self.geographic, &self.grid, &mut point)
            .map_err(|e| projection_error(format!("cannot project [{lon}, {lat}]: {e}")))?;
        finite([point.0, point.1])
    }

    /// Projected `[x, y]` metres to geographic `[lon, lat]` degrees.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Projection`] for non-finite input or a failed
    /// transform.
    pub fn inverse(&self, [x, y]: Coord) -> Result<Coord, GeoError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(projection_error(format!("cannot unproject [{x}, {y}]")));
        }
        let mut point = (x, y);
        proj4rs::transform::transform(&self.grid, &self.geographic, &mut point)
            .map_err(|e| projection_error(format!("cannot unproject [{x}, {y}]: {e}")))?;
        finite([point.0.to_degrees(), point.1.to_degrees()])
    }
}

fn finite(coord: Coord) -> Result<Coord, GeoError> {
    if coord.iter().all(|v| v.is_finite()) {
        Ok(coord)
    } else {
        Err(projection_error(format!("transform produced {coord:?}")))
    }
}

/// Converts a projected geometry to `[longitude, latitude]`.
///
/// Coordinates that fail to convert are logged and kept as they were; a
/// bad vertex never drops the whole feature.
#[must_use]
pub fn reproject(geometry: Geometry, projection: &LambertConformalConic) -> Geometry {
    geometry.map_coords(|coord| match projection.inverse(coord) {
        Ok(lon_lat) => lon_lat,
        Err(e) => {
            log::warn!("Keeping untransformed coordinate: {e}");
            coord
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcc() -> LambertConformalConic {
        LambertConformalConic::mexico_inegi().unwrap()
    }

    #[test]
    fn origin_maps_to_false_easting() {
        let [lon, lat] = lcc().inverse([2_500_000.0, 0.0]).unwrap();
        assert!((lon + 102.0).abs() < 1e-9);
        assert!((lat - 12.0).abs() < 1e-9);
    }

    #[test]
    fn puebla_lands_in_puebla() {
        let [x, y] = lcc().forward([-98.2063, 19.0414]).unwrap();
        assert!(x > 2_800_000.0 && x < 3_000_000.0, "x = {x}");
        assert!(y > 700_000.0 && y < 900_000.0, "y = {y}");
    }

    #[test]
    fn known_grid_point_unprojects() {
        let [lon, lat] = lcc().inverse([2_900_000.0, 780_000.0]).unwrap();
        assert!((lon + 98.192_509_0).abs() < 1e-6, "lon = {lon}");
        assert!((lat - 18.967_332_7).abs() < 1e-6, "lat = {lat}");
    }

    #[test]
    fn rejects_bad_definitions() {
        assert!(matches!(
            LambertConformalConic::from_proj_string("+proj=nonsense"),
            Err(GeoError::Projection { .. })
        ));
    }

    #[test]
    fn reproject_round_trips_points() {
        let lcc = lcc();
        for projected in [
            [2_900_000.0, 780_000.0],
            [2_950_123.5, 812_345.25],
            [2_400_000.0, 1_200_000.0],
        ] {
            let Geometry::Point(lon_lat) = reproject(Geometry::Point(projected), &lcc) else {
                panic!("point stayed a point");
            };
            let back = lcc.forward(lon_lat).unwrap();
            assert!((back[0] - projected[0]).abs() < 1e-4, "{back:?}");
            assert!((back[1] - projected[1]).abs() < 1e-4, "{back:?}");
        }
    }

    #[test]
    fn reproject_passes_bad_coordinates_through() {
        let lcc = lcc();
        let geometry = Geometry::LineString(vec![[f64::NAN, 0.0], [2_900_000.0, 780_000.0]]);
        let Geometry::LineString(coords) = reproject(geometry, &lcc) else {
            panic!("line stayed a line");
        };
        assert!(coords[0][0].is_nan());
        assert!(coords[1][0] < -90.0);
    }

    #[test]
    fn reproject_handles_polygons_with_holes() {
        let lcc = lcc();
        let ring = |cx: f64| {
            vec![
                [cx, 780_000.0],
                [cx + 1000.0, 780_000.0],
                [cx + 1000.0, 781_000.0],
                [cx, 780_000.0],
            ]
        };
        let geometry = Geometry::Polygon(vec![ring(2_900_000.0), ring(2_900_200.0)]);
        let projected = reproject(geometry, &lcc);
        projected.for_each_coord(|[lon, lat]| {
            assert!((-99.0..-97.0).contains(&lon), "lon = {lon}");
            assert!((18.0..20.0).contains(&lat), "lat = {lat}");
        });
    }
}
