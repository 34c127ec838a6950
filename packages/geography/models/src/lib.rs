#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Polygon layer types.
//!
//! Geometries use the `GeoJSON` nesting (`[lon, lat]` pairs inside rings
//! inside polygons) so they serialize straight into a `FeatureCollection`.

use incident_map_records_models::Attributes;
use serde::{Deserialize, Serialize};

/// An `[x, y]` coordinate pair. Projected metres before reprojection,
/// `[longitude, latitude]` after.
pub type Coord = [f64; 2];

/// A feature geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// A single position.
    Point(Coord),
    /// Unconnected positions.
    MultiPoint(Vec<Coord>),
    /// A path.
    LineString(Vec<Coord>),
    /// Several paths.
    MultiLineString(Vec<Vec<Coord>>),
    /// Exterior ring followed by holes.
    Polygon(Vec<Vec<Coord>>),
    /// Several polygons.
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
}

impl Geometry {
    /// `GeoJSON` type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::MultiPoint(_) => "MultiPoint",
            Self::LineString(_) => "LineString",
            Self::MultiLineString(_) => "MultiLineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Replaces every coordinate with `f(coordinate)`, keeping the shape.
    #[must_use]
    pub fn map_coords(self, mut f: impl FnMut(Coord) -> Coord) -> Self {
        fn line(coords: Vec<Coord>, f: &mut impl FnMut(Coord) -> Coord) -> Vec<Coord> {
            coords.into_iter().map(|c| f(c)).collect()
        }
        fn rings(
            rings: Vec<Vec<Coord>>,
            f: &mut impl FnMut(Coord) -> Coord,
        ) -> Vec<Vec<Coord>> {
            rings.into_iter().map(|r| line(r, &mut *f)).collect()
        }

        match self {
            Self::Point(c) => Self::Point(f(c)),
            Self::MultiPoint(coords) => Self::MultiPoint(line(coords, &mut f)),
            Self::LineString(coords) => Self::LineString(line(coords, &mut f)),
            Self::MultiLineString(lines) => Self::MultiLineString(rings(lines, &mut f)),
            Self::Polygon(polygon) => Self::Polygon(rings(polygon, &mut f)),
            Self::MultiPolygon(polygons) => Self::MultiPolygon(
                polygons.into_iter().map(|p| rings(p, &mut f)).collect(),
            ),
        }
    }

    /// Calls `f` for every coordinate.
    pub fn for_each_coord(&self, mut f: impl FnMut(Coord)) {
        match self {
            Self::Point(c) => f(*c),
            Self::MultiPoint(coords) | Self::LineString(coords) => {
                coords.iter().copied().for_each(f);
            }
            Self::MultiLineString(lines) | Self::Polygon(lines) => {
                lines.iter().flatten().copied().for_each(f);
            }
            Self::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().copied().for_each(f);
            }
        }
    }
}

/// A polygon-layer feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonFeature {
    /// Geometry in `[longitude, latitude]` once loaded.
    pub geometry: Geometry,
    /// `.dbf` attributes, encoding-repaired, plus any joined fields.
    pub attributes: Attributes,
    /// Position of the feature within its layer.
    pub index: usize,
    /// Owning layer id.
    pub layer_id: String,
    /// Owning layer display name.
    pub layer_name: String,
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Builds a color from components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, alpha])
    }

    /// Alpha component.
    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.0[3]
    }
}

/// Keeps only features whose `field` matches one of `values`, compared
/// accent- and case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilter {
    /// Attribute to test.
    pub field: String,
    /// Accepted values.
    pub values: Vec<String>,
}

/// How a layer's fill color is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerStyle {
    /// Every feature uses the layer color.
    #[default]
    Fixed,
    /// Features cycle through a fixed palette by index.
    IndexPalette,
    /// Layer color, faded or intensified by the sum of `{prefix}_{year}`
    /// fields inside the selected year range.
    Intensity {
        /// Yearly field prefix (e.g. `DPFGE`).
        prefix: String,
    },
}

/// A polygon layer source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Unique identifier (e.g. `"municipios"`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Directory holding the shapefile pair.
    pub base_path: String,
    /// Shapefile stem, without `.shp` / `.dbf`.
    pub file_name: String,
    /// Fill color.
    pub color: Rgba,
    /// Outline color.
    pub stroke_color: Rgba,
    /// Optional allow-list.
    #[serde(default)]
    pub filter: Option<AttributeFilter>,
    /// Fill strategy.
    #[serde(default)]
    pub style: LayerStyle,
}

impl LayerConfig {
    /// URI of the geometry file.
    #[must_use]
    pub fn shp_uri(&self) -> String {
        format!("{}/{}.shp", self.base_path, self.file_name)
    }

    /// URI of the attribute table.
    #[must_use]
    pub fn dbf_uri(&self) -> String {
        format!("{}/{}.dbf", self.base_path, self.file_name)
    }
}
