//! ESRI shapefile (`.shp`) geometry decoding.
//!
//! [`ShpReader`] walks the main file one record at a time so callers can
//! interleave decoding with other work. Z and M payloads are ignored;
//! only the 2D coordinates are kept.

use std::io::Cursor;

use ::shapefile::{PolygonRing, Shape};
use geo::{Intersects, Winding};
use incident_map_geography_models::{Coord, Geometry};

use crate::GeoError;

fn shp_error(e: impl std::fmt::Display) -> GeoError {
    GeoError::Shapefile {
        message: e.to_string(),
    }
}

/// Point types that carry planar `x`/`y`.
trait Planar {
    fn xy(&self) -> Coord;
}

impl Planar for ::shapefile::Point {
    fn xy(&self) -> Coord {
        [self.x, self.y]
    }
}

impl Planar for ::shapefile::PointM {
    fn xy(&self) -> Coord {
        [self.x, self.y]
    }
}

impl Planar for ::shapefile::PointZ {
    fn xy(&self) -> Coord {
        [self.x, self.y]
    }
}

/// Iterates over the records of an in-memory `.shp` file.
pub struct ShpReader<'a> {
    inner: ::shapefile::ShapeReader<Cursor<&'a [u8]>>,
}

impl<'a> ShpReader<'a> {
    /// Validates the file header.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Shapefile`] if the header is missing or carries
    /// the wrong file code.
    pub fn new(bytes: &'a [u8]) -> Result<Self, GeoError> {
        let inner = ::shapefile::ShapeReader::new(Cursor::new(bytes)).map_err(shp_error)?;
        Ok(Self { inner })
    }

    /// Decodes shapes in file order.
    ///
    /// Yields `Ok(None)` for null shapes and for shape types that have no
    /// geometry counterpart (e.g. `MultiPatch`).
    pub fn shapes(&mut self) -> impl Iterator<Item = Result<Option<Geometry>, GeoError>> + '_ {
        self.inner
            .iter_shapes()
            .map(|shape| shape.map(to_geometry).map_err(shp_error))
    }
}

fn points<P: Planar>(points: &[P]) -> Vec<Coord> {
    points.iter().map(Planar::xy).collect()
}

fn parts<P: Planar>(parts: &[Vec<P>]) -> Vec<Vec<Coord>> {
    parts.iter().map(|part| points(part)).collect()
}

fn rings<P: Planar>(rings: &[PolygonRing<P>]) -> Vec<Vec<Coord>> {
    rings.iter().map(|ring| points(ring.points())).collect()
}

fn multipoint(mut coords: Vec<Coord>) -> Geometry {
    if coords.len() == 1 {
        Geometry::Point(coords.remove(0))
    } else {
        Geometry::MultiPoint(coords)
    }
}

fn polyline(mut parts: Vec<Vec<Coord>>) -> Geometry {
    if parts.len() == 1 {
        Geometry::LineString(parts.remove(0))
    } else {
        Geometry::MultiLineString(parts)
    }
}

fn to_geometry(shape: Shape) -> Option<Geometry> {
    Some(match shape {
        Shape::NullShape => return None,
        Shape::Point(p) => Geometry::Point(p.xy()),
        Shape::PointM(p) => Geometry::Point(p.xy()),
        Shape::PointZ(p) => Geometry::Point(p.xy()),
        Shape::Multipoint(m) => multipoint(points(m.points())),
        Shape::MultipointM(m) => multipoint(points(m.points())),
        Shape::MultipointZ(m) => multipoint(points(m.points())),
        Shape::Polyline(l) => polyline(parts(l.parts())),
        Shape::PolylineM(l) => polyline(parts(l.parts())),
        Shape::PolylineZ(l) => polyline(parts(l.parts())),
        Shape::Polygon(p) => assemble_polygons(rings(p.rings())),
        Shape::PolygonM(p) => assemble_polygons(rings(p.rings())),
        Shape::PolygonZ(p) => assemble_polygons(rings(p.rings())),
        Shape::Multipatch(_) => {
            log::warn!("Skipping unsupported multipatch shape");
            return None;
        }
    })
}

fn to_line_string(ring: &[Coord]) -> geo::LineString<f64> {
    ring.iter().map(|&[x, y]| geo::coord! { x: x, y: y }).collect()
}

/// Groups rings into polygons: clockwise rings are exteriors,
/// counter-clockwise rings are holes of the first exterior that touches
/// their first vertex. Unclaimed holes become reversed exteriors.
fn assemble_polygons(rings: Vec<Vec<Coord>>) -> Geometry {
    let mut polygons: Vec<Vec<Vec<Coord>>> = Vec::new();
    let mut outlines: Vec<geo::Polygon<f64>> = Vec::new();
    let mut holes: Vec<Vec<Coord>> = Vec::new();

    for ring in rings {
        if to_line_string(&ring).is_cw() {
            outlines.push(geo::Polygon::new(to_line_string(&ring), vec![]));
            polygons.push(vec![ring]);
        } else {
            holes.push(ring);
        }
    }

    for mut hole in holes {
        let owner = hole.first().and_then(|&[x, y]| {
            let point = geo::Point::new(x, y);
            outlines.iter().position(|outline| outline.intersects(&point))
        });
        if let Some(i) = owner {
            polygons[i].push(hole);
        } else {
            hole.reverse();
            polygons.push(vec![hole]);
        }
    }

    if polygons.len() == 1 {
        Geometry::Polygon(polygons.remove(0))
    } else {
        Geometry::MultiPolygon(polygons)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const FILE_CODE: i32 = 9994;
    const HEADER_LEN: usize = 100;

    /// Builds a `.shp` file from `(shape_type, content_after_type)` records.
    pub fn build_shp(records: &[(i32, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (i, (shape_type, payload)) in records.iter().enumerate() {
            let content_len = 4 + payload.len();
            body.extend_from_slice(&i32::try_from(i + 1).unwrap().to_be_bytes());
            body.extend_from_slice(&i32::try_from(content_len / 2).unwrap().to_be_bytes());
            body.extend_from_slice(&shape_type.to_le_bytes());
            body.extend_from_slice(payload);
        }
        let mut file = vec![0_u8; HEADER_LEN];
        file[0..4].copy_from_slice(&FILE_CODE.to_be_bytes());
        let total = i32::try_from((HEADER_LEN + body.len()) / 2).unwrap();
        file[24..28].copy_from_slice(&total.to_be_bytes());
        file[28..32].copy_from_slice(&1000_i32.to_le_bytes());
        let file_type = records.iter().map(|r| r.0).find(|&t| t != 0).unwrap_or(0);
        file[32..36].copy_from_slice(&file_type.to_le_bytes());
        file.extend_from_slice(&body);
        file
    }

    pub fn point_payload([x, y]: Coord) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&x.to_le_bytes());
        out.extend_from_slice(&y.to_le_bytes());
        out
    }

    pub fn poly_payload(parts: &[Vec<Coord>]) -> Vec<u8> {
        let mut out = vec![0_u8; 32];
        let num_points: usize = parts.iter().map(Vec::len).sum();
        out.extend_from_slice(&i32::try_from(parts.len()).unwrap().to_le_bytes());
        out.extend_from_slice(&i32::try_from(num_points).unwrap().to_le_bytes());
        let mut start = 0;
        for part in parts {
            out.extend_from_slice(&i32::try_from(start).unwrap().to_le_bytes());
            start += part.len();
        }
        for part in parts {
            for &c in part {
                out.extend(point_payload(c));
            }
        }
        out
    }

    fn clockwise_square(x0: f64, y0: f64, size: f64) -> Vec<Coord> {
        vec![
            [x0, y0],
            [x0, y0 + size],
            [x0 + size, y0 + size],
            [x0 + size, y0],
            [x0, y0],
        ]
    }

    fn reversed(mut ring: Vec<Coord>) -> Vec<Coord> {
        ring.reverse();
        ring
    }

    fn decode(file: &[u8]) -> Vec<Option<Geometry>> {
        ShpReader::new(file)
            .unwrap()
            .shapes()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn decodes_points_and_null_shapes() {
        let file = build_shp(&[(1, point_payload([1.0, 2.0])), (0, Vec::new())]);
        assert_eq!(decode(&file), vec![Some(Geometry::Point([1.0, 2.0])), None]);
    }

    #[test]
    fn polygon_with_hole() {
        let outer = clockwise_square(0.0, 0.0, 10.0);
        let hole = reversed(clockwise_square(2.0, 2.0, 2.0));
        let file = build_shp(&[(5, poly_payload(&[outer.clone(), hole.clone()]))]);

        assert_eq!(decode(&file), vec![Some(Geometry::Polygon(vec![outer, hole]))]);
    }

    #[test]
    fn multiple_exteriors_become_multipolygon() {
        let a = clockwise_square(0.0, 0.0, 1.0);
        let b = clockwise_square(5.0, 5.0, 1.0);
        let file = build_shp(&[(5, poly_payload(&[a.clone(), b.clone()]))]);

        assert_eq!(
            decode(&file),
            vec![Some(Geometry::MultiPolygon(vec![vec![a], vec![b]]))]
        );
    }

    #[test]
    fn orphan_hole_becomes_its_own_polygon() {
        let a = clockwise_square(0.0, 0.0, 1.0);
        let stray = reversed(clockwise_square(50.0, 50.0, 1.0));
        let file = build_shp(&[(5, poly_payload(&[a, stray.clone()]))]);

        let shapes = decode(&file);
        let [Some(Geometry::MultiPolygon(polygons))] = shapes.as_slice() else {
            panic!("expected multipolygon");
        };
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[1][0], reversed(stray));
    }

    #[test]
    fn polylines() {
        let line = vec![[0.0, 0.0], [1.0, 1.0]];
        let file = build_shp(&[
            (3, poly_payload(std::slice::from_ref(&line))),
            (3, poly_payload(&[line.clone(), line.clone()])),
        ]);
        let shapes = decode(&file);
        assert_eq!(shapes[0], Some(Geometry::LineString(line.clone())));
        assert_eq!(
            shapes[1],
            Some(Geometry::MultiLineString(vec![line.clone(), line]))
        );
    }

    #[test]
    fn single_point_multipoint_is_a_point() {
        let mut payload = vec![0_u8; 32];
        payload.extend_from_slice(&1_i32.to_le_bytes());
        payload.extend(point_payload([3.0, 4.0]));

        let file = build_shp(&[(8, payload)]);
        assert_eq!(decode(&file), vec![Some(Geometry::Point([3.0, 4.0]))]);
    }

    #[test]
    fn rejects_bad_headers_and_truncation() {
        assert!(ShpReader::new(&[0_u8; 10]).is_err());
        assert!(ShpReader::new(&[0_u8; 100]).is_err());

        let mut file = build_shp(&[
            (1, point_payload([1.0, 2.0])),
            (1, point_payload([3.0, 4.0])),
        ]);
        file.truncate(file.len() - 4);
        let mut reader = ShpReader::new(&file).unwrap();
        let mut shapes = reader.shapes();
        assert!(shapes.next().unwrap().is_ok());
        assert!(shapes.next().unwrap().is_err());
    }
}
