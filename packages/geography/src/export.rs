//! `GeoJSON` export of polygon layers.

use geojson::{Feature, FeatureCollection, Value};
use incident_map_geography_models::{Coord, Geometry, PolygonFeature};
use serde_json::{Map, Value as JsonValue};

use crate::choropleth::FeaturePaint;

type JsonObject = Map<String, JsonValue>;

fn position(c: Coord) -> Vec<f64> {
    c.to_vec()
}

fn line(coords: &[Coord]) -> Vec<Vec<f64>> {
    coords.iter().copied().map(position).collect()
}

fn rings(rings: &[Vec<Coord>]) -> Vec<Vec<Vec<f64>>> {
    rings.iter().map(|r| line(r)).collect()
}

/// Converts a geometry to its `geojson` value.
#[must_use]
pub fn geometry_value(geometry: &Geometry) -> Value {
    match geometry {
        Geometry::Point(c) => Value::Point(position(*c)),
        Geometry::MultiPoint(cs) => Value::MultiPoint(line(cs)),
        Geometry::LineString(cs) => Value::LineString(line(cs)),
        Geometry::MultiLineString(ls) => Value::MultiLineString(rings(ls)),
        Geometry::Polygon(rs) => Value::Polygon(rings(rs)),
        Geometry::MultiPolygon(ps) => Value::MultiPolygon(ps.iter().map(|p| rings(p)).collect()),
    }
}

fn properties(feature: &PolygonFeature, paint: Option<&FeaturePaint>) -> JsonObject {
    let mut props: JsonObject = feature
        .attributes
        .iter()
        .map(|(k, v)| {
            (
                k.to_string(),
                v.map_or(JsonValue::Null, |v| JsonValue::String(v.to_string())),
            )
        })
        .collect();

    props.insert("_index".to_string(), JsonValue::from(feature.index));
    props.insert(
        "_layerId".to_string(),
        JsonValue::String(feature.layer_id.clone()),
    );
    props.insert(
        "_layerName".to_string(),
        JsonValue::String(feature.layer_name.clone()),
    );

    if let Some(paint) = paint {
        props.insert("_fillColor".to_string(), JsonValue::from(paint.fill.0.to_vec()));
        props.insert(
            "_lineColor".to_string(),
            JsonValue::from(paint.stroke.0.to_vec()),
        );
    }

    props
}

/// Builds a feature collection from a layer, optionally with the colors
/// computed by [`crate::choropleth::paint_layer`] (matched by position).
#[must_use]
pub fn feature_collection(
    features: &[PolygonFeature],
    paint: Option<&[FeaturePaint]>,
) -> FeatureCollection {
    let features = features
        .iter()
        .enumerate()
        .map(|(i, feature)| Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geometry_value(&feature.geometry))),
            id: None,
            properties: Some(properties(feature, paint.and_then(|p| p.get(i)))),
            foreign_members: None,
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_map_geography_models::Rgba;

    fn square() -> PolygonFeature {
        PolygonFeature {
            geometry: Geometry::Polygon(vec![vec![
                [-98.0, 19.0],
                [-98.0, 19.1],
                [-97.9, 19.1],
                [-98.0, 19.0],
            ]]),
            attributes: [("NOMGEO", "Tepeaca"), ("CVEGEO", "21164")]
                .into_iter()
                .collect(),
            index: 3,
            layer_id: "municipios".to_string(),
            layer_name: "Municipios de Puebla".to_string(),
        }
    }

    #[test]
    fn carries_bookkeeping_properties() {
        let collection = feature_collection(&[square()], None);
        let props = collection.features[0].properties.as_ref().unwrap();

        assert_eq!(props["NOMGEO"], "Tepeaca");
        assert_eq!(props["_index"], 3);
        assert_eq!(props["_layerId"], "municipios");
        assert!(!props.contains_key("_fillColor"));
    }

    #[test]
    fn writes_paint_and_geometry() {
        let paint = [FeaturePaint {
            fill: Rgba::new(1, 2, 3, 4),
            stroke: Rgba::new(1, 2, 3, 200),
        }];
        let collection = feature_collection(&[square()], Some(&paint[..]));
        let feature = &collection.features[0];
        let props = feature.properties.as_ref().unwrap();

        assert_eq!(props["_fillColor"], serde_json::json!([1, 2, 3, 4]));
        let Some(geometry) = &feature.geometry else {
            panic!("missing geometry");
        };
        let Value::Polygon(rings) = &geometry.value else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0][1], vec![-98.0, 19.1]);
    }
}
