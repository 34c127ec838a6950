//! Fill and outline colors for polygon layers.

use incident_map_filter::YearRange;
use incident_map_geography_models::{LayerConfig, LayerStyle, PolygonFeature, Rgba};
use incident_map_records::coords::parse_leading_number;
use incident_map_records_models::Attributes;
use serde::Serialize;

/// Palette cycled through by [`LayerStyle::IndexPalette`] layers.
pub const INDEX_PALETTE: [Rgba; 15] = [
    Rgba::new(65, 105, 225, 80),
    Rgba::new(50, 205, 50, 80),
    Rgba::new(255, 165, 0, 80),
    Rgba::new(138, 43, 226, 80),
    Rgba::new(255, 99, 71, 80),
    Rgba::new(0, 206, 209, 80),
    Rgba::new(255, 215, 0, 80),
    Rgba::new(199, 21, 133, 80),
    Rgba::new(0, 191, 255, 80),
    Rgba::new(154, 205, 50, 80),
    Rgba::new(255, 20, 147, 80),
    Rgba::new(64, 224, 208, 80),
    Rgba::new(255, 140, 0, 80),
    Rgba::new(186, 85, 211, 80),
    Rgba::new(60, 179, 113, 80),
];

/// Outline alpha derived from a fill color.
pub const BORDER_ALPHA: u8 = 200;

/// Alpha used for features with nothing to show.
pub const EMPTY_ALPHA: u8 = 20;

/// Palette color for the feature at `index`.
#[must_use]
pub const fn index_color(index: usize) -> Rgba {
    INDEX_PALETTE[index % INDEX_PALETTE.len()]
}

/// Outline for a given fill.
#[must_use]
pub const fn border_color(fill: Rgba) -> Rgba {
    fill.with_alpha(BORDER_ALPHA)
}

fn yearly_field(prefix: &str, year: i32) -> String {
    format!("{prefix}_{year}")
}

/// Sum of the numeric `{prefix}_{year}` attributes for every year in
/// `range`. Missing or non-numeric values contribute nothing.
#[must_use]
pub fn disappearances_in_range(attributes: &Attributes, prefix: &str, range: YearRange) -> f64 {
    range
        .years()
        .filter_map(|year| attributes.get(&yearly_field(prefix, year)))
        .filter_map(|v| {
            let v = v.trim();
            if v.is_empty() {
                return Some(0.0);
            }
            v.parse::<f64>().ok().filter(|n| n.is_finite())
        })
        .sum()
}

/// Whether any attribute is a `{prefix}_{year}` series field.
#[must_use]
pub fn has_yearly_fields(attributes: &Attributes, prefix: &str) -> bool {
    let marker = format!("{prefix}_");
    attributes.keys().any(|k| k.starts_with(&marker))
}

/// Per-year integer counts within `range`, skipping years whose value is
/// missing or does not start with a number.
#[must_use]
pub fn yearly_breakdown(attributes: &Attributes, prefix: &str, range: YearRange) -> Vec<(i32, i64)> {
    range
        .years()
        .filter_map(|year| {
            let raw = attributes.get(&yearly_field(prefix, year))?;
            #[allow(clippy::cast_possible_truncation)]
            let count = parse_leading_number(raw)?.trunc() as i64;
            Some((year, count))
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn scale(channel: u8, factor: f64) -> u8 {
    to_channel(f64::from(channel) * factor)
}

/// Intensity-scaled color: `sqrt(value / max)` drives both opacity
/// (30 to 240) and darkening (down to 60% brightness).
#[must_use]
pub fn intensity_color(base: Rgba, value: f64, max: f64) -> Rgba {
    if max <= 0.0 || value <= 0.0 {
        return base.with_alpha(EMPTY_ALPHA);
    }

    let intensity = (value / max).sqrt();
    let darken = 0.4_f64.mul_add(-intensity, 1.0);
    let [r, g, b, _] = base.0;
    Rgba::new(
        scale(r, darken),
        scale(g, darken),
        scale(b, darken),
        to_channel(210.0_f64.mul_add(intensity, 30.0)),
    )
}

/// Resolved colors for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeaturePaint {
    /// Fill color.
    pub fill: Rgba,
    /// Outline color.
    pub stroke: Rgba,
}

/// Colors for every feature of a layer, in order.
///
/// Intensity layers only shade by value when a year `range` is given;
/// otherwise they fall back to the layer's fixed colors.
#[must_use]
pub fn paint_layer(
    config: &LayerConfig,
    features: &[PolygonFeature],
    range: Option<YearRange>,
) -> Vec<FeaturePaint> {
    let fixed = FeaturePaint {
        fill: config.color,
        stroke: config.stroke_color,
    };

    match (&config.style, range) {
        (LayerStyle::Intensity { prefix }, Some(range)) => {
            let totals: Vec<f64> = features
                .iter()
                .map(|f| disappearances_in_range(&f.attributes, prefix, range))
                .collect();
            let max = totals.iter().copied().fold(0.0, f64::max);
            log::debug!("[{}] intensity max {max} over {range:?}", config.id);

            totals
                .into_iter()
                .map(|total| {
                    let fill = intensity_color(config.color, total, max);
                    FeaturePaint {
                        fill,
                        stroke: border_color(fill),
                    }
                })
                .collect()
        }
        (LayerStyle::IndexPalette, _) => features
            .iter()
            .map(|f| {
                let fill = index_color(f.index);
                FeaturePaint {
                    fill,
                    stroke: border_color(fill),
                }
            })
            .collect(),
        _ => vec![fixed; features.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_map_geography_models::Geometry;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    fn feature(index: usize, pairs: &[(&str, &str)]) -> PolygonFeature {
        PolygonFeature {
            geometry: Geometry::Point([-97.5, 18.9]),
            attributes: attrs(pairs),
            index,
            layer_id: "corredor".to_string(),
            layer_name: "Corredor".to_string(),
        }
    }

    fn corridor(style: LayerStyle) -> LayerConfig {
        LayerConfig {
            id: "corredor".to_string(),
            name: "Corredor".to_string(),
            base_path: "/Desap2014".to_string(),
            file_name: "corredor".to_string(),
            color: Rgba::new(220, 53, 69, 100),
            stroke_color: Rgba::new(220, 53, 69, 220),
            filter: None,
            style,
        }
    }

    #[test]
    fn palette_cycles_by_index() {
        assert_eq!(index_color(0), Rgba::new(65, 105, 225, 80));
        assert_eq!(index_color(15), index_color(0));
        assert_eq!(index_color(16), Rgba::new(50, 205, 50, 80));
        assert_eq!(border_color(index_color(2)), Rgba::new(255, 165, 0, 200));
    }

    #[test]
    fn sums_numeric_fields_in_range() {
        let a = attrs(&[
            ("DPFGE_2014", "3"),
            ("DPFGE_2015", "2.5"),
            ("DPFGE_2016", "n/d"),
            ("DPFGE_2017", "10"),
        ]);
        let total = disappearances_in_range(&a, "DPFGE", YearRange::new(2014, 2016));
        assert!((total - 5.5).abs() < f64::EPSILON);
        assert!(disappearances_in_range(&a, "DPFGE", YearRange::new(2000, 2001)).abs() < f64::EPSILON);
    }

    #[test]
    fn breakdown_truncates_and_skips_non_numeric_years() {
        let a = attrs(&[("DPFGE_2014", "3.9"), ("DPFGE_2015", "x"), ("DPFGE_2016", "7")]);
        assert_eq!(
            yearly_breakdown(&a, "DPFGE", YearRange::new(2013, 2016)),
            vec![(2014, 3), (2016, 7)]
        );
        assert!(has_yearly_fields(&a, "DPFGE"));
        assert!(!has_yearly_fields(&attrs(&[("NOMGEO", "Tepeaca")]), "DPFGE"));
    }

    #[test]
    fn intensity_darkens_and_saturates() {
        let base = Rgba::new(220, 53, 69, 100);
        assert_eq!(intensity_color(base, 0.0, 10.0), base.with_alpha(20));
        assert_eq!(intensity_color(base, 4.0, 0.0), base.with_alpha(20));
        assert_eq!(intensity_color(base, 10.0, 10.0), Rgba::new(132, 32, 41, 240));
        // sqrt(0.25) = 0.5 -> alpha 135, factor 0.8
        assert_eq!(intensity_color(base, 2.5, 10.0), Rgba::new(176, 42, 55, 135));
    }

    #[test]
    fn intensity_layer_without_range_uses_fixed_colors() {
        let config = corridor(LayerStyle::Intensity {
            prefix: "DPFGE".to_string(),
        });
        let features = [feature(0, &[("DPFGE_2014", "4")])];
        let paint = paint_layer(&config, &features, None);
        assert_eq!(paint[0].fill, config.color);
        assert_eq!(paint[0].stroke, config.stroke_color);
    }

    #[test]
    fn intensity_layer_scales_against_layer_max() {
        let config = corridor(LayerStyle::Intensity {
            prefix: "DPFGE".to_string(),
        });
        let features = [
            feature(0, &[("DPFGE_2014", "10")]),
            feature(1, &[("DPFGE_2014", "0")]),
        ];
        let paint = paint_layer(&config, &features, Some(YearRange::new(2014, 2014)));
        assert_eq!(paint[0].fill.alpha(), 240);
        assert_eq!(paint[0].stroke.alpha(), 200);
        assert_eq!(paint[1].fill.alpha(), 20);
    }

    #[test]
    fn palette_layer_colors_by_index() {
        let features = [feature(0, &[]), feature(1, &[])];
        let paint = paint_layer(&corridor(LayerStyle::IndexPalette), &features, None);
        assert_eq!(paint[1].fill, index_color(1));
        assert_eq!(paint[1].stroke, index_color(1).with_alpha(200));
    }
}
