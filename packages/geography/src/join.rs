//! Yearly disappearance statistics joined onto municipality polygons.
//!
//! Rows of `Base_Desap_TasaValores.csv` are keyed by `CVEGEO` and year.
//! [`enrich`] writes one attribute per `(metric, year)` onto the polygon
//! with the same code, named `_DESAP_{METRIC}_{year}`, and marks the
//! polygon with `_hasDesapData`.

use std::collections::BTreeMap;

use incident_map_geography_models::PolygonFeature;
use incident_map_records::coords::parse_leading_number;
use incident_map_records::encoding::decode_text;
use incident_map_records::fetch::SourceReader;
use incident_map_records::tabular::parse_rows;
use incident_map_records_models::Attributes;
use serde::Serialize;

use crate::GeoError;

/// Join key column.
pub const CODE_FIELD: &str = "CVEGEO";
/// Prefix of every joined attribute.
pub const JOIN_PREFIX: &str = "_DESAP";
/// Attribute set to `"true"` on enriched polygons.
pub const ENRICHED_MARKER: &str = "_hasDesapData";

/// One row of the statistics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisappearanceRow {
    /// Municipality code (`CVEGEO`).
    pub code: String,
    /// State code.
    pub state_code: String,
    /// Municipality code within the state.
    pub municipality_code: String,
    /// Municipality name.
    pub name: String,
    /// Year.
    pub year: i32,
    /// Men reported missing.
    pub men: f64,
    /// Women reported missing.
    pub women: f64,
    /// Total reported missing.
    pub total: f64,
    /// Population.
    pub population: f64,
    /// Rate per 100 000 inhabitants.
    pub rate_per_100k: f64,
}

impl DisappearanceRow {
    /// `(attribute suffix, value)` pairs written by the joiner.
    #[must_use]
    pub const fn metrics(&self) -> [(&'static str, f64); 5] {
        [
            ("TOTAL", self.total),
            ("H", self.men),
            ("M", self.women),
            ("POB", self.population),
            ("TASA", self.rate_per_100k),
        ]
    }
}

/// Statistics grouped by code, then by year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisappearanceStats {
    by_code: BTreeMap<String, BTreeMap<i32, DisappearanceRow>>,
}

impl DisappearanceStats {
    /// Yearly rows for `code`.
    #[must_use]
    pub fn for_code(&self, code: &str) -> Option<&BTreeMap<i32, DisappearanceRow>> {
        self.by_code.get(code)
    }

    /// Distinct sorted years present in the table.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .by_code
            .values()
            .flat_map(BTreeMap::keys)
            .copied()
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Number of distinct codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Whether no rows were kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

fn metric(row: &Attributes, key: &str) -> f64 {
    row.get(key).and_then(parse_leading_number).unwrap_or(0.0)
}

fn text(row: &Attributes, key: &str) -> String {
    row.get(key).map(str::trim).unwrap_or_default().to_string()
}

/// Parses the statistics table.
///
/// Rows without a code or a positive year are skipped; unparsable metrics
/// count as zero. A later row for the same `(code, year)` replaces an
/// earlier one.
///
/// # Errors
///
/// Returns [`GeoError::Records`] if the table is malformed or has no data
/// rows.
pub fn parse_stats(text_content: &str, uri: &str) -> Result<DisappearanceStats, GeoError> {
    let rows = parse_rows(text_content, uri)?;
    let mut stats = DisappearanceStats::default();
    let mut skipped = 0_usize;

    for row in &rows {
        let code = text(row, CODE_FIELD);
        #[allow(clippy::cast_possible_truncation)]
        let year = row
            .get("Anio")
            .and_then(parse_leading_number)
            .map(|y| y.trunc() as i32)
            .filter(|&y| y > 0);

        let Some(year) = year.filter(|_| !code.is_empty()) else {
            skipped += 1;
            continue;
        };

        let record = DisappearanceRow {
            code: code.clone(),
            state_code: text(row, "CVE_ENT"),
            municipality_code: text(row, "CVE_MUN"),
            name: text(row, "NOMGEO"),
            year,
            men: metric(row, "Hombres"),
            women: metric(row, "Mujeres"),
            total: metric(row, "Total"),
            population: metric(row, "Poblacion"),
            rate_per_100k: metric(row, "TASA_100K"),
        };
        stats.by_code.entry(code).or_default().insert(year, record);
    }

    if skipped > 0 {
        log::debug!("[desap] skipped {skipped} row(s) without code or year");
    }
    log::info!(
        "[desap] {} municipalities, years {:?}",
        stats.len(),
        stats.years()
    );
    Ok(stats)
}

/// Reads and parses the statistics table.
///
/// # Errors
///
/// Returns [`GeoError::Records`] if the source cannot be read or parsed.
pub async fn load_stats(
    reader: &dyn SourceReader,
    uri: &str,
) -> Result<DisappearanceStats, GeoError> {
    let bytes = reader.read(uri).await.map_err(GeoError::from)?;
    parse_stats(&decode_text(&bytes), uri)
}

/// Name of the joined attribute for `metric` in `year`.
#[must_use]
pub fn joined_field(metric: &str, year: i32) -> String {
    format!("{JOIN_PREFIX}_{metric}_{year}")
}

fn format_number(value: f64) -> String {
    value.to_string()
}

/// Adds yearly statistics to every feature whose code appears in `stats`.
/// Features without a match are returned untouched.
#[must_use]
pub fn enrich(features: Vec<PolygonFeature>, stats: &DisappearanceStats) -> Vec<PolygonFeature> {
    features
        .into_iter()
        .map(|mut feature| {
            let code = feature
                .attributes
                .get(CODE_FIELD)
                .map(str::trim)
                .unwrap_or_default();
            if let Some(by_year) = stats.for_code(code) {
                for (year, row) in by_year {
                    for (name, value) in row.metrics() {
                        feature
                            .attributes
                            .insert(joined_field(name, *year), Some(format_number(value)));
                    }
                }
                feature
                    .attributes
                    .insert(ENRICHED_MARKER, Some("true".to_string()));
            }
            feature
        })
        .collect()
}

/// Whether `feature` carries joined statistics.
#[must_use]
pub fn is_enriched(feature: &PolygonFeature) -> bool {
    feature.attributes.get(ENRICHED_MARKER) == Some("true")
}

/// Only the features that matched, re-indexed, as the derived
/// `desapariciones` layer.
#[must_use]
pub fn enriched_only(
    features: Vec<PolygonFeature>,
    stats: &DisappearanceStats,
    layer_id: &str,
    layer_name: &str,
) -> Vec<PolygonFeature> {
    enrich(features, stats)
        .into_iter()
        .filter(is_enriched)
        .enumerate()
        .map(|(index, feature)| PolygonFeature {
            index,
            layer_id: layer_id.to_string(),
            layer_name: layer_name.to_string(),
            ..feature
        })
        .collect()
}
