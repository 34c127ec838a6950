#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-category summaries of incident points.
//!
//! Records are grouped by a resolved category (grave modality by default),
//! counted, colored by keyword, and wrapped in a convex hull when the group
//! has at least three points.

pub mod circle;
pub mod hull;
pub mod palette;

use incident_map_geography_models::{Coord, Rgba};
use incident_map_records::fields::{GRAVE_MODALITY, resolve};
use incident_map_records_models::{GeoPosition, IncidentRecord};
use serde::Serialize;

/// Category given to records without a modality.
pub const UNCATEGORIZED: &str = "SIN MODALIDAD";

/// Category whose legend entry describes the well zone.
pub const WELL_CATEGORY: &str = "POZO PARA RIEGO";

/// Minimum group size that gets a hull.
pub const MIN_HULL_POINTS: usize = 3;

/// Summary of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAggregate {
    /// Uppercased category.
    pub category: String,
    /// Keyword color.
    pub color: Rgba,
    /// Number of records in the category.
    pub count: usize,
    /// Hull around the category's points, counter-clockwise and open.
    /// `None` for groups under [`MIN_HULL_POINTS`].
    pub hull: Option<Vec<GeoPosition>>,
}

impl CategoryAggregate {
    /// Legend text for the category.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.category.trim().eq_ignore_ascii_case(WELL_CATEGORY) {
            "Zona de alta densidad de pozos para riego"
        } else {
            &self.category
        }
    }

    /// Outline color for the hull.
    #[must_use]
    pub const fn outline(&self) -> Rgba {
        self.color.with_alpha(220)
    }
}

/// Grave modality, trimmed and uppercased, or [`UNCATEGORIZED`].
#[must_use]
pub fn modality_category(record: &IncidentRecord) -> String {
    let value = resolve(&record.attributes, GRAVE_MODALITY);
    if value.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        value.to_uppercase()
    }
}

/// Groups `records` by `category_of`, then counts, colors, and hulls each
/// group. Sorted by descending count; ties keep first-seen order.
pub fn compute_hulls<'a, I, F>(records: I, category_of: F) -> Vec<CategoryAggregate>
where
    I: IntoIterator<Item = &'a IncidentRecord>,
    F: Fn(&IncidentRecord) -> String,
{
    let mut groups: Vec<(String, Vec<Coord>)> = Vec::new();

    for record in records {
        let category = category_of(record).to_uppercase();
        let point = record.position.to_array();
        match groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, points)) => points.push(point),
            None => groups.push((category, vec![point])),
        }
    }

    let mut aggregates: Vec<CategoryAggregate> = groups
        .into_iter()
        .map(|(category, points)| {
            let hull = (points.len() >= MIN_HULL_POINTS).then(|| {
                hull::convex_hull(&points)
                    .into_iter()
                    .filter_map(|[lon, lat]| GeoPosition::new(lon, lat))
                    .collect()
            });
            CategoryAggregate {
                color: palette::category_color(&category),
                count: points.len(),
                hull,
                category,
            }
        })
        .collect();

    aggregates.sort_by(|a, b| b.count.cmp(&a.count));
    log::debug!("[hulls] {} categories", aggregates.len());
    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_map_records_models::{Attributes, IncidentKind};

    fn grave(lon: f64, lat: f64, modality: &str) -> IncidentRecord {
        let attrs: Attributes = [("MODALIDAD", modality)].into_iter().collect();
        IncidentRecord::new(
            IncidentKind::GraveSite,
            GeoPosition::new(lon, lat).unwrap(),
            attrs,
        )
    }

    #[test]
    fn groups_counts_and_hulls() {
        let records = vec![
            grave(-98.0, 19.0, "individual"),
            grave(-97.0, 19.0, "primaria"),
            grave(-97.0, 20.0, "Primaria "),
            grave(-98.0, 20.0, "PRIMARIA"),
            grave(-98.0, 19.0, "PRIMARIA"),
            grave(-97.5, 19.5, "primaria"),
            grave(-98.5, 19.5, "Individual"),
        ];

        let aggregates = compute_hulls(&records, modality_category);
        assert_eq!(aggregates.len(), 2);

        let primary = &aggregates[0];
        assert_eq!(primary.category, "PRIMARIA");
        assert_eq!(primary.count, 5);
        assert_eq!(primary.color, Rgba::new(231, 76, 60, 160));
        assert_eq!(primary.hull.as_ref().unwrap().len(), 4);

        let individual = &aggregates[1];
        assert_eq!(individual.count, 2);
        assert!(individual.hull.is_none());
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let records = vec![
            grave(-98.0, 19.0, "colectiva"),
            grave(-98.1, 19.0, ""),
            grave(-98.2, 19.0, "colectiva"),
            grave(-98.3, 19.0, " "),
        ];
        let aggregates = compute_hulls(&records, modality_category);
        let categories: Vec<_> = aggregates.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(categories, ["COLECTIVA", UNCATEGORIZED]);
        assert_eq!(aggregates[1].color, palette::DEFAULT_COLOR);
    }

    #[test]
    fn custom_resolver_is_uppercased() {
        let records = vec![grave(-98.0, 19.0, "x")];
        let aggregates = compute_hulls(&records, |_| "pozo para riego".to_string());
        assert_eq!(aggregates[0].category, WELL_CATEGORY);
        assert_eq!(aggregates[0].label(), "Zona de alta densidad de pozos para riego");
        assert_eq!(aggregates[0].outline().alpha(), 220);
    }
}
