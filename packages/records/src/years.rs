//! Year extraction.
//!
//! Two forms exist and are not interchangeable:
//!
//! * [`extract_year`] returns the year as a string and is what per-record
//!   filtering compares against the selected year set.
//! * [`extract_year_strict`] additionally requires an integer in
//!   `1900..=2100` and is what builds the global year domain, so a stray
//!   population count in a year column never becomes a timeline entry.

use std::sync::LazyLock;

use incident_map_records_models::{Attributes, IncidentKind};
use regex::Regex;

use crate::fields;

/// Smallest year accepted by [`extract_year_strict`].
pub const MIN_YEAR: i32 = 1900;
/// Largest year accepted by [`extract_year_strict`].
pub const MAX_YEAR: i32 = 2100;

/// Trailing `.0`, `.00` left behind by spreadsheet exports.
static TRAILING_ZERO_FRACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.0+$").expect("valid regex"));

/// A four-digit 19xx / 20xx token.
static YEAR_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid regex"));

/// Where a record kind keeps its year information.
#[derive(Debug, Clone, Copy)]
pub struct YearFields {
    /// Explicit year columns, in priority order.
    pub year: &'static [&'static str],
    /// Free-text date columns, scanned when no explicit year is present.
    pub date: &'static [&'static str],
}

impl YearFields {
    /// Grave-site year columns.
    pub const GRAVE: Self = Self {
        year: fields::GRAVE_YEAR,
        date: fields::GRAVE_DATE,
    };

    /// Massacre year columns.
    pub const MASSACRE: Self = Self {
        year: fields::MASSACRE_YEAR,
        date: fields::MASSACRE_DATE,
    };

    /// Year columns for `kind`.
    #[must_use]
    pub const fn for_kind(kind: IncidentKind) -> Self {
        match kind {
            IncidentKind::GraveSite => Self::GRAVE,
            IncidentKind::Massacre => Self::MASSACRE,
        }
    }
}

/// Removes spreadsheet float artifacts (`"2015.0"` → `"2015"`).
#[must_use]
pub fn clean_year(raw: &str) -> String {
    TRAILING_ZERO_FRACTION_RE.replace(raw.trim(), "").into_owned()
}

/// First `19xx`/`20xx` token in `text`.
#[must_use]
pub fn find_year_token(text: &str) -> Option<&str> {
    YEAR_TOKEN_RE.find(text).map(|m| m.as_str())
}

/// Loose year: the explicit year column with float artifacts stripped,
/// otherwise the first year token of the date column, otherwise `""`.
///
/// The explicit value is returned as written, without range checks.
#[must_use]
pub fn extract_year(attributes: &Attributes, fields: YearFields) -> String {
    let explicit = fields::resolve(attributes, fields.year);
    if !explicit.is_empty() {
        return clean_year(explicit);
    }

    let date = fields::resolve(attributes, fields.date);
    find_year_token(date).map_or_else(String::new, str::to_string)
}

/// Strict year: an integer in `[MIN_YEAR, MAX_YEAR]` taken from the
/// explicit year column, or failing that, the first year token of the year
/// or date column.
#[must_use]
pub fn extract_year_strict(attributes: &Attributes, fields: YearFields) -> Option<i32> {
    let explicit = fields::resolve(attributes, fields.year);
    if let Some(year) = parse_year_number(&clean_year(explicit)) {
        return Some(year);
    }

    let date = fields::resolve(attributes, fields.date);
    [explicit, date]
        .into_iter()
        .filter_map(find_year_token)
        .filter_map(|token| token.parse::<i32>().ok())
        .find(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
}

/// Parses `raw` as a whole number inside the accepted year range.
fn parse_year_number(raw: &str) -> Option<i32> {
    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < f64::from(MIN_YEAR) || value > f64::from(MAX_YEAR) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(value as i32)
}
