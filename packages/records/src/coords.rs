//! Coordinate parsing for hand-entered source data.
//!
//! Grave-site spreadsheets mix several notations in the same column:
//! plain decimal degrees, degree-minute-second with a hemisphere letter,
//! bare degrees with a hemisphere letter, and dot-separated DMS triplets.
//! [`parse_coordinate`] accepts all of them and returns signed decimal
//! degrees.

use std::sync::LazyLock;

use incident_map_records_models::GeoPosition;
use regex::Regex;

/// `19°02'30.5"N`. The degree sign may carry a stray `Â` when the file was
/// decoded with the wrong charset.
static DMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^(\d{1,3})Â?°(\d{1,2})'(\d{1,2}(?:\.\d+)?)"?([NSEW])$"#).expect("valid regex")
});

/// `98.2W`
static DEGREES_HEMI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,3}(?:\.\d+)?)([NSEW])$").expect("valid regex"));

/// `19.02.30` (no hemisphere, no sign correction)
static DMS_DOTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3})\.(\d{1,2})\.(\d{1,2}(?:\.\d+)?)$").expect("valid regex")
});

/// Leading numeric prefix, for sources parsed leniently.
static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid regex")
});

/// Parses a textual coordinate into signed decimal degrees.
///
/// Whitespace anywhere in the input is ignored. Returns `None` when no
/// supported notation matches; callers must treat that as "no coordinate"
/// and drop the record rather than defaulting to zero.
#[must_use]
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    if let Ok(value) = compact.parse::<f64>()
        && value.is_finite()
    {
        return Some(value);
    }

    if let Some(caps) = DMS_RE.captures(&compact) {
        let degrees: f64 = caps[1].parse().ok()?;
        let minutes: f64 = caps[2].parse().ok()?;
        let seconds: f64 = caps[3].parse().ok()?;
        let value = degrees + minutes / 60.0 + seconds / 3600.0;
        return Some(apply_hemisphere(value, &caps[4]));
    }

    if let Some(caps) = DEGREES_HEMI_RE.captures(&compact) {
        let value: f64 = caps[1].parse().ok()?;
        return Some(apply_hemisphere(value, &caps[2]));
    }

    if let Some(caps) = DMS_DOTS_RE.captures(&compact) {
        let degrees: f64 = caps[1].parse().ok()?;
        let minutes: f64 = caps[2].parse().ok()?;
        let seconds: f64 = caps[3].parse().ok()?;
        return Some(degrees + minutes / 60.0 + seconds / 3600.0);
    }

    None
}

/// Negates `value` for southern and western hemispheres.
fn apply_hemisphere(value: f64, hemisphere: &str) -> f64 {
    if hemisphere.eq_ignore_ascii_case("S") || hemisphere.eq_ignore_ascii_case("W") {
        -value
    } else {
        value
    }
}

/// Forces the longitude negative when the pair looks like an unsigned
/// western-hemisphere longitude for this region: latitude in `[-10, 40]`
/// and longitude in `(0, 180]`.
///
/// Applied as-is; it deliberately does not try to catch other unsigned
/// shapes.
#[must_use]
pub fn correct_western_longitude(longitude: f64, latitude: f64) -> f64 {
    if (-10.0..=40.0).contains(&latitude) && longitude > 0.0 && longitude <= 180.0 {
        -longitude.abs()
    } else {
        longitude
    }
}

/// Parses a raw `(longitude, latitude)` pair into a validated position,
/// applying [`correct_western_longitude`].
///
/// Returns `None` if either side fails to parse or the corrected pair lies
/// outside the WGS84 range.
#[must_use]
pub fn parse_position(raw_longitude: &str, raw_latitude: &str) -> Option<GeoPosition> {
    let latitude = parse_coordinate(raw_latitude);
    let longitude = parse_coordinate(raw_longitude);

    match (longitude, latitude) {
        (Some(lon), Some(lat)) => GeoPosition::new(correct_western_longitude(lon, lat), lat),
        _ => None,
    }
}

/// Parses the leading number of `raw`, ignoring trailing garbage
/// (`"19.5 aprox"` → `19.5`). Empty or non-numeric input yields `None`.
#[must_use]
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    LEADING_NUMBER_RE
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parses a coordinate pair the lenient way massacre sources need: leading
/// numeric prefix only, and a zero on either axis counts as missing.
#[must_use]
pub fn parse_position_lenient(raw_longitude: &str, raw_latitude: &str) -> Option<GeoPosition> {
    let longitude = parse_leading_number(raw_longitude).unwrap_or(0.0);
    let latitude = parse_leading_number(raw_latitude).unwrap_or(0.0);
    if longitude == 0.0 || latitude == 0.0 {
        return None;
    }
    GeoPosition::new(longitude, latitude)
}
