#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record types shared by ingestion, filtering, and aggregation.
//!
//! Source rows arrive with inconsistent column names, so attributes are kept
//! as an open [`Attributes`] bag instead of typed fields. Downstream code reads
//! them through alias lists rather than indexing by a single key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which incident collection a record belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncidentKind {
    /// Clandestine grave discovery.
    GraveSite,
    /// Massacre event.
    Massacre,
}

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Longitude in `[-180, 180]`.
    pub longitude: f64,
    /// Latitude in `[-90, 90]`.
    pub latitude: f64,
}

impl GeoPosition {
    /// Builds a position, returning `None` when either component is not
    /// finite or lies outside the valid WGS84 range. Out-of-range values are
    /// rejected, never clamped.
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Option<Self> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return None;
        }
        if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
            return None;
        }
        Some(Self {
            longitude,
            latitude,
        })
    }

    /// Returns the position as an `[x, y]` pair.
    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Raw attribute bag keyed by source column name.
///
/// Values are `None` when the source explicitly carried a null (e.g. an
/// empty numeric `.dbf` field). Keys keep their original spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, Option<String>>);

impl Attributes {
    /// Creates an empty attribute bag.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the raw value stored under exactly `key`, if it is present
    /// and not null.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Option::as_deref)
    }

    /// Whether `key` is present, even with a null value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.0.insert(key.into(), value);
    }

    /// Iterates over all keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over all `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Applies `f` to every non-null value, keeping keys unchanged.
    #[must_use]
    pub fn map_values(self, mut f: impl FnMut(String) -> String) -> Self {
        Self(self.0.into_iter().map(|(k, v)| (k, v.map(&mut f))).collect())
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }
}

/// A geocoded incident with its untouched source attributes.
///
/// Immutable once ingested. Collections are shared behind `Arc` and the
/// filter engine only ever hands out references into them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Collection this record was ingested into.
    pub kind: IncidentKind,
    /// Parsed position.
    pub position: GeoPosition,
    /// Source row, keyed by the column names of the file it came from.
    pub attributes: Attributes,
}

impl IncidentRecord {
    /// Creates a record.
    #[must_use]
    pub const fn new(kind: IncidentKind, position: GeoPosition, attributes: Attributes) -> Self {
        Self {
            kind,
            position,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_positions() {
        assert!(GeoPosition::new(-98.2, 19.0).is_some());
        assert!(GeoPosition::new(-181.0, 19.0).is_none());
        assert!(GeoPosition::new(-98.2, 91.0).is_none());
        assert!(GeoPosition::new(f64::NAN, 19.0).is_none());
    }

    #[test]
    fn null_values_are_not_returned() {
        let mut attrs = Attributes::new();
        attrs.insert("A", None);
        attrs.insert("B", Some("x".to_string()));
        assert!(attrs.contains_key("A"));
        assert_eq!(attrs.get("A"), None);
        assert_eq!(attrs.get("B"), Some("x"));
    }

    #[test]
    fn kind_round_trips_through_strings() {
        assert_eq!(IncidentKind::GraveSite.to_string(), "grave_site");
        assert_eq!(
            "massacre".parse::<IncidentKind>().ok(),
            Some(IncidentKind::Massacre)
        );
    }
}
