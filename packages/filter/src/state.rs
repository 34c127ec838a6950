//! The filter value driving every derived view.
//!
//! A [`FilterState`] is replaced, never mutated in place: each interaction
//! produces a new value through the `with_*` methods, and views are pure
//! functions of `(records, state)`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A categorical filter dimension.
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
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dimension {
    /// Municipality (both grave sites and massacres).
    Municipality,
    /// Zone (grave sites only).
    Zone,
    /// Burial modality (grave sites only).
    Modality,
    /// Who made the discovery (grave sites only).
    Finder,
}

/// Current filter selections.
///
/// An empty selection set means "no constraint" for that dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    /// Selected years as strings. Derived from the timeline range, not
    /// edited directly.
    pub years: BTreeSet<String>,
    /// Selected municipalities.
    pub municipalities: BTreeSet<String>,
    /// Selected zones.
    pub zones: BTreeSet<String>,
    /// Selected modalities.
    pub modalities: BTreeSet<String>,
    /// Selected discovery methods.
    pub finders: BTreeSet<String>,
    /// Case-insensitive substring query.
    pub text: String,
    /// Whether grave sites are rendered.
    pub show_graves: bool,
    /// Whether massacres are rendered.
    pub show_massacres: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            years: BTreeSet::new(),
            municipalities: BTreeSet::new(),
            zones: BTreeSet::new(),
            modalities: BTreeSet::new(),
            finders: BTreeSet::new(),
            text: String::new(),
            show_graves: true,
            show_massacres: true,
        }
    }
}

impl FilterState {
    /// Selection for `dimension`.
    #[must_use]
    pub const fn selection(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Municipality => &self.municipalities,
            Dimension::Zone => &self.zones,
            Dimension::Modality => &self.modalities,
            Dimension::Finder => &self.finders,
        }
    }

    const fn selection_mut(&mut self, dimension: Dimension) -> &mut BTreeSet<String> {
        match dimension {
            Dimension::Municipality => &mut self.municipalities,
            Dimension::Zone => &mut self.zones,
            Dimension::Modality => &mut self.modalities,
            Dimension::Finder => &mut self.finders,
        }
    }

    /// Replaces the selection for `dimension`.
    #[must_use]
    pub fn with_selection<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.selection_mut(dimension) = values.into_iter().map(Into::into).collect();
        self
    }

    /// Adds `value` to the selection, or removes it if already selected.
    #[must_use]
    pub fn toggled(mut self, dimension: Dimension, value: &str) -> Self {
        let selection = self.selection_mut(dimension);
        if !selection.remove(value) {
            selection.insert(value.to_string());
        }
        self
    }

    /// Replaces the year selection.
    #[must_use]
    pub fn with_years<I, S>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.years = years.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the text query.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets grave-site visibility.
    #[must_use]
    pub const fn with_show_graves(mut self, show: bool) -> Self {
        self.show_graves = show;
        self
    }

    /// Sets massacre visibility.
    #[must_use]
    pub const fn with_show_massacres(mut self, show: bool) -> Self {
        self.show_massacres = show;
        self
    }

    /// Clears every categorical selection and the text query. Years and
    /// visibility are kept.
    #[must_use]
    pub fn cleared(self) -> Self {
        Self {
            years: self.years,
            show_graves: self.show_graves,
            show_massacres: self.show_massacres,
            ..Self::default()
        }
    }
}
