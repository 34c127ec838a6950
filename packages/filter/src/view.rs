//! Pure derivation of filtered incident views.
//!
//! Grave sites and massacres have independent predicate sets and are never
//! filtered together: massacres only know year, municipality and text.

use std::sync::Arc;

use incident_map_records::fields::{self, resolve};
use incident_map_records::years::{YearFields, extract_year};
use incident_map_records_models::{IncidentKind, IncidentRecord};

use crate::state::{Dimension, FilterState};

/// Grave-site column aliases per categorical dimension.
#[must_use]
pub const fn grave_aliases(dimension: Dimension) -> &'static [&'static str] {
    match dimension {
        Dimension::Municipality => fields::GRAVE_MUNICIPALITY,
        Dimension::Zone => fields::GRAVE_ZONE,
        Dimension::Modality => fields::GRAVE_MODALITY,
        Dimension::Finder => fields::GRAVE_FINDER,
    }
}

/// Empty selection passes; otherwise `value` must be selected.
fn selected(selection: &std::collections::BTreeSet<String>, value: &str) -> bool {
    selection.is_empty() || selection.contains(value)
}

/// Empty query passes; otherwise a case-insensitive substring match.
fn text_matches(query: &str, haystack: &str) -> bool {
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Whether a grave-site record passes all five grave predicates.
#[must_use]
pub fn matches_grave(record: &IncidentRecord, state: &FilterState) -> bool {
    let attrs = &record.attributes;

    if !state.years.is_empty() && !state.years.contains(&extract_year(attrs, YearFields::GRAVE)) {
        return false;
    }

    for dimension in [
        Dimension::Municipality,
        Dimension::Zone,
        Dimension::Modality,
        Dimension::Finder,
    ] {
        if !selected(state.selection(dimension), resolve(attrs, grave_aliases(dimension))) {
            return false;
        }
    }

    text_matches(&state.text, resolve(attrs, fields::GRAVE_DESCRIPTION))
}

/// Searchable text of a massacre: summary and place, space-joined.
#[must_use]
pub fn massacre_text(record: &IncidentRecord) -> String {
    let attrs = &record.attributes;
    format!(
        "{} {}",
        resolve(attrs, fields::MASSACRE_DESCRIPTION),
        resolve(attrs, fields::MASSACRE_PLACE)
    )
}

/// Whether a massacre record passes the year, municipality and text
/// predicates.
#[must_use]
pub fn matches_massacre(record: &IncidentRecord, state: &FilterState) -> bool {
    let attrs = &record.attributes;

    if !state.years.is_empty()
        && !state.years.contains(&extract_year(attrs, YearFields::MASSACRE))
    {
        return false;
    }

    if !selected(
        &state.municipalities,
        resolve(attrs, fields::MASSACRE_MUNICIPALITY),
    ) {
        return false;
    }

    text_matches(&state.text, &massacre_text(record))
}

/// Dispatches on the record's kind.
#[must_use]
pub fn matches(record: &IncidentRecord, state: &FilterState) -> bool {
    match record.kind {
        IncidentKind::GraveSite => matches_grave(record, state),
        IncidentKind::Massacre => matches_massacre(record, state),
    }
}

/// A filtered subset of a shared record collection.
///
/// Holds indices into the source rather than copies, so deriving a view
/// never clones records.
#[derive(Debug, Clone)]
pub struct FilteredView {
    source: Arc<[IncidentRecord]>,
    indices: Vec<usize>,
}

impl FilteredView {
    /// View over every record of `source`.
    #[must_use]
    pub fn all(source: Arc<[IncidentRecord]>) -> Self {
        let indices = (0..source.len()).collect();
        Self { source, indices }
    }

    /// An empty view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            source: Arc::from(Vec::new()),
            indices: Vec::new(),
        }
    }

    /// Matching records in source order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &IncidentRecord> + '_ {
        self.indices.iter().map(|&i| &self.source[i])
    }

    /// Positions of the matching records within the source.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of matching records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Clones the matching records out.
    #[must_use]
    pub fn to_vec(&self) -> Vec<IncidentRecord> {
        self.iter().cloned().collect()
    }
}

/// Filters `records` by `state`, choosing the predicate set by each
/// record's kind.
#[must_use]
pub fn derive_view(records: &Arc<[IncidentRecord]>, state: &FilterState) -> FilteredView {
    let indices = records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches(r, state))
        .map(|(i, _)| i)
        .collect();
    FilteredView {
        source: Arc::clone(records),
        indices,
    }
}
