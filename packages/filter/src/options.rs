//! Choices offered by the filter panel.

use std::collections::BTreeSet;

use incident_map_records::fields::{self, resolve};
use incident_map_records_models::IncidentRecord;
use serde::Serialize;

use crate::state::Dimension;
use crate::view::grave_aliases;

/// Distinct, sorted, non-empty values per dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Municipalities present in grave-site data.
    pub grave_municipalities: Vec<String>,
    /// Municipalities present in massacre data.
    pub massacre_municipalities: Vec<String>,
    /// Zones.
    pub zones: Vec<String>,
    /// Modalities.
    pub modalities: Vec<String>,
    /// Discovery methods.
    pub finders: Vec<String>,
}

fn distinct(records: &[IncidentRecord], aliases: &[&str]) -> Vec<String> {
    records
        .iter()
        .map(|r| resolve(&r.attributes, aliases))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl FilterOptions {
    /// Collects options from the unfiltered collections.
    #[must_use]
    pub fn collect(graves: &[IncidentRecord], massacres: &[IncidentRecord]) -> Self {
        Self {
            grave_municipalities: distinct(graves, grave_aliases(Dimension::Municipality)),
            massacre_municipalities: distinct(massacres, fields::MASSACRE_MUNICIPALITY),
            zones: distinct(graves, grave_aliases(Dimension::Zone)),
            modalities: distinct(graves, grave_aliases(Dimension::Modality)),
            finders: distinct(graves, grave_aliases(Dimension::Finder)),
        }
    }

    /// Union of grave and massacre municipalities, sorted.
    #[must_use]
    pub fn all_municipalities(&self) -> Vec<String> {
        self.grave_municipalities
            .iter()
            .chain(&self.massacre_municipalities)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
