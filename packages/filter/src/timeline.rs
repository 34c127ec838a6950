//! Year domain, year range, and timeline stepping.
//!
//! The domain is the sorted set of strict years found across every loaded
//! collection. The selected [`YearRange`] is authoritative: changing it
//! regenerates [`FilterState::years`], never the other way round.
//!
//! [`FilterState::years`]: crate::state::FilterState::years

use std::collections::BTreeSet;

use incident_map_records::years::{YearFields, extract_year_strict};
use incident_map_records_models::IncidentRecord;
use serde::{Deserialize, Serialize};

use crate::state::FilterState;

/// Distinct sorted strict years across `collections`.
#[must_use]
pub fn year_domain<'a, I>(collections: I) -> Vec<i32>
where
    I: IntoIterator<Item = &'a [IncidentRecord]>,
{
    collections
        .into_iter()
        .flatten()
        .filter_map(|r| extract_year_strict(&r.attributes, YearFields::for_kind(r.kind)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// An inclusive year interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    /// First year, inclusive.
    pub min: i32,
    /// Last year, inclusive.
    pub max: i32,
}

impl YearRange {
    /// Builds a range, swapping the bounds if given backwards.
    #[must_use]
    pub const fn new(a: i32, b: i32) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// The whole domain, or `None` when no years are known.
    #[must_use]
    pub fn full(domain: &[i32]) -> Option<Self> {
        Some(Self::new(*domain.first()?, *domain.last()?))
    }

    /// Whether `year` is inside the range.
    #[must_use]
    pub const fn contains(self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }

    /// Clamps both bounds into the domain's extent.
    #[must_use]
    pub fn clamp_to(self, domain: &[i32]) -> Option<Self> {
        let full = Self::full(domain)?;
        Some(Self::new(
            self.min.clamp(full.min, full.max),
            self.max.clamp(full.min, full.max),
        ))
    }

    /// Domain years inside the range, as the string set the filter
    /// predicates compare against.
    #[must_use]
    pub fn selected_years(self, domain: &[i32]) -> BTreeSet<String> {
        domain
            .iter()
            .filter(|&&y| self.contains(y))
            .map(ToString::to_string)
            .collect()
    }

    /// Inclusive iterator over every calendar year in the range.
    pub fn years(self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }
}

/// Writes the years selected by `range` into `state`.
#[must_use]
pub fn apply_range(state: FilterState, range: YearRange, domain: &[i32]) -> FilterState {
    state.with_years(range.selected_years(domain))
}

/// Index of the domain year closest to `year` (first on ties).
fn closest_index(domain: &[i32], year: i32) -> usize {
    domain
        .iter()
        .enumerate()
        .min_by_key(|&(i, &y)| ((y - year).unsigned_abs(), i))
        .map_or(0, |(i, _)| i)
}

/// Direction for single-year stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Previous domain year.
    Back,
    /// Next domain year.
    Forward,
}

/// Moves a single-year selection one domain year in `step`'s direction,
/// starting from the year nearest the range's lower bound. Stops at the
/// domain edges.
#[must_use]
pub fn step_year(range: YearRange, domain: &[i32], step: Step) -> Option<YearRange> {
    if domain.is_empty() {
        return None;
    }
    let current = closest_index(domain, range.min);
    let next = match step {
        Step::Back => current.saturating_sub(1),
        Step::Forward => (current + 1).min(domain.len() - 1),
    };
    Some(YearRange::new(domain[next], domain[next]))
}

/// Extends the range's upper bound to the next domain year, keeping the
/// lower bound. Returns `None` once the upper bound is the last domain
/// year (or not a domain year at all), which ends playback.
#[must_use]
pub fn advance(range: YearRange, domain: &[i32]) -> Option<YearRange> {
    let current = domain.iter().position(|&y| y == range.max)?;
    let next = *domain.get(current + 1)?;
    Some(YearRange::new(range.min, next))
}

/// The range playback starts from: the first domain year alone.
#[must_use]
pub fn animation_start(domain: &[i32]) -> Option<YearRange> {
    domain.first().map(|&y| YearRange::new(y, y))
}
