//! Interactive session state over loaded datasets.
//!
//! A [`Session`] owns the current [`FilterState`] and year range and
//! derives every view on demand. Each derived view is cached against the
//! identity of its source collection and the filter value, so repeated
//! reads with an unchanged filter do no work.

use std::sync::Arc;

use incident_map_aggregate::circle::{WellZone, well_zone};
use incident_map_aggregate::{CategoryAggregate, compute_hulls, modality_category};
use incident_map_filter::options::FilterOptions;
use incident_map_filter::timeline::{
    Step, advance, animation_start, apply_range, step_year, year_domain,
};
use incident_map_filter::{FilterState, FilteredView, YearRange, derive_view};
use incident_map_geography::choropleth::{FeaturePaint, paint_layer};
use incident_map_records_models::IncidentRecord;

use crate::load::{Datasets, LoadedLayer};
use crate::memo::{ByIdentity, Memo};

type ViewKey = (ByIdentity<[IncidentRecord]>, FilterState);

/// Filter session over a fixed set of datasets.
#[derive(Debug)]
pub struct Session {
    datasets: Datasets,
    graves: Arc<[IncidentRecord]>,
    massacres: Arc<[IncidentRecord]>,
    domain: Vec<i32>,
    range: Option<YearRange>,
    state: FilterState,
    well_zone_radius_m: f64,
    grave_view: Memo<ViewKey, FilteredView>,
    massacre_view: Memo<ViewKey, FilteredView>,
    legend: Memo<ViewKey, Vec<CategoryAggregate>>,
}

impl Session {
    /// Starts a session with the whole year domain selected.
    #[must_use]
    pub fn new(datasets: Datasets, well_zone_radius_m: f64) -> Self {
        let graves = datasets.graves_or_empty();
        let massacres = datasets.massacres_or_empty();
        let domain = year_domain([&graves[..], &massacres[..]]);
        let range = YearRange::full(&domain);
        log::info!(
            "Session over {} grave(s), {} massacre(s), years {range:?}",
            graves.len(),
            massacres.len()
        );

        let mut session = Self {
            datasets,
            graves,
            massacres,
            domain,
            range: None,
            state: FilterState::default(),
            well_zone_radius_m,
            grave_view: Memo::new(),
            massacre_view: Memo::new(),
            legend: Memo::new(),
        };
        if let Some(range) = range {
            session.set_year_range(range);
        }
        session
    }

    /// Loaded datasets.
    #[must_use]
    pub const fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    /// Current filter.
    #[must_use]
    pub const fn state(&self) -> &FilterState {
        &self.state
    }

    /// Replaces the filter. While a year range is active its years
    /// override whatever `state` carries.
    pub fn set_state(&mut self, state: FilterState) {
        self.state = match self.range {
            Some(range) => apply_range(state, range, &self.domain),
            None => state,
        };
    }

    /// Replaces the filter with `f` applied to the current one.
    pub fn update(&mut self, f: impl FnOnce(FilterState) -> FilterState) {
        let next = f(self.state.clone());
        self.set_state(next);
    }

    /// Distinct sorted years across graves and massacres.
    #[must_use]
    pub fn year_domain(&self) -> &[i32] {
        &self.domain
    }

    /// Selected year range, `None` while no years are known.
    #[must_use]
    pub const fn year_range(&self) -> Option<YearRange> {
        self.range
    }

    /// Selects `range`, clamped to the domain, and regenerates the year
    /// selection from it. Ignored while the domain is empty.
    pub fn set_year_range(&mut self, range: YearRange) {
        let Some(range) = range.clamp_to(&self.domain) else {
            return;
        };
        self.range = Some(range);
        self.state = apply_range(self.state.clone(), range, &self.domain);
    }

    /// Selects the whole domain.
    pub fn show_all_years(&mut self) {
        if let Some(range) = YearRange::full(&self.domain) {
            self.set_year_range(range);
        }
    }

    /// Moves to a single neighboring year.
    pub fn step(&mut self, step: Step) {
        if let Some(range) = self.range.and_then(|r| step_year(r, &self.domain, step)) {
            self.set_year_range(range);
        }
    }

    /// Rewinds playback to the first year.
    pub fn start_animation(&mut self) {
        if let Some(range) = animation_start(&self.domain) {
            self.set_year_range(range);
        }
    }

    /// Advances playback one year. Returns `false` once the last year is
    /// reached.
    pub fn advance(&mut self) -> bool {
        match self.range.and_then(|r| advance(r, &self.domain)) {
            Some(range) => {
                self.set_year_range(range);
                true
            }
            None => false,
        }
    }

    fn view(
        memo: &mut Memo<ViewKey, FilteredView>,
        records: &Arc<[IncidentRecord]>,
        state: &FilterState,
    ) -> FilteredView {
        memo.get_or_compute((ByIdentity(Arc::clone(records)), state.clone()), |(_, s)| {
            derive_view(records, s)
        })
    }

    /// Grave sites matching the filter.
    pub fn filtered_graves(&mut self) -> FilteredView {
        Self::view(&mut self.grave_view, &self.graves, &self.state)
    }

    /// Massacres matching the filter.
    pub fn filtered_massacres(&mut self) -> FilteredView {
        Self::view(&mut self.massacre_view, &self.massacres, &self.state)
    }

    /// Filtered grave sites, or nothing while they are hidden.
    pub fn visible_graves(&mut self) -> FilteredView {
        if self.state.show_graves {
            self.filtered_graves()
        } else {
            FilteredView::empty()
        }
    }

    /// Filtered massacres, or nothing while they are hidden.
    pub fn visible_massacres(&mut self) -> FilteredView {
        if self.state.show_massacres {
            self.filtered_massacres()
        } else {
            FilteredView::empty()
        }
    }

    /// Modality summaries with hulls over the filtered graves. Empty unless
    /// at least one modality is selected.
    pub fn modality_legend(&mut self) -> Vec<CategoryAggregate> {
        if self.state.modalities.is_empty() {
            return Vec::new();
        }
        let view = self.filtered_graves();
        self.legend.get_or_compute(
            (ByIdentity(Arc::clone(&self.graves)), self.state.clone()),
            |_| compute_hulls(view.iter(), modality_category),
        )
    }

    /// Values offered for each filter dimension.
    #[must_use]
    pub fn options(&self) -> FilterOptions {
        FilterOptions::collect(&self.graves, &self.massacres)
    }

    /// Irrigation-well zone around the loaded graves.
    #[must_use]
    pub fn well_zone(&self) -> Option<WellZone> {
        well_zone(&self.graves, self.well_zone_radius_m)
    }

    /// A loaded layer with its colors under the current year range.
    #[must_use]
    pub fn painted_layer(&self, id: &str) -> Option<(&LoadedLayer, Vec<FeaturePaint>)> {
        let layer = self.datasets.layer(id)?;
        let paint = paint_layer(&layer.config, &layer.features, self.range);
        Some((layer, paint))
    }

    /// How many times each view was recomputed: graves, massacres, legend.
    #[must_use]
    pub const fn recomputations(&self) -> (u64, u64, u64) {
        (
            self.grave_view.misses(),
            self.massacre_view.misses(),
            self.legend.misses(),
        )
    }
}
