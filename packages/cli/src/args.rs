//! Filter flags shared by the record subcommands.

use clap::Args;
use incident_map_filter::{Dimension, FilterState, YearRange};

/// Filter selection from the command line. Repeat a flag to select
/// several values.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Municipality to keep
    #[arg(long = "municipality")]
    pub municipalities: Vec<String>,
    /// Zone to keep (graves only)
    #[arg(long = "zone")]
    pub zones: Vec<String>,
    /// Modality to keep (graves only)
    #[arg(long = "modality")]
    pub modalities: Vec<String>,
    /// Discovery method to keep (graves only)
    #[arg(long = "finder")]
    pub finders: Vec<String>,
    /// Case-insensitive text to search for
    #[arg(long)]
    pub text: Option<String>,
    /// First year of the range
    #[arg(long)]
    pub from: Option<i32>,
    /// Last year of the range
    #[arg(long)]
    pub to: Option<i32>,
}

impl FilterArgs {
    /// Applies the categorical selections and text to `state`.
    #[must_use]
    pub fn apply(&self, state: FilterState) -> FilterState {
        let mut state = state
            .with_selection(Dimension::Municipality, self.municipalities.iter().cloned())
            .with_selection(Dimension::Zone, self.zones.iter().cloned())
            .with_selection(Dimension::Modality, self.modalities.iter().cloned())
            .with_selection(Dimension::Finder, self.finders.iter().cloned());
        if let Some(text) = &self.text {
            state = state.with_text(text.clone());
        }
        state
    }

    /// Year range requested, with open ends taken from `domain`. `None`
    /// when neither bound was given or the domain is empty.
    #[must_use]
    pub fn range(&self, domain: &[i32]) -> Option<YearRange> {
        if self.from.is_none() && self.to.is_none() {
            return None;
        }
        let full = YearRange::full(domain)?;
        Some(YearRange::new(
            self.from.unwrap_or(full.min),
            self.to.unwrap_or(full.max),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_selections_and_text() {
        let args = FilterArgs {
            municipalities: vec!["Amozoc".to_string()],
            modalities: vec!["PRIMARIA".to_string(), "SECUNDARIA".to_string()],
            text: Some("río".to_string()),
            ..FilterArgs::default()
        };
        let state = args.apply(FilterState::default());

        assert!(state.municipalities.contains("Amozoc"));
        assert_eq!(state.modalities.len(), 2);
        assert!(state.zones.is_empty());
        assert_eq!(state.text, "río");
    }

    #[test]
    fn open_range_ends_come_from_the_domain() {
        let domain = [2010, 2014, 2020];
        let from_only = FilterArgs {
            from: Some(2014),
            ..FilterArgs::default()
        };
        assert_eq!(from_only.range(&domain), Some(YearRange::new(2014, 2020)));
        assert_eq!(FilterArgs::default().range(&domain), None);
        assert_eq!(from_only.range(&[]), None);
    }
}
