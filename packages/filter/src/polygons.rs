//! Allow-list filtering for polygon attributes.
//!
//! Polygon tables come with inconsistent charsets, so both the configured
//! values and the attribute are compared in their folded form.

use std::collections::BTreeSet;

use incident_map_records::encoding::normalize_for_comparison;
use incident_map_records_models::Attributes;

/// Accepted values for one attribute, stored folded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    field: String,
    accepted: BTreeSet<String>,
}

impl AllowList {
    /// Builds an allow-list over `field`.
    pub fn new<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            field: field.into(),
            accepted: values
                .into_iter()
                .map(|v| normalize_for_comparison(v.as_ref()))
                .collect(),
        }
    }

    /// Attribute being tested.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether the attribute's value is accepted. A missing attribute is
    /// never accepted.
    #[must_use]
    pub fn allows(&self, attributes: &Attributes) -> bool {
        attributes
            .get(&self.field)
            .is_some_and(|v| self.accepted.contains(&normalize_for_comparison(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_regardless_of_accents_case_and_mojibake() {
        let list = AllowList::new("NOMGEO", ["CAÑADA MORELOS", "GENERAL FELIPE ÁNGELES"]);
        let attrs = |v: &str| -> Attributes { [("NOMGEO", v)].into_iter().collect() };

        assert!(list.allows(&attrs("Cañada Morelos")));
        assert!(list.allows(&attrs("CAÃ‘ADA MORELOS")));
        assert!(list.allows(&attrs("General Felipe Angeles")));
        assert!(!list.allows(&attrs("Puebla")));
        assert!(!list.allows(&Attributes::new()));
        assert_eq!(list.field(), "NOMGEO");
    }
}
