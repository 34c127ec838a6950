//! Compile-time registry of polygon layer sources.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a layer means adding a TOML file in `layers/` and an entry here.

use incident_map_geography_models::LayerConfig;

use crate::GeoError;

/// Number of registered layers. Enforced by a test.
#[cfg(test)]
const EXPECTED_LAYER_COUNT: usize = 2;

/// Embedded TOML layer definitions, in display order.
const LAYER_TOMLS: &[(&str, &str)] = &[
    ("municipios", include_str!("../layers/municipios.toml")),
    ("corredor", include_str!("../layers/corredor.toml")),
];

/// Returns all registered layers.
///
/// # Panics
///
/// Panics if an embedded TOML file fails to parse. These are compile-time
/// constants, so a failure is a development error caught by the tests.
#[must_use]
pub fn all_layers() -> Vec<LayerConfig> {
    LAYER_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse layer '{name}': {e}"))
        })
        .collect()
}

/// Looks up a registered layer by id.
///
/// # Errors
///
/// Returns [`GeoError::UnknownLayer`] if no layer has that id.
pub fn layer(id: &str) -> Result<LayerConfig, GeoError> {
    all_layers()
        .into_iter()
        .find(|l| l.id == id)
        .ok_or_else(|| GeoError::UnknownLayer { id: id.to_string() })
}

/// Parses a layer definition supplied at runtime.
///
/// # Errors
///
/// Returns [`GeoError::Toml`] if the text is not a valid layer definition.
pub fn parse_layer(toml_str: &str) -> Result<LayerConfig, GeoError> {
    Ok(toml::de::from_str(toml_str)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_map_geography_models::{LayerStyle, Rgba};
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_layers() {
        let layers = all_layers();
        assert_eq!(
            layers.len(),
            EXPECTED_LAYER_COUNT,
            "Expected {EXPECTED_LAYER_COUNT} layers, found {}. \
             Update EXPECTED_LAYER_COUNT after adding/removing layers.",
            layers.len()
        );
    }

    #[test]
    fn layer_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for layer in &all_layers() {
            assert!(seen.insert(layer.id.clone()), "Duplicate layer ID: {}", layer.id);
        }
    }

    #[test]
    fn all_layers_have_required_fields() {
        for layer in &all_layers() {
            assert!(!layer.id.is_empty(), "Layer has empty id");
            assert!(!layer.name.is_empty(), "Layer {} has empty name", layer.id);
            assert!(
                layer.base_path.starts_with('/'),
                "Layer {} base path must be rooted: {}",
                layer.id,
                layer.base_path
            );
            assert!(!layer.file_name.is_empty(), "Layer {} has empty file", layer.id);
            if let Some(filter) = &layer.filter {
                assert!(!filter.field.is_empty(), "Layer {} filter has no field", layer.id);
                assert!(!filter.values.is_empty(), "Layer {} filter is empty", layer.id);
            }
        }
    }

    #[test]
    fn corridor_is_allow_listed_and_intensity_styled() {
        let corredor = layer("corredor").unwrap();
        let filter = corredor.filter.unwrap();
        assert_eq!(filter.field, "NOMGEO");
        assert_eq!(filter.values.len(), 17);
        assert!(filter.values.iter().any(|v| v == "CAÑADA MORELOS"));
        assert_eq!(
            corredor.style,
            LayerStyle::Intensity {
                prefix: "DPFGE".to_string()
            }
        );
        assert_eq!(corredor.color, Rgba::new(220, 53, 69, 100));
    }

    #[test]
    fn unknown_layer_is_an_error() {
        assert!(matches!(layer("nope"), Err(GeoError::UnknownLayer { .. })));
    }

    #[test]
    fn parses_runtime_definitions() {
        let config = parse_layer(
            "id = \"x\"\nname = \"X\"\nbase_path = \"/x\"\nfile_name = \"x\"\n\
             color = [1, 2, 3, 4]\nstroke_color = [1, 2, 3, 200]\n",
        )
        .unwrap();
        assert_eq!(config.style, LayerStyle::Fixed);
        assert!(config.filter.is_none());
        assert!(parse_layer("id = 3").is_err());
    }
}
