//! Engine configuration.
//!
//! Every field has a default pointing at the published asset names, so an
//! empty TOML document is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Grave-site sources, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraveSources {
    /// Newest file version.
    pub primary: String,
    /// Older file version tried when the primary is slow or unusable.
    pub fallback: Option<String>,
    /// How long the primary gets before the fallback starts.
    pub fallback_delay_ms: u64,
}

impl Default for GraveSources {
    fn default() -> Self {
        Self {
            primary: "/assets/Fosas_clandestinas_3.csv".to_string(),
            fallback: Some("/assets/Fosas_clandestinas_2.csv".to_string()),
            fallback_delay_ms: 1500,
        }
    }
}

/// Where the engine reads its data from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Local directory that relative URIs resolve against.
    pub data_root: PathBuf,
    /// Grave-site sources.
    pub graves: GraveSources,
    /// Massacre source.
    pub massacres_uri: String,
    /// Yearly disappearance statistics.
    pub disappearances_uri: String,
    /// Registry ids of the polygon layers to load.
    pub layers: Vec<String>,
    /// Radius of the irrigation-well zone, in meters.
    pub well_zone_radius_m: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("public"),
            graves: GraveSources::default(),
            massacres_uri: "/assets/Base de Datos - Masacres (1).csv".to_string(),
            disappearances_uri: "/CSVs/Base_Desap_TasaValores.csv".to_string(),
            layers: vec!["municipios".to_string(), "corredor".to_string()],
            well_zone_radius_m: incident_map_aggregate::circle::WELL_ZONE_RADIUS_M,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Toml`] if the document is not valid TOML or a
    /// field has the wrong type.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, EngineError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file cannot be read, or
    /// [`EngineError::Toml`] if it cannot be parsed.
    pub async fn load(path: &Path) -> Result<Self, EngineError> {
        let text = tokio::fs::read_to_string(path).await?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Delay before the grave fallback source starts.
    #[must_use]
    pub const fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.graves.fallback_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.fallback_delay(), Duration::from_millis(1500));
        assert_eq!(config.layers, ["municipios", "corredor"]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            data_root = "/srv/data"
            layers = ["municipios"]

            [graves]
            fallback_delay_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.data_root, PathBuf::from("/srv/data"));
        assert_eq!(config.graves.fallback_delay_ms, 250);
        assert_eq!(config.graves.primary, GraveSources::default().primary);
        assert_eq!(config.layers, ["municipios"]);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("layers = 3"),
            Err(EngineError::Toml(_))
        ));
    }
}
