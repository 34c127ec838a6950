//! Loading every dataset the session works on.
//!
//! Each component fails on its own: a missing massacre file or polygon
//! layer leaves that component [`ComponentState::Failed`] and the rest of
//! the map usable.

use std::collections::BTreeMap;
use std::sync::Arc;

use incident_map_geography::GeoError;
use incident_map_geography::join::{DisappearanceStats, enriched_only, load_stats};
use incident_map_geography::layers::load_layer;
use incident_map_geography::projection::LambertConformalConic;
use incident_map_geography::registry;
use incident_map_geography_models::{LayerConfig, LayerStyle, PolygonFeature};
use incident_map_records::fetch::SourceReader;
use incident_map_records::ingest::{load_source, load_with_fallback};
use incident_map_records::progress::ProgressCallback;
use incident_map_records_models::{IncidentKind, IncidentRecord};
use serde::Serialize;

use crate::config::EngineConfig;

/// Id of the layer derived from municipalities joined with statistics.
pub const DISAPPEARANCES_LAYER_ID: &str = "desapariciones";
/// Layer the statistics are joined onto.
pub const BASE_LAYER_ID: &str = "municipios";

/// Outcome of loading one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ComponentState<T> {
    /// Loaded.
    Ready(T),
    /// Could not be loaded; carries a user-facing message.
    Failed(String),
}

impl<T> ComponentState<T> {
    /// Records a failure, logging it.
    pub fn failed(component: &str, error: &impl std::fmt::Display) -> Self {
        log::warn!("[{component}] unavailable: {error}");
        Self::Failed(error.to_string())
    }

    /// The loaded value, if any.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// The failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Failed(message) => Some(message),
        }
    }
}

/// A polygon layer and the configuration it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedLayer {
    /// Layer definition.
    pub config: LayerConfig,
    /// Features, in layer order.
    pub features: Arc<[PolygonFeature]>,
}

/// Everything loaded at startup.
#[derive(Debug, Clone)]
pub struct Datasets {
    /// Grave sites.
    pub graves: ComponentState<Arc<[IncidentRecord]>>,
    /// Which grave source was used.
    pub graves_uri: Option<String>,
    /// Massacres.
    pub massacres: ComponentState<Arc<[IncidentRecord]>>,
    /// Disappearance statistics.
    pub disappearances: ComponentState<DisappearanceStats>,
    /// Polygon layers by id, including the derived disappearances layer.
    pub layers: BTreeMap<String, ComponentState<LoadedLayer>>,
}

impl Datasets {
    /// Grave sites, or an empty collection when they failed to load.
    #[must_use]
    pub fn graves_or_empty(&self) -> Arc<[IncidentRecord]> {
        self.graves
            .ready()
            .map_or_else(|| Arc::from(Vec::new()), Arc::clone)
    }

    /// Massacres, or an empty collection when they failed to load.
    #[must_use]
    pub fn massacres_or_empty(&self) -> Arc<[IncidentRecord]> {
        self.massacres
            .ready()
            .map_or_else(|| Arc::from(Vec::new()), Arc::clone)
    }

    /// A loaded layer by id.
    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&LoadedLayer> {
        self.layers.get(id).and_then(ComponentState::ready)
    }
}

/// Definition of the derived disappearances layer, styled after the
/// municipalities layer it comes from.
#[must_use]
pub fn disappearances_layer_config(base: &LayerConfig) -> LayerConfig {
    LayerConfig {
        id: DISAPPEARANCES_LAYER_ID.to_string(),
        name: "Desapariciones por municipio".to_string(),
        filter: None,
        style: LayerStyle::Fixed,
        ..base.clone()
    }
}

async fn load_graves(
    config: &EngineConfig,
    reader: Arc<dyn SourceReader>,
    progress: Arc<dyn ProgressCallback>,
) -> (ComponentState<Arc<[IncidentRecord]>>, Option<String>) {
    match load_with_fallback(
        reader,
        IncidentKind::GraveSite,
        &config.graves.primary,
        config.graves.fallback.as_deref(),
        config.fallback_delay(),
        progress,
    )
    .await
    {
        Ok(loaded) => (
            ComponentState::Ready(Arc::from(loaded.records)),
            Some(loaded.uri),
        ),
        Err(e) => (ComponentState::failed("graves", &e), None),
    }
}

async fn load_massacres(
    config: &EngineConfig,
    reader: &dyn SourceReader,
    progress: &dyn ProgressCallback,
) -> ComponentState<Arc<[IncidentRecord]>> {
    match load_source(reader, IncidentKind::Massacre, &config.massacres_uri, progress).await {
        Ok(records) => ComponentState::Ready(Arc::from(records)),
        Err(e) => ComponentState::failed("massacres", &e),
    }
}

async fn load_one_layer(
    id: &str,
    reader: &dyn SourceReader,
    progress: &dyn ProgressCallback,
) -> (String, ComponentState<LoadedLayer>) {
    let result: Result<LoadedLayer, GeoError> = async {
        let config = registry::layer(id)?;
        let projection = LambertConformalConic::mexico_inegi()?;
        let features = load_layer(reader, &config, &projection, progress).await?;
        Ok(LoadedLayer {
            config,
            features: Arc::from(features),
        })
    }
    .await;

    let state = match result {
        Ok(layer) => ComponentState::Ready(layer),
        Err(e) => ComponentState::failed(id, &e),
    };
    (id.to_string(), state)
}

fn derive_disappearances_layer(
    layers: &BTreeMap<String, ComponentState<LoadedLayer>>,
    stats: &ComponentState<DisappearanceStats>,
) -> Option<ComponentState<LoadedLayer>> {
    let base = layers.get(BASE_LAYER_ID)?;
    let state = match (base, stats) {
        (ComponentState::Ready(base), ComponentState::Ready(stats)) => {
            let config = disappearances_layer_config(&base.config);
            let features = enriched_only(base.features.to_vec(), stats, &config.id, &config.name);
            log::info!(
                "[{DISAPPEARANCES_LAYER_ID}] {} of {} municipalities enriched",
                features.len(),
                base.features.len()
            );
            ComponentState::Ready(LoadedLayer {
                config,
                features: Arc::from(features),
            })
        }
        (ComponentState::Failed(message), _) | (_, ComponentState::Failed(message)) => {
            ComponentState::Failed(message.clone())
        }
    };
    Some(state)
}

/// Loads graves (with fallback), massacres, statistics, and every
/// configured layer concurrently, then derives the disappearances layer
/// when both municipalities and statistics are available.
pub async fn load_datasets(
    config: &EngineConfig,
    reader: Arc<dyn SourceReader>,
    progress: Arc<dyn ProgressCallback>,
) -> Datasets {
    let layers_future = futures::future::join_all(
        config
            .layers
            .iter()
            .map(|id| load_one_layer(id, reader.as_ref(), progress.as_ref())),
    );

    let ((graves, graves_uri), massacres, disappearances, layers) = tokio::join!(
        load_graves(config, Arc::clone(&reader), Arc::clone(&progress)),
        load_massacres(config, reader.as_ref(), progress.as_ref()),
        async {
            match load_stats(reader.as_ref(), &config.disappearances_uri).await {
                Ok(stats) => ComponentState::Ready(stats),
                Err(e) => ComponentState::failed("desap", &e),
            }
        },
        layers_future,
    );

    let mut layers: BTreeMap<String, ComponentState<LoadedLayer>> = layers.into_iter().collect();
    if let Some(derived) = derive_disappearances_layer(&layers, &disappearances) {
        layers.insert(DISAPPEARANCES_LAYER_ID.to_string(), derived);
    }

    Datasets {
        graves,
        graves_uri,
        massacres,
        disappearances,
        layers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_map_records::fetch::MemoryReader;
    use incident_map_records::progress::null_progress;

    const GRAVES: &str = "Coord_Y,Coord_X,MUNICIPIO,AÑO\n19.0,-98.1,Amozoc,2015\n18.9,-97.9,Tepeaca,2017\n";
    const MASSACRES: &str = "coord_y,coord_x,Municipio,año\n19.05,-98.2,Puebla,2016\n";

    fn config() -> EngineConfig {
        EngineConfig {
            layers: vec!["nope".to_string()],
            ..EngineConfig::default()
        }
    }

    #[tokio::test]
    async fn components_fail_independently() {
        let config = config();
        let reader = MemoryReader::new()
            .with(config.graves.primary.clone(), GRAVES)
            .with(config.massacres_uri.clone(), MASSACRES);

        let datasets = load_datasets(&config, Arc::new(reader), null_progress()).await;

        assert_eq!(datasets.graves_or_empty().len(), 2);
        assert_eq!(datasets.graves_uri.as_deref(), Some(config.graves.primary.as_str()));
        assert_eq!(datasets.massacres_or_empty().len(), 1);
        assert!(datasets.disappearances.error().is_some());
        assert!(datasets.layers["nope"].error().unwrap().contains("nope"));
        assert!(!datasets.layers.contains_key(DISAPPEARANCES_LAYER_ID));
    }

    #[tokio::test]
    async fn missing_everything_degrades_to_empty() {
        let config = EngineConfig {
            graves: crate::config::GraveSources {
                fallback: None,
                ..Default::default()
            },
            layers: Vec::new(),
            ..EngineConfig::default()
        };

        let datasets = load_datasets(&config, Arc::new(MemoryReader::new()), null_progress()).await;

        assert!(datasets.graves.error().is_some());
        assert!(datasets.graves_or_empty().is_empty());
        assert!(datasets.massacres.error().is_some());
        assert!(datasets.layers.is_empty());
    }

    #[test]
    fn derived_layer_inherits_base_colors() {
        let base = registry::layer(BASE_LAYER_ID).unwrap();
        let derived = disappearances_layer_config(&base);
        assert_eq!(derived.id, DISAPPEARANCES_LAYER_ID);
        assert_eq!(derived.color, base.color);
        assert_eq!(derived.style, LayerStyle::Fixed);
    }
}
