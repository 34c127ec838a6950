#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident map engine.
//!
//! Loads the grave-site, massacre, statistics, and polygon datasets
//! described by an [`config::EngineConfig`] and exposes them through a
//! [`session::Session`] that derives filtered views, modality summaries,
//! and painted layers on demand.

pub mod config;
pub mod load;
pub mod memo;
pub mod session;

use std::sync::Arc;

use incident_map_records::fetch::{DispatchReader, SourceReader};
use incident_map_records::progress::ProgressCallback;

pub use config::EngineConfig;
pub use load::{ComponentState, Datasets};
pub use session::Session;

/// Errors that can occur while setting up the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// I/O error (configuration file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Reader for `config`: local files under the data root, absolute URLs
/// over HTTP.
#[must_use]
pub fn reader_for(config: &EngineConfig) -> Arc<dyn SourceReader> {
    Arc::new(DispatchReader::new(config.data_root.clone()))
}

/// Loads every dataset and opens a session over them.
pub async fn open_session(
    config: &EngineConfig,
    reader: Arc<dyn SourceReader>,
    progress: Arc<dyn ProgressCallback>,
) -> Session {
    let datasets = load::load_datasets(config, reader, progress).await;
    Session::new(datasets, config.well_zone_radius_m)
}
