#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Polygon layers for the incident map.
//!
//! Loads municipality boundaries from shapefile pairs, converts them from
//! the national Lambert Conformal Conic grid to longitude/latitude, and
//! joins yearly disappearance statistics onto them by `CVEGEO` code.

pub mod choropleth;
pub mod dbf;
pub mod export;
pub mod join;
pub mod layers;
pub mod projection;
pub mod registry;
pub mod shp;

use incident_map_records::RecordsError;
use thiserror::Error;

/// Errors that can occur while loading or deriving polygon layers.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Reading or parsing a source failed.
    #[error(transparent)]
    Records(#[from] RecordsError),

    /// A `.shp` file could not be decoded.
    #[error("Shapefile error: {message}")]
    Shapefile {
        /// Description of what went wrong.
        message: String,
    },

    /// A `.dbf` file could not be decoded.
    #[error("DBF error: {message}")]
    Dbf {
        /// Description of what went wrong.
        message: String,
    },

    /// A coordinate could not be transformed.
    #[error("Projection error: {message}")]
    Projection {
        /// Description of what went wrong.
        message: String,
    },

    /// A layer definition could not be parsed.
    #[error("Layer config error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No registered layer has the requested id.
    #[error("Unknown layer: {id}")]
    UnknownLayer {
        /// Requested id.
        id: String,
    },
}
