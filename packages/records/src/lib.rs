#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record ingestion.
//!
//! Turns delimited source files into [`IncidentRecord`]s: decodes bytes
//! (UTF-8 with a Latin-1 fallback), resolves position columns through alias
//! lists ([`fields`]), parses heterogeneous coordinate notations
//! ([`coords`]), and keeps only records with a complete, finite position.
//! Grave-site sources are loaded with a timed fallback to an older file
//! ([`ingest::load_with_fallback`]).
//!
//! [`IncidentRecord`]: incident_map_records_models::IncidentRecord

pub mod coords;
pub mod encoding;
pub mod fetch;
pub mod fields;
pub mod ingest;
pub mod progress;
pub mod retry;
pub mod tabular;
pub mod years;

/// Errors that can occur while reading or parsing incident sources.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error (local file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The source answered but could not be used.
    #[error("Source error for {uri}: {message}")]
    Source {
        /// URI of the offending source.
        uri: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The file had a header but no data rows.
    #[error("Source {uri} has no data rows")]
    Empty {
        /// URI of the offending source.
        uri: String,
    },

    /// Neither the primary nor the fallback source produced records.
    #[error("No source produced records (tried: {tried})")]
    Exhausted {
        /// Comma-separated list of the URIs that were tried.
        tried: String,
    },
}
