#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line access to the incident map engine.
//!
//! ```text
//! incident_map_cli years
//! incident_map_cli graves [--municipality M]... [--modality X]... [--from Y] [--to Y]
//! incident_map_cli massacres [--municipality M]... [--text T]
//! incident_map_cli legend --modality PRIMARIA
//! incident_map_cli layers
//! incident_map_cli layer corredor --from 2014 --to 2018
//! incident_map_cli well-zone
//! ```
//!
//! Output is JSON on stdout (`GeoJSON` for `layer`); logs and progress go
//! to stderr.

mod args;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use incident_map_cli_utils::IndicatifProgress;
use incident_map_engine::load::{BASE_LAYER_ID, DISAPPEARANCES_LAYER_ID};
use incident_map_engine::{EngineConfig, Session};
use incident_map_filter::YearRange;
use incident_map_geography::export::feature_collection;
use incident_map_geography::registry;
use serde::Serialize;

use crate::args::FilterArgs;

#[derive(Parser)]
#[command(
    name = "incident_map_cli",
    about = "Query grave sites, massacres, and disappearance layers"
)]
struct Cli {
    /// Engine configuration file (TOML). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured data directory
    #[arg(long)]
    data_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the year domain and the default range
    Years,
    /// Print grave sites matching the filters
    Graves(FilterArgs),
    /// Print massacres matching the filters
    Massacres(FilterArgs),
    /// Print modality summaries with hulls (requires --modality)
    Legend(FilterArgs),
    /// List the registered polygon layers
    Layers,
    /// Print a polygon layer as a GeoJSON FeatureCollection
    Layer {
        /// Layer id (see `layers`), or `desapariciones`
        id: String,
        /// First year used for intensity shading
        #[arg(long)]
        from: Option<i32>,
        /// Last year used for intensity shading
        #[arg(long)]
        to: Option<i32>,
    },
    /// Print the irrigation-well zone
    WellZone {
        /// Radius in meters
        #[arg(long)]
        radius_m: Option<f64>,
    },
}

#[derive(Serialize)]
struct YearsOutput<'a> {
    domain: &'a [i32],
    range: Option<YearRange>,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn open(
    config: &EngineConfig,
    layers: Vec<String>,
    multi: &incident_map_cli_utils::MultiProgress,
) -> Session {
    let progress = if layers.is_empty() {
        IndicatifProgress::records_bar(multi, "Loading sources")
    } else {
        IndicatifProgress::features_bar(multi, "Loading layers")
    };
    let config = EngineConfig {
        layers,
        ..config.clone()
    };
    let reader = incident_map_engine::reader_for(&config);
    let session = incident_map_engine::open_session(&config, reader, Arc::clone(&progress)).await;
    progress.finish("Sources loaded".to_string());
    session
}

fn filtered(session: &mut Session, filters: &FilterArgs) {
    if let Some(range) = filters.range(session.year_domain()) {
        session.set_year_range(range);
    }
    session.update(|state| filters.apply(state));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = incident_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path).await?,
        None => EngineConfig::default(),
    };
    if let Some(root) = cli.data_root {
        config.data_root = root;
    }

    match cli.command {
        Commands::Years => {
            let session = open(&config, Vec::new(), &multi).await;
            print_json(&YearsOutput {
                domain: session.year_domain(),
                range: session.year_range(),
            })?;
        }
        Commands::Graves(filters) => {
            let mut session = open(&config, Vec::new(), &multi).await;
            filtered(&mut session, &filters);
            let view = session.filtered_graves();
            log::info!("{} grave site(s) match", view.len());
            print_json(&view.to_vec())?;
        }
        Commands::Massacres(filters) => {
            let mut session = open(&config, Vec::new(), &multi).await;
            filtered(&mut session, &filters);
            let view = session.filtered_massacres();
            log::info!("{} massacre(s) match", view.len());
            print_json(&view.to_vec())?;
        }
        Commands::Legend(filters) => {
            if filters.modalities.is_empty() {
                log::warn!("No --modality given; the legend is empty");
            }
            let mut session = open(&config, Vec::new(), &multi).await;
            filtered(&mut session, &filters);
            print_json(&session.modality_legend())?;
        }
        Commands::Layers => {
            print_json(&registry::all_layers())?;
        }
        Commands::Layer { id, from, to } => {
            let source = if id == DISAPPEARANCES_LAYER_ID {
                BASE_LAYER_ID.to_string()
            } else {
                id.clone()
            };
            let mut session = open(&config, vec![source], &multi).await;
            let requested = FilterArgs {
                from,
                to,
                ..FilterArgs::default()
            };
            if let Some(range) = requested.range(session.year_domain()) {
                session.set_year_range(range);
            }

            let Some((layer, paint)) = session.painted_layer(&id) else {
                let reason = session
                    .datasets()
                    .layers
                    .get(&id)
                    .and_then(|s| s.error())
                    .unwrap_or("not loaded");
                return Err(format!("Layer {id} unavailable: {reason}").into());
            };
            print_json(&feature_collection(&layer.features, Some(paint.as_slice())))?;
        }
        Commands::WellZone { radius_m } => {
            if let Some(radius_m) = radius_m {
                config.well_zone_radius_m = radius_m;
            }
            let session = open(&config, Vec::new(), &multi).await;
            match session.well_zone() {
                Some(zone) => print_json(&zone)?,
                None => return Err("No grave sites loaded".into()),
            }
        }
    }

    Ok(())
}
