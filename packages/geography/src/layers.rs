//! Polygon layer loading.

use incident_map_filter::polygons::AllowList;
use incident_map_geography_models::{LayerConfig, PolygonFeature};
use incident_map_records::encoding::fix_encoding;
use incident_map_records::fetch::SourceReader;
use incident_map_records::progress::ProgressCallback;

use crate::GeoError;
use crate::dbf::DbfReader;
use crate::projection::{LambertConformalConic, reproject};
use crate::shp::ShpReader;

/// Records decoded between cooperative yields.
const YIELD_EVERY: usize = 256;

/// Loads a layer: fetches its `.shp`/`.dbf` pair, decodes feature by
/// feature, reprojects to longitude/latitude, applies the optional
/// allow-list, and repairs attribute encoding.
///
/// Records with a null geometry are skipped. Feature indices are assigned
/// after filtering.
///
/// # Errors
///
/// Returns [`GeoError`] if either file cannot be read or its header is
/// invalid. A corrupt record ends decoding early with a warning and the
/// features read so far are kept.
pub async fn load_layer(
    reader: &dyn SourceReader,
    config: &LayerConfig,
    projection: &LambertConformalConic,
    progress: &dyn ProgressCallback,
) -> Result<Vec<PolygonFeature>, GeoError> {
    let label = &config.id;
    progress.set_message(format!("Loading layer {}", config.name));

    let shp_uri = config.shp_uri();
    let dbf_uri = config.dbf_uri();
    let (shp_bytes, dbf_bytes) = tokio::try_join!(reader.read(&shp_uri), reader.read(&dbf_uri))?;

    let mut shp = ShpReader::new(&shp_bytes)?;
    let rows: Vec<_> = DbfReader::new(&dbf_bytes)?.rows().collect();
    progress.set_total(rows.len() as u64);

    let allow_list = config
        .filter
        .as_ref()
        .map(|f| AllowList::new(f.field.clone(), &f.values));

    let mut features = Vec::new();
    let mut skipped_null = 0_usize;
    let mut rejected = 0_usize;

    for (i, (shape, row)) in shp.shapes().zip(rows).enumerate() {
        if i > 0 && i % YIELD_EVERY == 0 {
            tokio::task::yield_now().await;
        }
        progress.inc(1);

        let (shape, attributes) = match (shape, row) {
            (Ok(shape), Ok(attributes)) => (shape, attributes),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("[{label}] stopping at record {i}: {e}");
                break;
            }
        };

        let Some(geometry) = shape else {
            skipped_null += 1;
            continue;
        };

        if let Some(list) = &allow_list
            && !list.allows(&attributes)
        {
            rejected += 1;
            continue;
        }

        features.push(PolygonFeature {
            geometry: reproject(geometry, projection),
            attributes: attributes.map_values(|v| fix_encoding(&v)),
            index: features.len(),
            layer_id: config.id.clone(),
            layer_name: config.name.clone(),
        });
    }

    if skipped_null > 0 {
        log::debug!("[{label}] skipped {skipped_null} record(s) without geometry");
    }
    if rejected > 0 {
        log::debug!("[{label}] {rejected} record(s) not in the allow-list");
    }
    log::info!("[{label}] loaded {} feature(s)", features.len());
    progress.finish(format!("{}: {} features", config.name, features.len()));

    Ok(features)
}
