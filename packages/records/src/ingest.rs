//! Source files to incident records.
//!
//! Grave-site data is published under several file versions. The newest
//! is tried first; if it has produced nothing once the fallback delay
//! elapses, the older version is fetched too and whichever yields records
//! first is kept. Fetches are never cancelled: a losing task runs to
//! completion in the background and its result is dropped.

use std::sync::Arc;
use std::time::Duration;

use incident_map_records_models::{Attributes, IncidentKind, IncidentRecord};
use tokio::task::JoinHandle;

use crate::coords::{parse_position, parse_position_lenient};
use crate::encoding::decode_text;
use crate::fetch::SourceReader;
use crate::fields::{self, resolve};
use crate::progress::ProgressCallback;
use crate::tabular::parse_rows;
use crate::RecordsError;

/// Records from the source that won.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecords {
    /// URI the records were read from.
    pub uri: String,
    /// Records with a valid position, in file order.
    pub records: Vec<IncidentRecord>,
}

/// Converts grave-site rows into records, dropping rows without a complete
/// position.
#[must_use]
pub fn parse_grave_rows(rows: Vec<Attributes>) -> Vec<IncidentRecord> {
    let total = rows.len();
    let records: Vec<IncidentRecord> = rows
        .into_iter()
        .filter_map(|row| {
            let position = parse_position(
                resolve(&row, fields::GRAVE_LONGITUDE),
                resolve(&row, fields::GRAVE_LATITUDE),
            )?;
            Some(IncidentRecord::new(IncidentKind::GraveSite, position, row))
        })
        .collect();

    if records.len() < total {
        log::debug!(
            "[graves] dropped {} of {total} row(s) without a usable position",
            total - records.len()
        );
    }
    records
}

/// Converts massacre rows into records. Unparsable or zero coordinates
/// exclude the row.
#[must_use]
pub fn parse_massacre_rows(rows: Vec<Attributes>) -> Vec<IncidentRecord> {
    let total = rows.len();
    let records: Vec<IncidentRecord> = rows
        .into_iter()
        .filter_map(|row| {
            let position = parse_position_lenient(
                resolve(&row, fields::MASSACRE_LONGITUDE),
                resolve(&row, fields::MASSACRE_LATITUDE),
            )?;
            Some(IncidentRecord::new(IncidentKind::Massacre, position, row))
        })
        .collect();

    if records.len() < total {
        log::debug!(
            "[massacres] dropped {} of {total} row(s) with missing or zero coordinates",
            total - records.len()
        );
    }
    records
}

/// Reads, decodes and parses one source.
///
/// # Errors
///
/// Returns [`RecordsError`] if the source cannot be read or has no data
/// rows.
pub async fn load_source(
    reader: &dyn SourceReader,
    kind: IncidentKind,
    uri: &str,
    progress: &dyn ProgressCallback,
) -> Result<Vec<IncidentRecord>, RecordsError> {
    progress.set_message(format!("Loading {uri}"));

    let bytes = reader.read(uri).await?;
    let text = decode_text(&bytes);
    let rows = parse_rows(&text, uri)?;
    progress.set_total(rows.len() as u64);

    let row_count = rows.len();
    let records = match kind {
        IncidentKind::GraveSite => parse_grave_rows(rows),
        IncidentKind::Massacre => parse_massacre_rows(rows),
    };

    progress.inc(row_count as u64);
    log::info!("[{kind}] {uri}: {} record(s) from {row_count} row(s)", records.len());
    Ok(records)
}

fn spawn_load(
    reader: &Arc<dyn SourceReader>,
    kind: IncidentKind,
    uri: &str,
    progress: &Arc<dyn ProgressCallback>,
) -> JoinHandle<Result<Vec<IncidentRecord>, RecordsError>> {
    let reader = Arc::clone(reader);
    let progress = Arc::clone(progress);
    let uri = uri.to_string();
    tokio::spawn(async move { load_source(reader.as_ref(), kind, &uri, progress.as_ref()).await })
}

/// Collapses a finished task into records, logging why it is unusable.
fn usable(
    joined: Result<Result<Vec<IncidentRecord>, RecordsError>, tokio::task::JoinError>,
    uri: &str,
) -> Option<LoadedRecords> {
    match joined {
        Ok(Ok(records)) if !records.is_empty() => Some(LoadedRecords {
            uri: uri.to_string(),
            records,
        }),
        Ok(Ok(_)) => {
            log::warn!("{uri} produced no records");
            None
        }
        Ok(Err(e)) => {
            log::warn!("{uri} failed: {e}");
            None
        }
        Err(e) => {
            log::error!("{uri} load task aborted: {e}");
            None
        }
    }
}

/// Loads `primary`, falling back to `fallback` when the primary has not
/// produced records within `delay`.
///
/// * Primary yields records before the delay: returned, fallback never
///   started.
/// * Primary fails or is empty before the delay: the fallback starts when
///   the delay elapses.
/// * Delay elapses first: the fallback starts and both race; the first
///   source to yield records wins and the other result is discarded.
///
/// # Errors
///
/// Returns [`RecordsError::Exhausted`] when no source produced records.
pub async fn load_with_fallback(
    reader: Arc<dyn SourceReader>,
    kind: IncidentKind,
    primary: &str,
    fallback: Option<&str>,
    delay: Duration,
    progress: Arc<dyn ProgressCallback>,
) -> Result<LoadedRecords, RecordsError> {
    let exhausted = || RecordsError::Exhausted {
        tried: std::iter::once(primary)
            .chain(fallback)
            .collect::<Vec<_>>()
            .join(", "),
    };

    let mut primary_task = spawn_load(&reader, kind, primary, &progress);

    let Some(fallback) = fallback else {
        return usable(primary_task.await, primary).ok_or_else(exhausted);
    };

    let timer = tokio::time::sleep(delay);
    tokio::pin!(timer);

    let early = tokio::select! {
        biased;
        joined = &mut primary_task => Some(joined),
        () = &mut timer => None,
    };

    if let Some(joined) = early {
        if let Some(loaded) = usable(joined, primary) {
            return Ok(loaded);
        }
        timer.await;
        log::info!("[{kind}] trying fallback source {fallback}");
        let fallback_task = spawn_load(&reader, kind, fallback, &progress);
        return usable(fallback_task.await, fallback).ok_or_else(exhausted);
    }

    log::info!("[{kind}] {primary} produced nothing after {delay:?}, trying fallback {fallback}");
    let mut fallback_task = spawn_load(&reader, kind, fallback, &progress);
    let mut primary_done = false;
    let mut fallback_done = false;

    loop {
        tokio::select! {
            biased;
            joined = &mut primary_task, if !primary_done => {
                primary_done = true;
                if let Some(loaded) = usable(joined, primary) {
                    return Ok(loaded);
                }
            }
            joined = &mut fallback_task, if !fallback_done => {
                fallback_done = true;
                if let Some(loaded) = usable(joined, fallback) {
                    return Ok(loaded);
                }
            }
            else => break,
        }
    }

    Err(exhausted())
}
