// src/run.rs

use anyhow::Result;
use chrono::Utc;
use std::{collections::BTreeMap, path::PathBuf};
use tracing::{error, info, instrument, warn};

use crate::cache::{write_cache, CacheDocument};
use crate::config::Config;
use crate::error::SheetError;
use crate::sheet::{extract_table, SheetSource, SheetSpec, Table};

/// Result of one sheet, kept until every sheet has been tried.
pub type SheetOutcome = (String, Result<Table, SheetError>);

/// What a completed run produced.
#[derive(Debug)]
pub struct RunReport {
    pub document: CacheDocument,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SheetError>,
}

/// Fetch and extract a single sheet.
#[instrument(level = "info", skip(source, spec), fields(sheet = %spec.name, locator = %spec.locator))]
pub async fn fetch_sheet<S: SheetSource + ?Sized>(
    source: &S,
    spec: &SheetSpec,
    is_weighting: bool,
) -> Result<Table, SheetError> {
    info!("fetching");
    let text = source.fetch_raw(spec).await?;
    extract_table(&text, &spec.name, is_weighting)
}

/// Try every sheet in catalog order, one at a time, keeping failures alongside successes.
pub async fn collect_sheets<S: SheetSource + ?Sized>(
    source: &S,
    config: &Config,
) -> Vec<SheetOutcome> {
    let mut outcomes = Vec::with_capacity(config.sheets.len());
    for spec in &config.sheets {
        let result = fetch_sheet(source, spec, config.is_weighting(&spec.name)).await;
        match &result {
            Ok(table) => info!(sheet = %spec.name, rows = table.rows.len(), "fetched"),
            Err(e) => warn!(sheet = %spec.name, kind = e.kind(), error = %e, "skipping sheet and continuing"),
        }
        outcomes.push((spec.name.clone(), result));
    }
    outcomes
}

/// Keep the successes as the cache data; hand back the failures for reporting.
pub fn materialize(outcomes: Vec<SheetOutcome>) -> (BTreeMap<String, Table>, Vec<SheetError>) {
    let mut data = BTreeMap::new();
    let mut skipped = Vec::new();
    for (name, result) in outcomes {
        match result {
            Ok(table) => {
                data.insert(name, table);
            }
            Err(e) => skipped.push(e),
        }
    }
    (data, skipped)
}

/// Fetch every configured sheet and overwrite the cache file(s).
///
/// Only a persistence failure is returned as an error.
#[instrument(level = "info", skip_all, fields(sheets = config.sheets.len()))]
pub async fn run<S: SheetSource + ?Sized>(source: &S, config: &Config) -> Result<RunReport> {
    let outcomes = collect_sheets(source, config).await;
    let (data, skipped) = materialize(outcomes);

    let document = CacheDocument::new(data, Utc::now());
    let written = write_cache(&document, &config.output_dir, &config.output_files)
        .inspect_err(|e| error!(error = %e, "cache update failed"))?;

    info!(
        cached = document.data.len(),
        skipped = skipped.len(),
        timestamp = %document.timestamp,
        "cache updated"
    );
    Ok(RunReport {
        document,
        written,
        skipped,
    })
}
