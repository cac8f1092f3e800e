pub mod csv_parser;
pub mod report_store;

use crate::error::EngineError;
use crate::normalize::{normalize, NormalizeOptions};
use csv_parser::ReportCsvParser;
use shared::models::CleanTable;
use std::path::Path;

/// Reads a report CSV and normalizes it in one step.
pub fn load_clean_table(
    path: impl AsRef<Path>,
    parser: &ReportCsvParser,
    options: &NormalizeOptions,
) -> Result<CleanTable, EngineError> {
    let parser = parser.clone().excluding(options.excluded_rows.iter().cloned());
    let raw = parser.load_raw_table(path.as_ref())?;
    let clean = normalize(&raw, options)?;
    tracing::info!(
        path = %path.as_ref().display(),
        periods = clean.len(),
        metrics = clean.metrics.len(),
        "Loaded report table"
    );
    Ok(clean)
}
