// Handler for the LoadReport RPC
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Response, Status};

use super::helpers::{options_from_request, parse_orientation};
use crate::config::settings::EngineSettings;
use crate::data::csv_parser::ReportCsvParser;
use crate::data::load_clean_table;
use crate::data::report_store::ReportStore;
use crate::error::EngineError;
use crate::services::{LoadReportRequest, LoadReportResponse};

pub async fn handle_load_report(
    req_payload: LoadReportRequest,
    report_store: Arc<RwLock<ReportStore>>,
    settings: Arc<EngineSettings>,
) -> Result<Response<LoadReportResponse>, Status> {
    if req_payload.report_name.trim().is_empty() {
        return Err(EngineError::InvalidRequest("Report name must not be empty".to_string()).into());
    }

    let orientation = parse_orientation(&req_payload.orientation)?;
    let options = options_from_request(&req_payload, &settings)?;
    let parser = ReportCsvParser::new(settings.delimiter_byte(), orientation);

    // Parsing is synchronous and small; the store lock is only taken to insert.
    let table = load_clean_table(&req_payload.file_path, &parser, &options)?;

    let periods_loaded = table.len() as i32;
    let metrics = table.metrics.clone();
    let mut store = report_store.write().await;
    let replaced = store.insert(&req_payload.report_name, &req_payload.file_path, table);
    drop(store);

    if replaced {
        tracing::info!(report = %req_payload.report_name, "Replaced previously loaded report");
    }
    if periods_loaded == 0 {
        tracing::warn!(report = %req_payload.report_name, path = %req_payload.file_path, "Report has no periods");
    }

    Ok(Response::new(LoadReportResponse {
        success: true,
        message: format!(
            "{} {} periods and {} metrics for report {}",
            if replaced { "Reloaded" } else { "Loaded" },
            periods_loaded,
            metrics.len(),
            req_payload.report_name
        ),
        periods_loaded,
        metrics,
    }))
}
