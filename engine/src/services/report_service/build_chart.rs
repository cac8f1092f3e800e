// Handler for the BuildChart RPC
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Response, Status};

use crate::charts::{build_chart, ChartLayout, ChartOptions};
use crate::data::report_store::ReportStore;
use crate::error::EngineError;
use crate::services::{ChartRequest, ChartResponse};

pub async fn handle_build_chart(
    req_payload: ChartRequest,
    report_store: Arc<RwLock<ReportStore>>,
) -> Result<Response<ChartResponse>, Status> {
    let layout: ChartLayout = req_payload.layout.parse()?;

    let store = report_store.read().await;
    let table = store.get(&req_payload.report_name).map(|r| r.table.clone());
    drop(store);

    let table = table.ok_or_else(|| EngineError::ReportNotFound(req_payload.report_name.clone()))?;

    let options = ChartOptions {
        layout,
        title: Some(req_payload.title).filter(|t| !t.trim().is_empty()),
        metrics: req_payload.metrics,
        line_metric: Some(req_payload.line_metric).filter(|m| !m.trim().is_empty()),
    };
    let spec = build_chart(&table, &options)?;

    let figure_json = serde_json::to_string(&spec.to_plotly_json())
        .map_err(|e| EngineError::ProcessingError(format!("Failed to serialize chart: {}", e)))?;

    tracing::debug!(report = %req_payload.report_name, ?layout, traces = spec.traces.len(), "Built chart");
    Ok(Response::new(ChartResponse {
        figure_json,
        series: spec.traces.iter().map(|t| t.name.clone()).collect(),
    }))
}
