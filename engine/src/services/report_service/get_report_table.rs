// Handler for the GetReportTable RPC
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Response, Status};

use super::helpers::to_period_message;
use crate::data::report_store::ReportStore;
use crate::error::EngineError;
use crate::services::{PeriodRowMessage, ReportTableRequest};
use crate::table::reverse_periods;

pub async fn handle_get_report_table(
    req_payload: ReportTableRequest,
    report_store: Arc<RwLock<ReportStore>>,
) -> Result<Response<ReceiverStream<Result<PeriodRowMessage, Status>>>, Status> {
    tracing::debug!(report = %req_payload.report_name, "Handling ReportTableRequest in dedicated handler");

    let store = report_store.read().await;
    let table = store.get(&req_payload.report_name).map(|r| r.table.clone());
    drop(store);

    let table = match table {
        Some(t) if req_payload.reverse_periods => reverse_periods(&t),
        Some(t) => t,
        None => return Err(EngineError::ReportNotFound(req_payload.report_name).into()),
    };

    if table.is_empty() {
        tracing::warn!(report = %req_payload.report_name, "Report has no periods to stream");
    }

    let (tx, rx) = mpsc::channel(16);
    let report_for_log = req_payload.report_name.clone();

    tokio::spawn(async move {
        for row in &table.rows {
            let message = to_period_message(&table.metrics, row);
            if let Err(e) = tx.send(Ok(message)).await {
                tracing::error!(error = ?e, report = %report_for_log, "Client dropped report table stream");
                return;
            }
        }
        tracing::debug!(report = %report_for_log, count = table.len(), "Streamed report table");
    });

    Ok(Response::new(ReceiverStream::new(rx)))
}
