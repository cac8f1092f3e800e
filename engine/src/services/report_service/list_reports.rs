// Handler for the ListReports RPC
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Response, Status};

use super::helpers::to_report_info;
use crate::data::report_store::ReportStore;
use crate::services::ListReportsResponse;

pub async fn handle_list_reports(report_store: Arc<RwLock<ReportStore>>) -> Result<Response<ListReportsResponse>, Status> {
    let store = report_store.read().await;
    let summaries = store.summaries();
    drop(store);

    Ok(Response::new(ListReportsResponse {
        reports: summaries.into_iter().map(to_report_info).collect(),
    }))
}
