// engine/src/services/report_service/mod.rs
// MyReportEngine implements the ReportEngine gRPC service and dispatches
// each RPC to a handler in a sibling module.

use super::{
    ChartRequest, ChartResponse, ListReportsRequest, ListReportsResponse, LoadReportRequest,
    LoadReportResponse, PeriodRowMessage, ReportEngine, ReportTableRequest,
};
use crate::config::settings::EngineSettings;
use crate::data::csv_parser::ReportCsvParser;
use crate::data::load_clean_table;
use crate::data::report_store::ReportStore;
use crate::error::EngineError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

pub mod build_chart;
pub mod get_report_table;
pub mod helpers;
pub mod list_reports;
pub mod load_report;

pub struct MyReportEngine {
    report_store: Arc<RwLock<ReportStore>>,
    settings: Arc<EngineSettings>,
}

impl MyReportEngine {
    pub fn new(report_store: Arc<RwLock<ReportStore>>, settings: Arc<EngineSettings>) -> Self {
        MyReportEngine { report_store, settings }
    }

    /// Loads every report listed in the settings. Stops at the first failure.
    pub async fn preload_reports(&self) -> Result<usize, EngineError> {
        for source in &self.settings.reports {
            let parser = ReportCsvParser::new(self.settings.delimiter_byte(), source.orientation);
            let options = source.normalize_options(&self.settings);
            let table = load_clean_table(&source.path, &parser, &options).map_err(|e| {
                tracing::error!(report = %source.name, path = %source.path, error = %e, "Failed to preload report");
                e
            })?;
            self.report_store.write().await.insert(&source.name, &source.path, table);
        }
        Ok(self.settings.reports.len())
    }
}

#[tonic::async_trait]
impl ReportEngine for MyReportEngine {
    async fn load_report(&self, request: Request<LoadReportRequest>) -> Result<Response<LoadReportResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            report = %req_payload.report_name,
            path = %req_payload.file_path,
            orientation = %req_payload.orientation,
            "Received LoadReportRequest, dispatching to handler."
        );
        load_report::handle_load_report(req_payload, self.report_store.clone(), self.settings.clone()).await
    }

    type GetReportTableStream = ReceiverStream<Result<PeriodRowMessage, Status>>;
    async fn get_report_table(
        &self,
        request: Request<ReportTableRequest>,
    ) -> Result<Response<Self::GetReportTableStream>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            report = %req_payload.report_name,
            reverse = req_payload.reverse_periods,
            "Received ReportTableRequest, dispatching to handler."
        );
        get_report_table::handle_get_report_table(req_payload, self.report_store.clone()).await
    }

    async fn build_chart(&self, request: Request<ChartRequest>) -> Result<Response<ChartResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            report = %req_payload.report_name,
            layout = %req_payload.layout,
            "Received ChartRequest, dispatching to handler."
        );
        build_chart::handle_build_chart(req_payload, self.report_store.clone()).await
    }

    async fn list_reports(&self, _request: Request<ListReportsRequest>) -> Result<Response<ListReportsResponse>, Status> {
        tracing::info!("Received ListReportsRequest");
        list_reports::handle_list_reports(self.report_store.clone()).await
    }
}
