// gRPC service layer. Generated types come from proto/report.proto via build.rs.
pub mod generated {
    tonic::include_proto!("report");
}

pub mod report_service;

pub use generated::report_engine_client::ReportEngineClient;
pub use generated::report_engine_server::{ReportEngine, ReportEngineServer};
pub use generated::{
    ChartRequest, ChartResponse, ListReportsRequest, ListReportsResponse, LoadReportRequest,
    LoadReportResponse, MetricFormatOverride, MetricValue, PeriodRowMessage, ReportInfo,
    ReportTableRequest,
};
