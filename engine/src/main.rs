// Report engine gRPC server
use engine::config::settings::EngineSettings;
use engine::data::report_store::ReportStore;
use engine::services::report_service::MyReportEngine;
use engine::services::ReportEngineServer;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::transport::Server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    info!("Starting Report Engine...");

    let settings = Arc::new(EngineSettings::from_env()?);
    let addr = settings.socket_addr()?;
    info!("Engine will listen on {}", addr);

    let report_store = Arc::new(RwLock::new(ReportStore::new()));
    let report_engine_service = MyReportEngine::new(report_store.clone(), settings.clone());

    let preloaded = report_engine_service.preload_reports().await?;
    info!(reports = preloaded, "Preloaded configured reports");

    Server::builder()
        .add_service(ReportEngineServer::new(report_engine_service))
        .serve(addr)
        .await?;

    Ok(())
}
