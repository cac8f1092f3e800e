use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Parse error at row '{row}', column '{column}': cannot read '{value}' ({reason})")]
    ParseError {
        row: String,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Internal processing error: {0}")]
    ProcessingError(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl From<EngineError> for tonic::Status {
    fn from(err: EngineError) -> Self {
        tracing::error!("Mapping EngineError to tonic::Status: {:?}", err);
        match err {
            EngineError::ConfigError(msg) => tonic::Status::failed_precondition(format!("Configuration error: {}", msg)),
            e @ EngineError::FileNotFound { .. } => tonic::Status::not_found(e.to_string()),
            e @ EngineError::ParseError { .. } => tonic::Status::invalid_argument(e.to_string()),
            EngineError::SchemaError(msg) => tonic::Status::invalid_argument(format!("Schema error: {}", msg)),
            EngineError::CsvSystemError { source } => tonic::Status::invalid_argument(format!("CSV parsing system error: {}", source)),
            EngineError::IoError { source } => tonic::Status::internal(format!("I/O error: {}", source)),
            EngineError::CsvDataFormatError(msg) => tonic::Status::invalid_argument(format!("CSV data format error: {}", msg)),
            EngineError::InvalidRequest(msg) => tonic::Status::invalid_argument(format!("Invalid request: {}", msg)),
            EngineError::ReportNotFound(name) => tonic::Status::not_found(format!("Report not found: {}", name)),
            EngineError::ProcessingError(msg) => tonic::Status::internal(format!("Processing error: {}", msg)),
            EngineError::AnyhowError(source) => tonic::Status::internal(format!("An internal error occurred: {}", source)),
        }
    }
}
