// Engine settings, loaded from a JSON file or falling back to defaults
use crate::error::EngineError;
use crate::normalize::NormalizeOptions;
use serde::Deserialize;
use shared::models::{MetricFormat, PeriodOrder, TableOrientation};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

/// Environment variable naming the JSON settings file.
pub const CONFIG_ENV_VAR: &str = "REPORT_ENGINE_CONFIG";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub host: String,
    pub port: u16,
    pub csv_delimiter: char,
    /// Sentinel row labels dropped from every report unless a source overrides them.
    pub excluded_rows: Vec<String>,
    pub period_order: PeriodOrder,
    /// Reports loaded into the store at start-up.
    pub reports: Vec<ReportSource>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            host: "127.0.0.1".to_string(),
            port: 50051,
            csv_delimiter: ',',
            excluded_rows: vec!["EUR".to_string()],
            period_order: PeriodOrder::AsRecorded,
            reports: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportSource {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub orientation: TableOrientation,
    #[serde(default)]
    pub excluded_rows: Option<Vec<String>>,
    #[serde(default)]
    pub formats: HashMap<String, MetricFormat>,
    #[serde(default)]
    pub order: Option<PeriodOrder>,
}

impl ReportSource {
    pub fn normalize_options(&self, settings: &EngineSettings) -> NormalizeOptions {
        let excluded = self
            .excluded_rows
            .clone()
            .unwrap_or_else(|| settings.excluded_rows.clone());
        NormalizeOptions {
            excluded_rows: excluded.into_iter().collect(),
            formats: self.formats.clone(),
            order: self.order.unwrap_or(settings.period_order),
        }
    }
}

impl EngineSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EngineError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => EngineError::from(e),
        })?;
        let settings: EngineSettings = serde_json::from_str(&raw).map_err(|e| {
            EngineError::ConfigError(format!("Invalid settings file '{}': {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads the file named by `REPORT_ENGINE_CONFIG`, or returns defaults when unset.
    pub fn from_env() -> Result<Self, EngineError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, EngineError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| EngineError::ConfigError(format!("Invalid listen address '{}:{}': {}", self.host, self.port, e)))
    }

    fn validate(&self) -> Result<(), EngineError> {
        if !self.csv_delimiter.is_ascii() {
            return Err(EngineError::ConfigError(format!(
                "CSV delimiter must be a single ASCII character, got '{}'",
                self.csv_delimiter
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for report in &self.reports {
            if !seen.insert(report.name.as_str()) {
                return Err(EngineError::ConfigError(format!("Duplicate report name '{}'", report.name)));
            }
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.csv_delimiter as u8
    }
}
