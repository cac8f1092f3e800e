// Holds normalized reports in memory, keyed by report name
use chrono::{DateTime, Utc};
use shared::models::{CleanTable, ReportSummary};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct StoredReport {
    pub table: CleanTable,
    pub source_path: String,
    pub loaded_at: DateTime<Utc>,
}

pub struct ReportStore {
    reports: BTreeMap<String, StoredReport>,
}

impl ReportStore {
    pub fn new() -> Self {
        ReportStore {
            reports: BTreeMap::new(),
        }
    }

    /// Inserts or replaces a report. Returns true when an older copy was replaced.
    pub fn insert(&mut self, name: &str, source_path: &str, table: CleanTable) -> bool {
        let report = StoredReport {
            table,
            source_path: source_path.to_string(),
            loaded_at: Utc::now(),
        };
        self.reports.insert(name.to_string(), report).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&StoredReport> {
        self.reports.get(name)
    }

    pub fn summaries(&self) -> Vec<ReportSummary> {
        self.reports
            .iter()
            .map(|(name, report)| ReportSummary {
                name: name.clone(),
                source_path: report.source_path.clone(),
                periods: report.table.len(),
                metrics: report.table.metrics.clone(),
                loaded_at: report.loaded_at,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new()
    }
}
