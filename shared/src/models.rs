use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cell as read from a source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Blank,
}

impl Cell {
    /// Classifies a raw CSV field. Plain floats become `Number`, empty fields
    /// `Blank`, anything carrying formatting stays `Text` for the normalizer.
    pub fn from_field(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Cell::Blank;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Text(trimmed.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub metric: String,
    pub cells: Vec<Cell>,
}

/// Metric-major table: one row per metric, one column per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Header of the label column ("Group", "Week", ...).
    pub index_name: String,
    pub periods: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(index_name: impl Into<String>, periods: Vec<String>) -> Self {
        RawTable {
            index_name: index_name.into(),
            periods,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, metric: impl Into<String>, cells: Vec<Cell>) {
        self.rows.push(RawRow {
            metric: metric.into(),
            cells,
        });
    }

    pub fn row(&self, metric: &str) -> Option<&RawRow> {
        self.rows.iter().find(|r| r.metric == metric)
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.metric.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRow {
    pub period: String,
    /// Aligned with `CleanTable::metrics`. `None` is a blank source cell.
    pub values: Vec<Option<f64>>,
}

/// Period-major numeric table produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CleanTable {
    pub metrics: Vec<String>,
    pub rows: Vec<PeriodRow>,
}

impl CleanTable {
    pub fn periods(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.period.as_str())
    }

    pub fn metric_index(&self, metric: &str) -> Option<usize> {
        self.metrics.iter().position(|m| m == metric)
    }

    pub fn value(&self, period: &str, metric: &str) -> Option<f64> {
        let idx = self.metric_index(metric)?;
        self.rows
            .iter()
            .find(|r| r.period == period)
            .and_then(|r| r.values.get(idx).copied().flatten())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How text cells of a metric are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFormat {
    /// A trailing `%` marks a percentage, otherwise a plain amount.
    #[default]
    Auto,
    /// Amounts only; a `%` marker is rejected.
    Numeric,
    /// Percentage points, converted to a fraction with or without the marker.
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodOrder {
    #[default]
    AsRecorded,
    Reversed,
}

/// Which axis of the source file carries the metric names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOrientation {
    /// First column is the metric name, header cells are periods.
    #[default]
    MetricRows,
    /// First column is the period, header cells are metric names.
    PeriodRows,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub name: String,
    pub source_path: String,
    pub periods: usize,
    pub metrics: Vec<String>,
    pub loaded_at: DateTime<Utc>,
}
