// Reshaping helpers for raw and clean tables
use crate::error::EngineError;
use shared::models::{Cell, CleanTable, PeriodOrder, PeriodRow, RawTable};

/// Swaps rows and columns of a rectangular grid.
pub fn transpose<T: Clone>(grid: &[Vec<T>]) -> Result<Vec<Vec<T>>, EngineError> {
    let width = match grid.first() {
        Some(row) => row.len(),
        None => return Ok(Vec::new()),
    };
    if let Some((idx, row)) = grid.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(EngineError::ProcessingError(format!(
            "Cannot transpose ragged grid: row {} has {} cells, expected {}",
            idx,
            row.len(),
            width
        )));
    }
    Ok((0..width)
        .map(|col| grid.iter().map(|row| row[col].clone()).collect())
        .collect())
}

pub fn reverse_periods(table: &CleanTable) -> CleanTable {
    CleanTable {
        metrics: table.metrics.clone(),
        rows: table.rows.iter().rev().cloned().collect(),
    }
}

pub fn apply_order(table: CleanTable, order: PeriodOrder) -> CleanTable {
    match order {
        PeriodOrder::AsRecorded => table,
        PeriodOrder::Reversed => reverse_periods(&table),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub metric: String,
    pub values: Vec<Option<f64>>,
}

/// A clean table laid out metric-major, the way the source files list it.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricMajor {
    pub periods: Vec<String>,
    pub series: Vec<MetricSeries>,
}

pub fn to_metric_rows(table: &CleanTable) -> Result<MetricMajor, EngineError> {
    let grid: Vec<Vec<Option<f64>>> = table.rows.iter().map(|r| r.values.clone()).collect();
    let mut columns = transpose(&grid)?;
    if columns.is_empty() {
        // No periods: every metric still gets an (empty) series.
        columns = vec![Vec::new(); table.metrics.len()];
    }
    if columns.len() != table.metrics.len() {
        return Err(EngineError::SchemaError(format!(
            "Table lists {} metrics but rows carry {} values",
            table.metrics.len(),
            columns.len()
        )));
    }
    Ok(MetricMajor {
        periods: table.periods().map(str::to_string).collect(),
        series: table
            .metrics
            .iter()
            .cloned()
            .zip(columns)
            .map(|(metric, values)| MetricSeries { metric, values })
            .collect(),
    })
}

pub fn from_metric_rows(major: &MetricMajor) -> Result<CleanTable, EngineError> {
    if let Some(s) = major.series.iter().find(|s| s.values.len() != major.periods.len()) {
        return Err(EngineError::SchemaError(format!(
            "Metric '{}' has {} values for {} periods",
            s.metric,
            s.values.len(),
            major.periods.len()
        )));
    }
    let grid: Vec<Vec<Option<f64>>> = major.series.iter().map(|s| s.values.clone()).collect();
    let mut by_period = transpose(&grid)?;
    if by_period.is_empty() {
        by_period = vec![Vec::new(); major.periods.len()];
    }
    Ok(CleanTable {
        metrics: major.series.iter().map(|s| s.metric.clone()).collect(),
        rows: major
            .periods
            .iter()
            .cloned()
            .zip(by_period)
            .map(|(period, values)| PeriodRow { period, values })
            .collect(),
    })
}

/// One metric across all periods, in table order.
pub fn series(table: &CleanTable, metric: &str) -> Result<Vec<Option<f64>>, EngineError> {
    let idx = table.metric_index(metric).ok_or_else(|| {
        EngineError::SchemaError(format!(
            "Metric '{}' not present (available: {})",
            metric,
            table.metrics.join(", ")
        ))
    })?;
    Ok(table.rows.iter().map(|r| r.values.get(idx).copied().flatten()).collect())
}

/// Builds a metric-major `RawTable` from a file whose rows are periods.
pub fn raw_from_period_rows(
    index_name: &str,
    metrics: Vec<String>,
    rows: Vec<(String, Vec<Cell>)>,
) -> Result<RawTable, EngineError> {
    let (periods, grid): (Vec<String>, Vec<Vec<Cell>>) = rows.into_iter().unzip();
    let mut columns = transpose(&grid)?;
    if columns.is_empty() {
        columns = vec![Vec::new(); metrics.len()];
    }
    if columns.len() != metrics.len() {
        return Err(EngineError::CsvDataFormatError(format!(
            "Header lists {} metrics but rows carry {} values",
            metrics.len(),
            columns.len()
        )));
    }
    let mut raw = RawTable::new(index_name, periods);
    for (metric, cells) in metrics.into_iter().zip(columns) {
        raw.push_row(metric, cells);
    }
    Ok(raw)
}
