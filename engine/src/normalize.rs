// Turns a formatted, metric-major RawTable into a numeric, period-major CleanTable
use crate::error::EngineError;
use crate::table::{apply_order, transpose};
use shared::models::{Cell, CleanTable, MetricFormat, PeriodOrder, PeriodRow, RawTable};
use shared::utils::amount_format::{parse_amount, AmountError};
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Sentinel row labels (e.g. "EUR") dropped before parsing.
    pub excluded_rows: BTreeSet<String>,
    /// Metrics not listed here use `MetricFormat::Auto`.
    pub formats: HashMap<String, MetricFormat>,
    pub order: PeriodOrder,
}

impl NormalizeOptions {
    pub fn excluding<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_rows.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn with_format(mut self, metric: impl Into<String>, format: MetricFormat) -> Self {
        self.formats.insert(metric.into(), format);
        self
    }

    pub fn with_order(mut self, order: PeriodOrder) -> Self {
        self.order = order;
        self
    }

    pub fn format_of(&self, metric: &str) -> MetricFormat {
        self.formats.get(metric).copied().unwrap_or_default()
    }

    pub fn is_excluded(&self, label: &str) -> bool {
        self.excluded_rows.contains(label.trim())
    }
}

fn parse_error(row: &str, column: &str, value: &str, reason: impl Into<String>) -> EngineError {
    EngineError::ParseError {
        row: row.to_string(),
        column: column.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Converts one cell. Numbers skip text parsing and blanks stay `None`.
pub fn parse_cell(row: &str, column: &str, cell: &Cell, format: MetricFormat) -> Result<Option<f64>, EngineError> {
    let text = match cell {
        Cell::Number(v) if format == MetricFormat::Percent => return Ok(Some(v / 100.0)),
        Cell::Number(v) => return Ok(Some(*v)),
        Cell::Blank => return Ok(None),
        Cell::Text(s) if s.trim().is_empty() => return Ok(None),
        Cell::Text(s) => s,
    };

    let parsed = parse_amount(text).map_err(|e| match e {
        AmountError::Empty => parse_error(row, column, text, "empty value"),
        other => parse_error(row, column, text, other.to_string()),
    })?;

    match format {
        MetricFormat::Auto => Ok(Some(parsed.scaled())),
        MetricFormat::Numeric if parsed.percent => Err(parse_error(
            row,
            column,
            text,
            "percentage given for a numeric metric",
        )),
        MetricFormat::Numeric => Ok(Some(parsed.value)),
        MetricFormat::Percent => Ok(Some(parsed.value / 100.0)),
    }
}

pub fn normalize(raw: &RawTable, options: &NormalizeOptions) -> Result<CleanTable, EngineError> {
    let mut metrics = Vec::new();
    let mut grid: Vec<Vec<Option<f64>>> = Vec::new();
    let mut seen = HashSet::new();
    let mut dropped = 0usize;

    for row in &raw.rows {
        if options.is_excluded(&row.metric) {
            dropped += 1;
            continue;
        }
        if row.cells.len() != raw.periods.len() {
            return Err(EngineError::SchemaError(format!(
                "Row '{}' has {} cells for {} periods",
                row.metric,
                row.cells.len(),
                raw.periods.len()
            )));
        }
        if !seen.insert(row.metric.as_str()) {
            return Err(EngineError::SchemaError(format!("Metric '{}' appears more than once", row.metric)));
        }

        let format = options.format_of(&row.metric);
        let values = row
            .cells
            .iter()
            .zip(&raw.periods)
            .map(|(cell, period)| parse_cell(&row.metric, period, cell, format))
            .collect::<Result<Vec<_>, _>>()?;

        metrics.push(row.metric.clone());
        grid.push(values);
    }

    let by_period = if grid.is_empty() {
        vec![Vec::new(); raw.periods.len()]
    } else {
        transpose(&grid)?
    };

    let rows = raw
        .periods
        .iter()
        .cloned()
        .zip(by_period)
        .map(|(period, values)| PeriodRow { period, values })
        .collect();

    tracing::debug!(
        metrics = metrics.len(),
        periods = raw.periods.len(),
        dropped_rows = dropped,
        order = ?options.order,
        "Normalized raw table"
    );

    Ok(apply_order(CleanTable { metrics, rows }, options.order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{from_metric_rows, reverse_periods, to_metric_rows};
    use proptest::prelude::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn weekly_raw() -> RawTable {
        let mut raw = RawTable::new("Group", vec!["W1".to_string(), "W2".to_string()]);
        raw.push_row("EUR", vec![text("EUR"), text("EUR")]);
        raw.push_row("Turnover", vec![text("1,000"), text("2,500")]);
        raw.push_row("Net Profit/(Loss)", vec![text("(120)"), Cell::Number(340.0)]);
        raw.push_row("Wage Cost % of revenue", vec![text("31.5%"), Cell::Blank]);
        raw
    }

    fn default_options() -> NormalizeOptions {
        NormalizeOptions::default().excluding(["EUR"])
    }

    #[test]
    fn test_turnover_example() {
        let clean = normalize(&weekly_raw(), &default_options()).unwrap();
        assert_eq!(clean.periods().collect::<Vec<_>>(), vec!["W1", "W2"]);
        assert_eq!(clean.value("W1", "Turnover"), Some(1000.0));
        assert_eq!(clean.value("W2", "Turnover"), Some(2500.0));
        assert_eq!(clean.value("W1", "Net Profit/(Loss)"), Some(-120.0));
        assert_eq!(clean.value("W2", "Net Profit/(Loss)"), Some(340.0));
        assert_eq!(clean.value("W1", "Wage Cost % of revenue"), Some(0.315));
        assert_eq!(clean.rows[1].values[2], None);
    }

    #[test]
    fn test_reversed_order() {
        let options = default_options().with_order(PeriodOrder::Reversed);
        let clean = normalize(&weekly_raw(), &options).unwrap();
        assert_eq!(clean.periods().collect::<Vec<_>>(), vec!["W2", "W1"]);
        assert_eq!(clean.rows[0].values[0], Some(2500.0));
        let as_recorded = normalize(&weekly_raw(), &default_options()).unwrap();
        assert_eq!(reverse_periods(&clean), as_recorded);
    }

    #[test]
    fn test_sentinel_rows_never_appear() {
        let clean = normalize(&weekly_raw(), &default_options()).unwrap();
        assert!(!clean.metrics.iter().any(|m| m == "EUR"));
        assert_eq!(clean.metrics.len(), 3);
    }

    #[test]
    fn test_sentinel_match_ignores_padding() {
        let mut raw = weekly_raw();
        raw.rows[0].metric = " EUR ".to_string();
        let clean = normalize(&raw, &default_options()).unwrap();
        assert!(!clean.metrics.iter().any(|m| m.trim() == "EUR"));
    }

    #[test]
    fn test_sentinel_kept_without_exclusion_fails_to_parse() {
        let err = normalize(&weekly_raw(), &NormalizeOptions::default()).unwrap_err();
        match err {
            EngineError::ParseError { row, column, value, .. } => {
                assert_eq!(row, "EUR");
                assert_eq!(column, "W1");
                assert_eq!(value, "EUR");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_cell_names_row_and_column() {
        let mut raw = weekly_raw();
        raw.rows[1].cells[1] = text("two thousand");
        let err = normalize(&raw, &default_options()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'Turnover'"), "{msg}");
        assert!(msg.contains("'W2'"), "{msg}");
        assert!(msg.contains("two thousand"), "{msg}");
    }

    #[test]
    fn test_percent_format_without_marker() {
        let mut raw = RawTable::new("Group", vec!["W1".to_string()]);
        raw.push_row("Net profit (%)", vec![text("12.5")]);
        let options = NormalizeOptions::default().with_format("Net profit (%)", MetricFormat::Percent);
        let clean = normalize(&raw, &options).unwrap();
        assert_eq!(clean.value("W1", "Net profit (%)"), Some(0.125));
    }

    #[test]
    fn test_numbers_skip_text_parsing() {
        let cell = Cell::Number(1234.5);
        assert_eq!(parse_cell("Turnover", "W1", &cell, MetricFormat::Auto).unwrap(), Some(1234.5));
        assert_eq!(parse_cell("Turnover", "W1", &cell, MetricFormat::Numeric).unwrap(), Some(1234.5));
        let points = Cell::Number(25.0);
        assert_eq!(parse_cell("Wage", "W1", &points, MetricFormat::Percent).unwrap(), Some(0.25));
    }

    #[test]
    fn test_numeric_format_rejects_percent() {
        let cell = text("5%");
        let err = parse_cell("Turnover", "W1", &cell, MetricFormat::Numeric).unwrap_err();
        assert!(err.to_string().contains("percentage given for a numeric metric"));
    }

    #[test]
    fn test_blank_cells_pass_through() {
        assert_eq!(parse_cell("T", "W1", &Cell::Blank, MetricFormat::Auto).unwrap(), None);
        assert_eq!(parse_cell("T", "W1", &text("   "), MetricFormat::Numeric).unwrap(), None);
    }

    #[test]
    fn test_comma_formatted_values() {
        for (input, expected) in [("1,234", 1234.0), ("12,345,678", 12345678.0), ("1,234.50", 1234.5), ("-9,999", -9999.0)] {
            let got = parse_cell("T", "W1", &text(input), MetricFormat::Auto).unwrap();
            assert_eq!(got, Some(expected), "input {input}");
        }
    }

    #[test]
    fn test_ragged_row_is_schema_error() {
        let mut raw = weekly_raw();
        raw.rows[1].cells.pop();
        assert!(matches!(normalize(&raw, &default_options()), Err(EngineError::SchemaError(_))));
    }

    #[test]
    fn test_duplicate_metric_is_schema_error() {
        let mut raw = weekly_raw();
        raw.push_row("Turnover", vec![text("1"), text("2")]);
        let err = normalize(&raw, &default_options()).unwrap_err();
        assert!(err.to_string().contains("appears more than once"));
    }

    #[test]
    fn test_only_sentinels_keeps_periods() {
        let mut raw = RawTable::new("Group", vec!["W1".to_string(), "W2".to_string()]);
        raw.push_row("EUR", vec![text("EUR"), text("EUR")]);
        let clean = normalize(&raw, &default_options()).unwrap();
        assert!(clean.metrics.is_empty());
        assert_eq!(clean.len(), 2);
    }

    #[test]
    fn test_round_trip_matches_raw_modulo_exclusion() {
        let raw = weekly_raw();
        let clean = normalize(&raw, &default_options()).unwrap();
        let major = to_metric_rows(&clean).unwrap();
        assert_eq!(major.periods, raw.periods);
        let kept: Vec<&str> = raw.metric_names().filter(|m| *m != "EUR").collect();
        let listed: Vec<&str> = major.series.iter().map(|s| s.metric.as_str()).collect();
        assert_eq!(listed, kept);
        assert_eq!(major.series[0].values, vec![Some(1000.0), Some(2500.0)]);
        assert_eq!(from_metric_rows(&major).unwrap(), clean);
    }

    fn grouped(n: u32) -> String {
        let digits = n.to_string();
        let mut out = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

    fn arb_amount_grid() -> impl Strategy<Value = Vec<Vec<u32>>> {
        (1usize..5).prop_flat_map(|periods| prop::collection::vec(prop::collection::vec(any::<u32>(), periods), 1..6))
    }

    proptest! {
        #[test]
        fn prop_comma_formatted_table_round_trips(grid in arb_amount_grid(), reversed in any::<bool>()) {
            let periods: Vec<String> = (1..=grid[0].len()).map(|w| format!("W{}", w)).collect();
            let mut raw = RawTable::new("Group", periods.clone());
            raw.push_row("EUR", vec![text("EUR"); periods.len()]);
            for (m, amounts) in grid.iter().enumerate() {
                raw.push_row(format!("Metric {}", m), amounts.iter().map(|a| text(&grouped(*a))).collect());
            }

            let order = if reversed { PeriodOrder::Reversed } else { PeriodOrder::AsRecorded };
            let clean = normalize(&raw, &default_options().with_order(order)).unwrap();
            let clean = apply_order(clean, order);
            let major = to_metric_rows(&clean).unwrap();

            prop_assert_eq!(&major.periods, &periods);
            prop_assert_eq!(major.series.len(), grid.len());
            for (series, amounts) in major.series.iter().zip(&grid) {
                let expected: Vec<Option<f64>> = amounts.iter().map(|a| Some(f64::from(*a))).collect();
                prop_assert_eq!(&series.values, &expected);
            }
        }
    }
}
