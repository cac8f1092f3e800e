// Chart layouts used for the weekly site reports
use super::{Axis, BarMode, ChartLayout, ChartSpec, Legend, Trace};
use crate::error::EngineError;
use crate::table::series;
use shared::models::CleanTable;

const DEFAULT_WIDTH: u32 = 1000;
const DEFAULT_HEIGHT: u32 = 600;
const TEMPLATE: &str = "plotly_white";
const PERIOD_AXIS_TITLE: &str = "Weeks";

#[derive(Debug, Clone, PartialEq)]
pub struct DualAxisMetrics {
    pub bars: String,
    pub line: String,
    /// Percentage metric drawn against the right-hand axis.
    pub secondary_line: String,
}

impl Default for DualAxisMetrics {
    fn default() -> Self {
        DualAxisMetrics {
            bars: "Turnover".to_string(),
            line: "Net Profit/(Loss)".to_string(),
            secondary_line: "Wage Cost % of revenue".to_string(),
        }
    }
}

/// Request-level chart options. Empty metric lists fall back to each layout's defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub layout: ChartLayout,
    pub title: Option<String>,
    pub metrics: Vec<String>,
    pub line_metric: Option<String>,
}

impl ChartOptions {
    pub fn new(layout: ChartLayout) -> Self {
        ChartOptions {
            layout,
            title: None,
            metrics: Vec::new(),
            line_metric: None,
        }
    }
}

fn period_labels(table: &CleanTable) -> Vec<String> {
    table.periods().map(str::to_string).collect()
}

fn base_spec(title: &str, bar_mode: BarMode, y_title: &str) -> ChartSpec {
    ChartSpec {
        title: title.to_string(),
        traces: Vec::new(),
        bar_mode,
        x_axis: Axis::titled(PERIOD_AXIS_TITLE),
        y_axis: Axis::titled(y_title),
        y2_axis: None,
        legend: Legend {
            x: 0.01,
            y: 0.99,
            anchor_top_left: true,
        },
        hover_mode: None,
        template: TEMPLATE.to_string(),
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
    }
}

/// Turnover bars and a net profit line on the left axis, wage cost % on the right.
pub fn dual_axis(table: &CleanTable, title: &str, metrics: &DualAxisMetrics) -> Result<ChartSpec, EngineError> {
    let x = period_labels(table);
    let mut spec = base_spec(title, BarMode::Relative, &format!("{} & {} (€)", metrics.bars, metrics.line));
    spec.hover_mode = Some("x unified".to_string());
    spec.y_axis.range_to_zero = true;
    spec.y2_axis = Some(Axis {
        title: metrics.secondary_line.clone(),
        tick_format: Some(".0%".to_string()),
        range_to_zero: false,
    });

    spec.traces.push(Trace::bar(&metrics.bars, x.clone(), series(table, &metrics.bars)?).color("rgb(158,202,225)"));
    spec.traces.push(
        Trace::line(&metrics.line, x.clone(), series(table, &metrics.line)?)
            .color("rgb(255,127,14)")
            .width(3),
    );
    spec.traces.push(
        Trace::line(&metrics.secondary_line, x, series(table, &metrics.secondary_line)?)
            .color("rgb(44,160,44)")
            .width(3)
            .on_secondary(),
    );
    Ok(spec)
}

/// Bars stacked per period with an optional overlay line on the same axis.
pub fn stacked(table: &CleanTable, title: &str, bars: &[String], line: Option<&str>) -> Result<ChartSpec, EngineError> {
    if bars.is_empty() {
        return Err(EngineError::SchemaError("Stacked chart needs at least one bar metric".to_string()));
    }
    let x = period_labels(table);
    let mut spec = base_spec(title, BarMode::Stack, "Revenue & Net Profit (€)");
    spec.legend = Legend {
        x: 0.01,
        y: 0.01,
        anchor_top_left: false,
    };

    for metric in bars {
        spec.traces.push(Trace::bar(metric, x.clone(), series(table, metric)?));
    }
    if let Some(metric) = line {
        spec.traces.push(Trace::line(metric, x, series(table, metric)?).color("red").width(2).marker(6));
    }
    Ok(spec)
}

/// Side-by-side bars, one group per period.
pub fn grouped(table: &CleanTable, title: &str, bars: &[String]) -> Result<ChartSpec, EngineError> {
    if bars.is_empty() {
        return Err(EngineError::SchemaError("Grouped chart needs at least one bar metric".to_string()));
    }
    let x = period_labels(table);
    let mut spec = base_spec(title, BarMode::Group, "Amount (€)");
    for metric in bars {
        spec.traces.push(Trace::bar(metric, x.clone(), series(table, metric)?));
    }
    Ok(spec)
}

pub fn build_chart(table: &CleanTable, options: &ChartOptions) -> Result<ChartSpec, EngineError> {
    match options.layout {
        ChartLayout::DualAxis => {
            let metrics = match options.metrics.as_slice() {
                [] => DualAxisMetrics::default(),
                [bars, line, secondary_line] => DualAxisMetrics {
                    bars: bars.clone(),
                    line: line.clone(),
                    secondary_line: secondary_line.clone(),
                },
                other => {
                    return Err(EngineError::SchemaError(format!(
                        "Dual-axis chart takes exactly three metrics (bars, line, percentage line), got {}",
                        other.len()
                    )))
                }
            };
            let title = options.title.as_deref().unwrap_or("Performance Metrics");
            dual_axis(table, title, &metrics)
        }
        ChartLayout::Stacked => {
            let bars = if options.metrics.is_empty() {
                vec!["Revenue Smithfield".to_string(), "Revenue Rathmines".to_string()]
            } else {
                options.metrics.clone()
            };
            let line = match (&options.line_metric, options.metrics.is_empty()) {
                (Some(metric), _) => Some(metric.as_str()),
                (None, true) => Some("Net profit (%)"),
                (None, false) => None,
            };
            let title = options.title.as_deref().unwrap_or("Group Revenue and Net Profit Over Time");
            stacked(table, title, &bars, line)
        }
        ChartLayout::Grouped => {
            let bars = if options.metrics.is_empty() {
                table.metrics.clone()
            } else {
                options.metrics.clone()
            };
            let title = options.title.as_deref().unwrap_or("Weekly Comparison");
            grouped(table, title, &bars)
        }
    }
}
