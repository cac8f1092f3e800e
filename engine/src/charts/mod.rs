// Renderer-neutral chart descriptions built from clean tables.
// A ChartSpec only says what to draw; `to_plotly_json` hands it to Plotly.
pub mod layouts;

use crate::error::EngineError;
use serde_json::{json, Map, Value};
use std::str::FromStr;

pub use layouts::{build_chart, dual_axis, grouped, stacked, ChartOptions, DualAxisMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartLayout {
    /// Bars plus lines, with a secondary percentage axis.
    DualAxis,
    Stacked,
    Grouped,
}

impl FromStr for ChartLayout {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "dual-axis" | "dual" => Ok(ChartLayout::DualAxis),
            "stacked" | "stack" => Ok(ChartLayout::Stacked),
            "grouped" | "group" => Ok(ChartLayout::Grouped),
            other => Err(EngineError::InvalidRequest(format!(
                "Unknown chart layout '{}'. Use 'dual-axis', 'stacked' or 'grouped'.",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMode {
    Relative,
    Stack,
    Group,
}

impl BarMode {
    fn as_plotly(&self) -> &'static str {
        match self {
            BarMode::Relative => "relative",
            BarMode::Stack => "stack",
            BarMode::Group => "group",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    pub axis: AxisSide,
    pub color: Option<String>,
    pub line_width: Option<u32>,
    pub marker_size: Option<u32>,
}

impl Trace {
    pub fn bar(name: &str, x: Vec<String>, y: Vec<Option<f64>>) -> Self {
        Trace {
            name: name.to_string(),
            kind: TraceKind::Bar,
            x,
            y,
            axis: AxisSide::Primary,
            color: None,
            line_width: None,
            marker_size: None,
        }
    }

    pub fn line(name: &str, x: Vec<String>, y: Vec<Option<f64>>) -> Self {
        Trace {
            kind: TraceKind::Line,
            ..Trace::bar(name, x, y)
        }
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn marker(mut self, size: u32) -> Self {
        self.marker_size = Some(size);
        self
    }

    pub fn on_secondary(mut self) -> Self {
        self.axis = AxisSide::Secondary;
        self
    }

    fn to_plotly(&self) -> Value {
        let mut trace = Map::new();
        trace.insert("name".into(), json!(self.name));
        trace.insert("x".into(), json!(self.x));
        trace.insert("y".into(), json!(self.y));
        match self.kind {
            TraceKind::Bar => {
                trace.insert("type".into(), json!("bar"));
                if let Some(color) = &self.color {
                    trace.insert("marker".into(), json!({ "color": color }));
                }
            }
            TraceKind::Line => {
                trace.insert("type".into(), json!("scatter"));
                trace.insert("mode".into(), json!("lines+markers"));
                let mut line = Map::new();
                if let Some(color) = &self.color {
                    line.insert("color".into(), json!(color));
                }
                if let Some(width) = self.line_width {
                    line.insert("width".into(), json!(width));
                }
                if !line.is_empty() {
                    trace.insert("line".into(), Value::Object(line));
                }
                if let Some(size) = self.marker_size {
                    trace.insert("marker".into(), json!({ "size": size }));
                }
            }
        }
        if self.axis == AxisSide::Secondary {
            trace.insert("yaxis".into(), json!("y2"));
        }
        Value::Object(trace)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub title: String,
    /// d3 format string, e.g. ".0%".
    pub tick_format: Option<String>,
    pub range_to_zero: bool,
}

impl Axis {
    pub fn titled(title: &str) -> Self {
        Axis {
            title: title.to_string(),
            tick_format: None,
            range_to_zero: false,
        }
    }

    fn to_plotly(&self) -> Map<String, Value> {
        let mut axis = Map::new();
        axis.insert("title".into(), json!({ "text": self.title }));
        if let Some(fmt) = &self.tick_format {
            axis.insert("tickformat".into(), json!(fmt));
        }
        if self.range_to_zero {
            axis.insert("rangemode".into(), json!("tozero"));
        }
        axis
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    /// Anchor the legend box by its top-left corner.
    pub anchor_top_left: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub traces: Vec<Trace>,
    pub bar_mode: BarMode,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub y2_axis: Option<Axis>,
    pub legend: Legend,
    pub hover_mode: Option<String>,
    pub template: String,
    pub width: u32,
    pub height: u32,
}

impl ChartSpec {
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }

    /// Plotly figure: `{"data": [...], "layout": {...}}`. Blank values become `null`.
    pub fn to_plotly_json(&self) -> Value {
        let mut layout = Map::new();
        layout.insert("title".into(), json!({ "text": self.title }));
        layout.insert("template".into(), json!(self.template));
        layout.insert("barmode".into(), json!(self.bar_mode.as_plotly()));
        layout.insert("width".into(), json!(self.width));
        layout.insert("height".into(), json!(self.height));
        if let Some(hover) = &self.hover_mode {
            layout.insert("hovermode".into(), json!(hover));
        }

        let mut legend = Map::new();
        legend.insert("x".into(), json!(self.legend.x));
        legend.insert("y".into(), json!(self.legend.y));
        if self.legend.anchor_top_left {
            legend.insert("xanchor".into(), json!("left"));
            legend.insert("yanchor".into(), json!("top"));
        }
        layout.insert("legend".into(), Value::Object(legend));

        layout.insert("xaxis".into(), Value::Object(self.x_axis.to_plotly()));
        layout.insert("yaxis".into(), Value::Object(self.y_axis.to_plotly()));
        if let Some(y2) = &self.y2_axis {
            let mut axis = y2.to_plotly();
            axis.insert("overlaying".into(), json!("y"));
            axis.insert("side".into(), json!("right"));
            layout.insert("yaxis2".into(), Value::Object(axis));
        }

        json!({
            "data": self.traces.iter().map(Trace::to_plotly).collect::<Vec<_>>(),
            "layout": layout,
        })
    }
}
