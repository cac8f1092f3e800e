// One-shot export: CSV in, Plotly figure JSON out.
// With --engine the work is delegated to a running report engine instead.
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use engine::charts::{build_chart, ChartLayout, ChartOptions};
use engine::config::settings::EngineSettings;
use engine::data::csv_parser::ReportCsvParser;
use engine::data::load_clean_table;
use engine::normalize::NormalizeOptions;
use engine::services::report_service::helpers::parse_orientation;
use engine::services::{ChartRequest, LoadReportRequest, MetricFormatOverride, ReportEngineClient};
use shared::models::{MetricFormat, PeriodOrder};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "export_chart")]
#[command(about = "Normalize a weekly report CSV and export a chart as Plotly JSON")]
struct Args {
    /// Report CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// dual-axis, stacked or grouped
    #[arg(short, long, default_value = "dual-axis")]
    layout: String,

    #[arg(short, long)]
    title: Option<String>,

    /// metric-rows (labels down the first column are metrics) or period-rows
    #[arg(long, default_value = "metric-rows")]
    orientation: String,

    /// Sentinel row label to drop; repeatable. Defaults to the engine settings.
    #[arg(long = "exclude")]
    excluded_rows: Vec<String>,

    /// Drop only the rows named with --exclude, ignoring the configured defaults
    #[arg(long)]
    no_default_exclusions: bool,

    /// Metric whose values are percentage points; repeatable
    #[arg(long = "percent")]
    percent_metrics: Vec<String>,

    /// Metric that must not carry a % marker; repeatable
    #[arg(long = "numeric")]
    numeric_metrics: Vec<String>,

    /// Present periods newest first
    #[arg(long)]
    reverse: bool,

    /// Metrics to chart, comma separated
    #[arg(long, value_delimiter = ',')]
    metrics: Vec<String>,

    /// Overlay line metric for stacked charts
    #[arg(long)]
    line: Option<String>,

    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Address of a running engine, e.g. http://127.0.0.1:50051
    #[arg(long)]
    engine: Option<String>,

    /// Report name used with --engine (default: input file stem)
    #[arg(long)]
    name: Option<String>,
}

impl Args {
    fn normalize_options(&self, settings: &EngineSettings) -> NormalizeOptions {
        let excluded = if self.excluded_rows.is_empty() && !self.no_default_exclusions {
            settings.excluded_rows.clone()
        } else {
            self.excluded_rows.clone()
        };
        let order = if self.reverse { PeriodOrder::Reversed } else { settings.period_order };

        let mut options = NormalizeOptions::default().excluding(excluded).with_order(order);
        for metric in &self.percent_metrics {
            options = options.with_format(metric.clone(), MetricFormat::Percent);
        }
        for metric in &self.numeric_metrics {
            options = options.with_format(metric.clone(), MetricFormat::Numeric);
        }
        options
    }

    fn chart_options(&self) -> Result<ChartOptions> {
        let layout: ChartLayout = self.layout.parse()?;
        Ok(ChartOptions {
            layout,
            title: self.title.clone(),
            metrics: self.metrics.clone(),
            line_metric: self.line.clone(),
        })
    }

    fn report_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "report".to_string())
        })
    }
}

fn export_local(args: &Args, settings: &EngineSettings) -> Result<String> {
    if !args.delimiter.is_ascii() {
        return Err(anyhow!("Delimiter must be an ASCII character, got '{}'", args.delimiter));
    }
    let orientation = parse_orientation(&args.orientation)?;
    let parser = ReportCsvParser::new(args.delimiter as u8, orientation);
    let table = load_clean_table(&args.input, &parser, &args.normalize_options(settings))?;
    let spec = build_chart(&table, &args.chart_options()?)?;
    info!(traces = spec.traces.len(), periods = table.len(), "Built chart locally");
    Ok(serde_json::to_string_pretty(&spec.to_plotly_json())?)
}

async fn export_remote(args: &Args, endpoint: &str) -> Result<String> {
    let mut client = ReportEngineClient::connect(endpoint.to_string())
        .await
        .with_context(|| format!("Failed to connect to engine at {}", endpoint))?;

    let name = args.report_name();
    let mut formats: Vec<MetricFormatOverride> = args
        .percent_metrics
        .iter()
        .map(|m| MetricFormatOverride { metric: m.clone(), format: "percent".to_string() })
        .collect();
    formats.extend(
        args.numeric_metrics
            .iter()
            .map(|m| MetricFormatOverride { metric: m.clone(), format: "numeric".to_string() }),
    );

    let loaded = client
        .load_report(LoadReportRequest {
            report_name: name.clone(),
            file_path: args.input.display().to_string(),
            orientation: args.orientation.clone(),
            excluded_rows: args.excluded_rows.clone(),
            formats,
            reverse_periods: args.reverse,
            ignore_default_exclusions: args.no_default_exclusions,
        })
        .await?
        .into_inner();
    info!(report = %name, "{}", loaded.message);

    let chart = client
        .build_chart(ChartRequest {
            report_name: name,
            layout: args.layout.clone(),
            title: args.title.clone().unwrap_or_default(),
            metrics: args.metrics.clone(),
            line_metric: args.line.clone().unwrap_or_default(),
        })
        .await?
        .into_inner();

    let figure: serde_json::Value = serde_json::from_str(&chart.figure_json)?;
    Ok(serde_json::to_string_pretty(&figure)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = Args::parse();
    let settings = EngineSettings::from_env()?;

    let figure = match &args.engine {
        Some(endpoint) => export_remote(&args, endpoint).await?,
        None => export_local(&args, &settings)?,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, figure).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Chart written");
        }
        None => println!("{}", figure),
    }
    Ok(())
}
