// Conversions between wire messages and domain types
use crate::config::settings::EngineSettings;
use crate::error::EngineError;
use crate::normalize::NormalizeOptions;
use crate::services::{LoadReportRequest, MetricValue, PeriodRowMessage, ReportInfo};
use shared::models::{MetricFormat, PeriodOrder, PeriodRow, ReportSummary, TableOrientation};

pub fn parse_orientation(s: &str) -> Result<TableOrientation, EngineError> {
    match s.trim().to_lowercase().replace('-', "_").as_str() {
        "" | "metric_rows" => Ok(TableOrientation::MetricRows),
        "period_rows" => Ok(TableOrientation::PeriodRows),
        other => Err(EngineError::InvalidRequest(format!(
            "Unknown table orientation '{}'. Use 'metric_rows' or 'period_rows'.",
            other
        ))),
    }
}

pub fn parse_format(s: &str) -> Result<MetricFormat, EngineError> {
    match s.trim().to_lowercase().as_str() {
        "" | "auto" => Ok(MetricFormat::Auto),
        "numeric" => Ok(MetricFormat::Numeric),
        "percent" => Ok(MetricFormat::Percent),
        other => Err(EngineError::InvalidRequest(format!(
            "Unknown metric format '{}'. Use 'auto', 'numeric' or 'percent'.",
            other
        ))),
    }
}

pub fn order_from_flag(reverse: bool) -> PeriodOrder {
    if reverse {
        PeriodOrder::Reversed
    } else {
        PeriodOrder::AsRecorded
    }
}

pub fn options_from_request(req: &LoadReportRequest, settings: &EngineSettings) -> Result<NormalizeOptions, EngineError> {
    let excluded = if req.excluded_rows.is_empty() && !req.ignore_default_exclusions {
        settings.excluded_rows.clone()
    } else {
        req.excluded_rows.clone()
    };
    let mut options = NormalizeOptions::default()
        .excluding(excluded)
        .with_order(order_from_flag(req.reverse_periods));
    for entry in &req.formats {
        options = options.with_format(entry.metric.clone(), parse_format(&entry.format)?);
    }
    Ok(options)
}

pub fn to_period_message(metrics: &[String], row: &PeriodRow) -> PeriodRowMessage {
    PeriodRowMessage {
        period: row.period.clone(),
        values: metrics
            .iter()
            .zip(&row.values)
            .map(|(metric, value)| MetricValue {
                metric: metric.clone(),
                value: value.unwrap_or_default(),
                blank: value.is_none(),
            })
            .collect(),
    }
}

pub fn to_report_info(summary: ReportSummary) -> ReportInfo {
    ReportInfo {
        name: summary.name,
        source_path: summary.source_path,
        periods: summary.periods as i32,
        metrics: summary.metrics,
        loaded_at: summary.loaded_at.timestamp_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MetricFormatOverride;

    #[test]
    fn test_parse_orientation() {
        assert_eq!(parse_orientation("").unwrap(), TableOrientation::MetricRows);
        assert_eq!(parse_orientation("period-rows").unwrap(), TableOrientation::PeriodRows);
        assert!(parse_orientation("diagonal").is_err());
    }

    #[test]
    fn test_options_from_request_defaults_to_settings() {
        let req = LoadReportRequest {
            report_name: "group".to_string(),
            file_path: "group.csv".to_string(),
            orientation: String::new(),
            excluded_rows: vec![],
            formats: vec![MetricFormatOverride { metric: "Net profit (%)".to_string(), format: "percent".to_string() }],
            reverse_periods: true,
            ignore_default_exclusions: false,
        };
        let options = options_from_request(&req, &EngineSettings::default()).unwrap();
        assert!(options.is_excluded("EUR"));
        assert_eq!(options.order, PeriodOrder::Reversed);
        assert_eq!(options.format_of("Net profit (%)"), MetricFormat::Percent);
        assert_eq!(options.format_of("Turnover"), MetricFormat::Auto);
    }

    #[test]
    fn test_options_from_request_without_default_exclusions() {
        let req = LoadReportRequest {
            ignore_default_exclusions: true,
            ..Default::default()
        };
        let options = options_from_request(&req, &EngineSettings::default()).unwrap();
        assert!(options.excluded_rows.is_empty());
        assert!(!options.is_excluded("EUR"));

        let req = LoadReportRequest {
            excluded_rows: vec!["GBP".to_string()],
            ignore_default_exclusions: true,
            ..Default::default()
        };
        let options = options_from_request(&req, &EngineSettings::default()).unwrap();
        assert!(options.is_excluded("GBP"));
        assert!(!options.is_excluded("EUR"));
    }

    #[test]
    fn test_options_from_request_bad_format() {
        let req = LoadReportRequest {
            formats: vec![MetricFormatOverride { metric: "x".to_string(), format: "ratio".to_string() }],
            ..Default::default()
        };
        let err = options_from_request(&req, &EngineSettings::default()).unwrap_err();
        assert!(err.to_string().contains("Unknown metric format 'ratio'"));
    }

    #[test]
    fn test_period_message_marks_blanks() {
        let metrics = vec!["Turnover".to_string(), "Wage".to_string()];
        let row = PeriodRow { period: "W1".to_string(), values: vec![Some(10.0), None] };
        let msg = to_period_message(&metrics, &row);
        assert_eq!(msg.period, "W1");
        assert_eq!(msg.values[0].value, 10.0);
        assert!(!msg.values[0].blank);
        assert!(msg.values[1].blank);
    }
}
