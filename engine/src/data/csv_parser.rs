use crate::error::EngineError;
use crate::table::raw_from_period_rows;
use csv::{ReaderBuilder, StringRecord};
use shared::models::{Cell, RawTable, TableOrientation};
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ReportCsvParser {
    delimiter: u8,
    orientation: TableOrientation,
    /// Sentinel labels dropped while reading period-row files, where a
    /// source row would otherwise turn into a period.
    excluded_rows: BTreeSet<String>,
}

impl Default for ReportCsvParser {
    fn default() -> Self {
        ReportCsvParser {
            delimiter: b',',
            orientation: TableOrientation::MetricRows,
            excluded_rows: BTreeSet::new(),
        }
    }
}

impl ReportCsvParser {
    pub fn new(delimiter: u8, orientation: TableOrientation) -> Self {
        ReportCsvParser {
            delimiter,
            orientation,
            excluded_rows: BTreeSet::new(),
        }
    }

    pub fn excluding<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_rows.extend(labels.into_iter().map(Into::into));
        self
    }

    // Header: Group,W1,W2,...            (metric rows)
    //     or: Week,Turnover,Net Profit/(Loss),...   (period rows)
    // The first column is always the row label.
    pub fn load_raw_table(&self, file_path: impl AsRef<Path>) -> Result<RawTable, EngineError> {
        let path = file_path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EngineError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => EngineError::from(e),
        })?;
        tracing::debug!(path = %path.display(), orientation = ?self.orientation, "Reading report CSV");
        self.parse_reader(BufReader::new(file))
    }

    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<RawTable, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let (index_name, columns) = Self::split_header(&headers)?;

        let mut labelled_rows = Vec::new();
        let mut labels = HashSet::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result.map_err(|e| EngineError::CsvDataFormatError(format!("Error reading record at line {}: {}", line, e)))?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            if record.len() != columns.len() + 1 {
                return Err(EngineError::CsvDataFormatError(format!(
                    "Line {} has {} fields, header has {}",
                    line,
                    record.len(),
                    columns.len() + 1
                )));
            }

            let label = record.get(0).unwrap_or_default().trim().to_string();
            if label.is_empty() {
                return Err(EngineError::CsvDataFormatError(format!("Missing row label at line {}", line)));
            }
            if self.orientation == TableOrientation::PeriodRows && self.excluded_rows.contains(&label) {
                tracing::debug!(label = %label, line, "Skipping sentinel row");
                continue;
            }
            if !labels.insert(label.clone()) && self.orientation == TableOrientation::PeriodRows {
                return Err(EngineError::CsvDataFormatError(format!("Duplicate period '{}' at line {}", label, line)));
            }

            let cells = record.iter().skip(1).map(Cell::from_field).collect();
            labelled_rows.push((label, cells));
        }

        match self.orientation {
            TableOrientation::MetricRows => {
                let mut raw = RawTable::new(index_name, columns);
                for (metric, cells) in labelled_rows {
                    raw.push_row(metric, cells);
                }
                Ok(raw)
            }
            TableOrientation::PeriodRows => raw_from_period_rows(&index_name, columns, labelled_rows),
        }
    }

    fn split_header(headers: &StringRecord) -> Result<(String, Vec<String>), EngineError> {
        let mut fields = headers.iter().map(|h| h.trim_start_matches('\u{feff}').trim().to_string());
        let index_name = fields
            .next()
            .ok_or_else(|| EngineError::CsvDataFormatError("Missing header row".to_string()))?;

        let mut columns = Vec::new();
        let mut seen = HashSet::new();
        for (pos, name) in fields.enumerate() {
            if name.is_empty() {
                return Err(EngineError::CsvDataFormatError(format!("Empty column header at position {}", pos + 2)));
            }
            if !seen.insert(name.clone()) {
                return Err(EngineError::CsvDataFormatError(format!("Duplicate column header '{}'", name)));
            }
            columns.push(name);
        }
        Ok((index_name, columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_metric_rows() {
        let csv_content = "\
Group,Week 1,Week 2,Week 3
Revenue Smithfield,\"12,400\",\"13,150\",\"11,980\"
Revenue Rathmines,9800,\"10,020\",
Net profit (%),8.5%,9.1%,7.75%";
        let tmp_file = create_test_csv(csv_content);
        let raw = ReportCsvParser::default().load_raw_table(tmp_file.path()).unwrap();

        assert_eq!(raw.index_name, "Group");
        assert_eq!(raw.periods, vec!["Week 1", "Week 2", "Week 3"]);
        assert_eq!(raw.rows.len(), 3);
        let rathmines = raw.row("Revenue Rathmines").unwrap();
        assert_eq!(rathmines.cells, vec![Cell::Number(9800.0), Cell::Text("10,020".to_string()), Cell::Blank]);
        assert_eq!(raw.row("Net profit (%)").unwrap().cells[0], Cell::Text("8.5%".to_string()));
    }

    #[test]
    fn test_load_period_rows_transposes() {
        let csv_content = "\
Week,Turnover,Net Profit/(Loss),Wage Cost % of revenue
W1,\"21,000\",\"1,250\",31%
W2,\"19,500\",(300),35%";
        let tmp_file = create_test_csv(csv_content);
        let parser = ReportCsvParser::new(b',', TableOrientation::PeriodRows);
        let raw = parser.load_raw_table(tmp_file.path()).unwrap();

        assert_eq!(raw.index_name, "Week");
        assert_eq!(raw.periods, vec!["W1", "W2"]);
        assert_eq!(
            raw.metric_names().collect::<Vec<_>>(),
            vec!["Turnover", "Net Profit/(Loss)", "Wage Cost % of revenue"]
        );
        assert_eq!(raw.row("Net Profit/(Loss)").unwrap().cells[1], Cell::Text("(300)".to_string()));
    }

    #[test]
    fn test_period_rows_drop_sentinel_rows() {
        let csv_content = "\
Week,Turnover,Wage Cost % of revenue
EUR,EUR,%
W1,\"21,000\",31%
 EUR ,EUR,%
W2,\"19,500\",35%";
        let parser = ReportCsvParser::new(b',', TableOrientation::PeriodRows).excluding(["EUR"]);
        let raw = parser.parse_reader(csv_content.as_bytes()).unwrap();
        assert_eq!(raw.periods, vec!["W1", "W2"]);
        assert_eq!(raw.row("Turnover").unwrap().cells[1], Cell::Text("19,500".to_string()));
    }

    #[test]
    fn test_metric_rows_keep_sentinels_for_normalizer() {
        let parser = ReportCsvParser::default().excluding(["EUR"]);
        let raw = parser.parse_reader("Group,W1\nEUR,EUR\nTurnover,10\n".as_bytes()).unwrap();
        assert_eq!(raw.metric_names().collect::<Vec<_>>(), vec!["EUR", "Turnover"]);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let parser = ReportCsvParser::new(b';', TableOrientation::MetricRows);
        let raw = parser.parse_reader("Group;W1;W2\nTurnover;1,000;2,500\n".as_bytes()).unwrap();
        assert_eq!(raw.row("Turnover").unwrap().cells, vec![Cell::Text("1,000".to_string()), Cell::Text("2,500".to_string())]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let raw = ReportCsvParser::default()
            .parse_reader("Group,W1\nTurnover,10\n,\nEUR,EUR\n".as_bytes())
            .unwrap();
        assert_eq!(raw.metric_names().collect::<Vec<_>>(), vec!["Turnover", "EUR"]);
    }

    #[test]
    fn test_file_not_found() {
        let err = ReportCsvParser::default().load_raw_table("no_such_report.csv").unwrap_err();
        assert!(matches!(err, EngineError::FileNotFound { ref path } if path.contains("no_such_report.csv")));
    }

    #[test]
    fn test_ragged_row() {
        let err = ReportCsvParser::default()
            .parse_reader("Group,W1,W2\nTurnover,10\n".as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("Line 2 has 2 fields, header has 3"));
    }

    #[test]
    fn test_missing_label() {
        let err = ReportCsvParser::default()
            .parse_reader("Group,W1\n,10\n".as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("Missing row label at line 2"));
    }

    #[test]
    fn test_duplicate_period_header() {
        let err = ReportCsvParser::default()
            .parse_reader("Group,W1,W1\nTurnover,1,2\n".as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate column header 'W1'"));
    }

    #[test]
    fn test_header_only() {
        let raw = ReportCsvParser::default().parse_reader("Group,W1,W2\n".as_bytes()).unwrap();
        assert!(raw.rows.is_empty());
        assert_eq!(raw.periods.len(), 2);
    }
}
