//! CSV file bar source.
//!
//! Reads one file per ticker from a base directory, named `{TICKER}.csv`,
//! with a `date,open,high,low,close,volume` header row.

use crate::domain::bar::Bar;
use crate::domain::error::TrendcastError;
use crate::ports::data_port::BarSource;
use chrono::NaiveDate;
use std::path::PathBuf;

pub struct CsvBarAdapter {
    base_path: PathBuf,
}

impl CsvBarAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn data_error(ticker: &str, reason: String) -> TrendcastError {
    TrendcastError::DataUnavailable {
        ticker: ticker.to_string(),
        reason,
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
    ticker: &str,
) -> Result<&'a str, TrendcastError> {
    record
        .get(index)
        .ok_or_else(|| data_error(ticker, format!("missing {} column", name)))
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    ticker: &str,
) -> Result<T, TrendcastError>
where
    T::Err: std::fmt::Display,
{
    field(record, index, name, ticker)?
        .trim()
        .parse()
        .map_err(|e| data_error(ticker, format!("invalid {} value: {}", name, e)))
}

impl BarSource for CsvBarAdapter {
    fn fetch(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, TrendcastError> {
        let path = self.csv_path(ticker);
        let mut rdr = csv::Reader::from_path(&path)
            .map_err(|e| data_error(ticker, format!("failed to open {}: {}", path.display(), e)))?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record =
                result.map_err(|e| data_error(ticker, format!("CSV parse error: {}", e)))?;

            let date_str = field(&record, 0, "date", ticker)?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| data_error(ticker, format!("invalid date format: {}", e)))?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(Bar {
                ticker: ticker.to_string(),
                date,
                open: parse_field(&record, 1, "open", ticker)?,
                high: parse_field(&record, 2, "high", ticker)?,
                low: parse_field(&record, 3, "low", ticker)?,
                close: parse_field(&record, 4, "close", ticker)?,
                volume: parse_field(&record, 5, "volume", ticker)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";

        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        (dir, path)
    }

    #[test]
    fn fetch_returns_bars_sorted_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvBarAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();
        let bars = adapter.fetch("AAPL", start, end).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
    }

    #[test]
    fn fetch_filters_by_date_range() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvBarAdapter::new(path);

        let day = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let bars = adapter.fetch("AAPL", day, day).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, day);
    }

    #[test]
    fn fetch_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvBarAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let result = adapter.fetch("XYZ", start, end);

        assert!(matches!(
            result,
            Err(TrendcastError::DataUnavailable { ref ticker, .. }) if ticker == "XYZ"
        ));
    }

    #[test]
    fn fetch_errors_for_malformed_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(
            path.join("BAD.csv"),
            "date,open,high,low,close,volume\n2024-01-15,oops,1,1,1,1\n",
        )
        .unwrap();

        let adapter = CsvBarAdapter::new(path);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert!(adapter.fetch("BAD", start, end).is_err());
    }
}
