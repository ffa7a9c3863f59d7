//! Bar source port trait.

use crate::domain::bar::Bar;
use crate::domain::error::TrendcastError;
use chrono::NaiveDate;

/// Supplies raw daily bars for a ticker over a date range. Implementations
/// perform whatever I/O they need; the core never retries and treats any
/// failure as `DataUnavailable` for that ticker alone.
pub trait BarSource {
    fn fetch(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, TrendcastError>;
}
