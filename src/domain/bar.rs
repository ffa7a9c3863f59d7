//! Daily OHLCV bar representation and series validation.

use crate::domain::error::TrendcastError;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Bar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Result of sanitizing a raw bar series.
#[derive(Debug, Clone)]
pub struct CleanSeries {
    pub bars: Vec<Bar>,
    /// Rows dropped for a missing or non-finite close.
    pub dropped: usize,
    /// Bars retained despite non-positive volume. Volume features must
    /// tolerate these (ratios go non-finite and are filtered downstream).
    pub flagged_volume: usize,
}

/// Sanitize a raw series: drop rows with a non-finite close, collapse
/// duplicate dates to the last-seen entry, sort ascending by date, and
/// enforce the minimum bar count required by the longest lookback.
pub fn validate_bars(
    ticker: &str,
    raw: Vec<Bar>,
    minimum: usize,
) -> Result<CleanSeries, TrendcastError> {
    let total = raw.len();
    let mut bars: Vec<Bar> = raw.into_iter().filter(|b| b.close.is_finite()).collect();
    let dropped = total - bars.len();

    // Stable sort preserves arrival order within a date, so keeping the
    // last-seen entry per date is a backward dedup scan.
    bars.sort_by_key(|b| b.date);
    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }

    let flagged_volume = deduped.iter().filter(|b| b.volume <= 0).count();

    if deduped.len() < minimum {
        return Err(TrendcastError::InsufficientData {
            ticker: ticker.to_string(),
            bars: deduped.len(),
            minimum,
        });
    }

    Ok(CleanSeries {
        bars: deduped,
        dropped,
        flagged_volume,
    })
}
