//! Single-pass pipeline per ticker and the multi-ticker batch loop.

use crate::domain::backtest::evaluate_trades;
use crate::domain::bar::validate_bars;
use crate::domain::error::TrendcastError;
use crate::domain::events::EventConfig;
use crate::domain::features::{build_features, FeatureConfig};
use crate::domain::model::{train_and_predict, ModelConfig};
use crate::domain::report::{
    BatchReport, RangeSummary, RecentSignal, SignalRecord, TickerOutcome, TickerReport,
};
use crate::ports::data_port::BarSource;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Full pipeline configuration, passed explicitly into every stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub features: FeatureConfig,
    pub events: EventConfig,
    pub model: ModelConfig,
    /// Holding horizon for the exit evaluator, in trading days.
    pub exit_horizon: usize,
    /// Most recent entry signals listed in the report/digest.
    pub recent_signals: usize,
}

impl PipelineConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            features: FeatureConfig::default(),
            events: EventConfig::default(),
            model: ModelConfig::default(),
            exit_horizon: 15,
            recent_signals: 5,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TickerListError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Parse a comma-separated ticker list: trimmed, uppercased, duplicates
/// rejected.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, TickerListError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(TickerListError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(TickerListError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// Run the full pipeline for one ticker: fetch, validate, features, events,
/// labels, train, backtest, report. Pure apart from the fetch.
pub fn run_ticker(
    source: &dyn BarSource,
    ticker: &str,
    config: &PipelineConfig,
) -> Result<TickerReport, TrendcastError> {
    let raw = source.fetch(ticker, config.start_date, config.end_date)?;
    if raw.is_empty() {
        return Err(TrendcastError::InsufficientData {
            ticker: ticker.to_string(),
            bars: 0,
            minimum: config.features.min_bars(),
        });
    }

    let clean = validate_bars(ticker, raw, config.features.min_bars())?;
    let bars = clean.bars;

    let table = build_features(&bars, &config.features, &config.events);
    let model = train_and_predict(&table, &bars, &config.model)?;
    let trades = evaluate_trades(&bars, &table, config.exit_horizon);

    let entry_rows: Vec<_> = table.rows.iter().filter(|r| r.entry_signal).collect();
    let recent_signals: Vec<RecentSignal> = entry_rows
        .iter()
        .rev()
        .take(config.recent_signals)
        .map(|r| RecentSignal {
            date: r.date,
            price: r.close,
        })
        .collect();

    let latest = table
        .latest()
        .expect("validated series has at least min_bars bars");

    Ok(TickerReport {
        ticker: ticker.to_string(),
        run_date: bars.last().expect("non-empty series").date,
        summary: RangeSummary::compute(&bars),
        latest: SignalRecord::from_row(ticker, latest),
        total_signals: entry_rows.len(),
        recent_signals,
        model,
        trades,
    })
}

/// Process tickers independently. A per-ticker failure is captured in the
/// batch report and never aborts the remaining tickers.
pub fn run_batch(
    source: &dyn BarSource,
    tickers: &[String],
    config: &PipelineConfig,
) -> BatchReport {
    let mut report = BatchReport::default();
    for ticker in tickers {
        let outcome = match run_ticker(source, ticker, config) {
            Ok(ticker_report) => TickerOutcome::Success(Box::new(ticker_report)),
            Err(error) => TickerOutcome::Failure {
                ticker: ticker.clone(),
                error,
            },
        };
        report.outcomes.push(outcome);
    }
    report
}
