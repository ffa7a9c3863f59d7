//! Structured output records and the per-ticker report.
//!
//! The core emits plain serde-serializable records; persistence (CSV,
//! spreadsheet, anything else) is an adapter concern behind the
//! [`crate::ports::sink_port::RecordSink`] port.

use crate::domain::backtest::TradeSummary;
use crate::domain::bar::Bar;
use crate::domain::error::TrendcastError;
use crate::domain::features::FeatureRow;
use crate::domain::model::ModelReport;
use crate::ports::sink_port::RecordSink;
use chrono::NaiveDate;
use serde::Serialize;

/// One bar's feature values and event flags, flattened for the sink.
#[derive(Debug, Clone, Serialize)]
pub struct SignalRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub close: f64,
    pub ma_crossover: bool,
    pub breakout_20d: bool,
    pub volume_spike: bool,
    pub strong_trend: bool,
    pub entry_signal: bool,
    pub momentum_5d: f64,
    pub ma_diff: f64,
    pub price_sma20_diff: f64,
    pub price_sma50_diff: f64,
    pub obv: f64,
    pub volume_change: f64,
    pub volume_ma_ratio: f64,
    pub volatility_5d: f64,
    pub macd: f64,
    pub macd_hist: f64,
}

impl SignalRecord {
    pub fn from_row(ticker: &str, row: &FeatureRow) -> Self {
        Self {
            date: row.date,
            ticker: ticker.to_string(),
            close: row.close,
            ma_crossover: row.events.ma_crossover,
            breakout_20d: row.events.breakout,
            volume_spike: row.events.volume_spike,
            strong_trend: row.events.strong_trend,
            entry_signal: row.entry_signal,
            momentum_5d: row.momentum,
            ma_diff: row.ma_diff,
            price_sma20_diff: row.price_short_diff,
            price_sma50_diff: row.price_long_diff,
            obv: row.obv_norm,
            volume_change: row.volume_change,
            volume_ma_ratio: row.volume_ma_ratio,
            volatility_5d: row.volatility,
            macd: row.macd,
            macd_hist: row.macd_hist,
        }
    }
}

/// Model-quality record: accuracy, probability and the top split features.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRecord {
    pub ticker: String,
    pub run_date: NaiveDate,
    pub accuracy: f64,
    pub up_probability: f64,
    /// Fraction of up-labels in the training window; the baseline for
    /// `accuracy`.
    pub base_rate: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    /// "name:weight" pairs joined with ';', descending by weight.
    pub top_features: String,
}

impl MetricsRecord {
    pub fn new(ticker: &str, run_date: NaiveDate, model: &ModelReport) -> Self {
        let top_features = model
            .importance
            .iter()
            .take(5)
            .map(|(name, weight)| format!("{name}:{weight:.4}"))
            .collect::<Vec<_>>()
            .join(";");
        Self {
            ticker: ticker.to_string(),
            run_date,
            accuracy: model.accuracy,
            up_probability: model.up_probability,
            base_rate: model.base_rate,
            train_rows: model.train_rows,
            test_rows: model.test_rows,
            top_features,
        }
    }
}

/// Trade-journal record for one closed trade.
#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub return_pct: f64,
    pub win: bool,
}

/// Price-range statistics over the fetched window.
#[derive(Debug, Clone)]
pub struct RangeSummary {
    pub current_price: f64,
    pub highest_price: f64,
    pub lowest_price: f64,
    pub bars: usize,
}

impl RangeSummary {
    pub fn compute(bars: &[Bar]) -> Self {
        let current_price = bars.last().map(|b| b.close).unwrap_or(f64::NAN);
        let highest_price = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest_price = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        Self {
            current_price,
            highest_price,
            lowest_price,
            bars: bars.len(),
        }
    }
}

/// A recent entry signal, newest first in [`TickerReport::recent_signals`].
#[derive(Debug, Clone)]
pub struct RecentSignal {
    pub date: NaiveDate,
    pub price: f64,
}

/// Everything a successful per-ticker run produces.
#[derive(Debug, Clone)]
pub struct TickerReport {
    pub ticker: String,
    pub run_date: NaiveDate,
    pub summary: RangeSummary,
    pub latest: SignalRecord,
    pub total_signals: usize,
    pub recent_signals: Vec<RecentSignal>,
    pub model: ModelReport,
    pub trades: TradeSummary,
}

impl TickerReport {
    /// Human-readable digest for the alert/query boundary.
    pub fn digest(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} {}\n", self.ticker, self.run_date));
        out.push_str(&format!(
            "Price: {:.2} (range {:.2} to {:.2} over {} bars)\n",
            self.summary.current_price,
            self.summary.lowest_price,
            self.summary.highest_price,
            self.summary.bars,
        ));
        out.push_str(&format!(
            "Model: {:.2}% held-out accuracy (base rate {:.1}%), P(up tomorrow) = {:.1}%\n",
            self.model.accuracy * 100.0,
            self.model.base_rate * 100.0,
            self.model.up_probability * 100.0,
        ));
        out.push_str(&format!("Entry signals: {}\n", self.total_signals));
        for signal in &self.recent_signals {
            out.push_str(&format!("  {} @ {:.2}\n", signal.date, signal.price));
        }
        match self.trades.win_ratio() {
            Some(ratio) => out.push_str(&format!(
                "Trades: {} closed, {} open, win ratio {:.1}%, total P&L {:.2}\n",
                self.trades.closed.len(),
                self.trades.open.len(),
                ratio * 100.0,
                self.trades.total_pnl(),
            )),
            None => out.push_str("Trades: none closed, win ratio N/A\n"),
        }
        out
    }

    /// Write this report's records through a sink.
    pub fn emit(&self, sink: &mut dyn RecordSink) -> Result<(), TrendcastError> {
        sink.write_signal(&self.latest)?;
        sink.write_metrics(&MetricsRecord::new(&self.ticker, self.run_date, &self.model))?;
        for trade in &self.trades.closed {
            sink.write_trade(&TradeRecord {
                ticker: trade.ticker.clone(),
                entry_date: trade.entry_date,
                exit_date: trade.exit_date,
                entry_price: trade.entry_close,
                exit_price: trade.exit_close,
                pnl: trade.pnl(),
                return_pct: trade.return_pct(),
                win: trade.is_win(),
            })?;
        }
        Ok(())
    }
}

/// One ticker's outcome in a batch: report or captured error.
#[derive(Debug)]
pub enum TickerOutcome {
    Success(Box<TickerReport>),
    Failure { ticker: String, error: TrendcastError },
}

/// Aggregated batch result. Failed tickers are carried alongside successes,
/// never dropped.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<TickerOutcome>,
}

impl BatchReport {
    pub fn successes(&self) -> impl Iterator<Item = &TickerReport> {
        self.outcomes.iter().filter_map(|o| match o {
            TickerOutcome::Success(report) => Some(report.as_ref()),
            TickerOutcome::Failure { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &TrendcastError)> {
        self.outcomes.iter().filter_map(|o| match o {
            TickerOutcome::Success(_) => None,
            TickerOutcome::Failure { ticker, error } => Some((ticker.as_str(), error)),
        })
    }
}
