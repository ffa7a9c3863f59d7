#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use trendcast::domain::bar::Bar;
use trendcast::domain::error::TrendcastError;
use trendcast::domain::events::EventConfig;
use trendcast::domain::features::FeatureConfig;
use trendcast::domain::model::ModelConfig;
use trendcast::domain::pipeline::PipelineConfig;
use trendcast::domain::report::{MetricsRecord, SignalRecord, TradeRecord};
use trendcast::ports::data_port::BarSource;
use trendcast::ports::sink_port::RecordSink;

pub struct MockBarSource {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockBarSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl BarSource for MockBarSource {
    fn fetch(
        &self,
        ticker: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<Bar>, TrendcastError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TrendcastError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}

/// Collects records in memory so tests can assert on what was emitted.
#[derive(Default)]
pub struct MemorySink {
    pub signals: Vec<SignalRecord>,
    pub metrics: Vec<MetricsRecord>,
    pub trades: Vec<TradeRecord>,
}

impl RecordSink for MemorySink {
    fn write_signal(&mut self, record: &SignalRecord) -> Result<(), TrendcastError> {
        self.signals.push(record.clone());
        Ok(())
    }

    fn write_metrics(&mut self, record: &MetricsRecord) -> Result<(), TrendcastError> {
        self.metrics.push(record.clone());
        Ok(())
    }

    fn write_trade(&mut self, record: &TradeRecord) -> Result<(), TrendcastError> {
        self.trades.push(record.clone());
        Ok(())
    }
}

pub fn make_bar(ticker: &str, date: &str, close: f64) -> Bar {
    Bar {
        ticker: ticker.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 10_000,
    }
}

/// `count` consecutive calendar days of bars with the given closes generator.
pub fn make_series(ticker: &str, start: &str, count: usize, close_at: impl Fn(usize) -> f64) -> Vec<Bar> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = close_at(i);
            Bar {
                ticker: ticker.to_string(),
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10_000 + (i as i64 % 10) * 500,
            }
        })
        .collect()
}

/// Wavy series with a mild uptrend: alternating up and down days so both
/// label classes occur and the moving averages cross more than once.
pub fn wavy_series(ticker: &str, count: usize) -> Vec<Bar> {
    make_series(ticker, "2023-01-02", count, |i| {
        100.0 + 0.05 * i as f64 + 5.0 * ((i as f64) / 7.0).sin()
    })
}

/// V-shaped series: 30 bars declining, then rising. Produces exactly one
/// upward moving-average crossover with small windows.
pub fn v_series(ticker: &str, count: usize) -> Vec<Bar> {
    make_series(ticker, "2023-01-02", count, |i| {
        if i < 30 {
            100.0 - 0.5 * i as f64
        } else {
            85.0 + 0.8 * (i - 30) as f64
        }
    })
}

/// Pipeline config with short windows so small synthetic series are enough.
pub fn small_pipeline_config() -> PipelineConfig {
    let mut config = PipelineConfig::new(
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    );
    config.features = FeatureConfig {
        short_window: 3,
        long_window: 5,
        breakout_window: 3,
        volume_window: 3,
        momentum_window: 2,
        volatility_window: 2,
        macd_fast: 3,
        macd_slow: 6,
        macd_signal: 2,
    };
    config.events = EventConfig::default();
    config.model = ModelConfig {
        min_training_rows: 5,
        ..ModelConfig::default()
    };
    config.model.forest.n_trees = 20;
    config.exit_horizon = 5;
    config.recent_signals = 3;
    config
}
