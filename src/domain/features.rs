//! Feature engine: derives the named market-state features from a validated
//! bar series.
//!
//! Every feature at index `t` is a deterministic function of bars
//! `[0, t]` only. Rows are produced for bar indices at or beyond the warm-up
//! offset (the longest lookback window); earlier bars have no feature vector.

use crate::domain::bar::Bar;
use crate::domain::events::{detect_events, EventConfig, EventFlags};
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::{macd, obv, pct_change, rolling_max, rolling_mean, rolling_std, sma};
use chrono::NaiveDate;

/// Lookback windows and thresholds for the feature engine. Immutable;
/// passed explicitly so parallel per-ticker runs can use different values.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub breakout_window: usize,
    pub volume_window: usize,
    pub momentum_window: usize,
    pub volatility_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
            breakout_window: 20,
            volume_window: 20,
            momentum_window: 5,
            volatility_window: 5,
            macd_fast: DEFAULT_FAST,
            macd_slow: DEFAULT_SLOW,
            macd_signal: DEFAULT_SIGNAL,
        }
    }
}

impl FeatureConfig {
    /// Leading bars with no feature vector: the longest lookback window.
    pub fn warmup(&self) -> usize {
        self.long_window
            .max(self.short_window)
            .max(self.breakout_window)
            .max(self.volume_window)
            .max(self.macd_slow + self.macd_signal)
    }

    /// Minimum validated bars required before any feature row exists.
    pub fn min_bars(&self) -> usize {
        self.warmup() + 1
    }
}

/// Model input columns, in training order.
pub const FEATURE_NAMES: [&str; 14] = [
    "ma_crossover",
    "breakout_20d",
    "volume_spike",
    "strong_trend",
    "momentum_5d",
    "ma_diff",
    "price_sma20_diff",
    "price_sma50_diff",
    "OBV",
    "volume_change",
    "volume_ma_ratio",
    "volatility_5d",
    "MACD",
    "MACD_hist",
];

/// One bar's feature vector. Boolean event flags live in `events`; the
/// numeric fields are the point-in-time inputs the flags derive from.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    /// Index into the validated bar series.
    pub index: usize,
    pub date: NaiveDate,
    pub close: f64,
    pub momentum: f64,
    /// (short SMA - long SMA) / close.
    pub ma_diff: f64,
    /// (close - short SMA) / close.
    pub price_short_diff: f64,
    /// (close - long SMA) / close.
    pub price_long_diff: f64,
    /// OBV over the rolling volume-window volume sum.
    pub obv_norm: f64,
    pub volume_change: f64,
    pub volume_ma_ratio: f64,
    pub volatility: f64,
    pub macd: f64,
    pub macd_hist: f64,
    /// Max close of the prior breakout-window bars (excludes the current bar).
    pub prior_high_close: f64,
    /// The configured entry combination evaluated over `events`.
    pub entry_signal: bool,
    pub events: EventFlags,
}

impl FeatureRow {
    /// Flatten into the model's input order ([`FEATURE_NAMES`]).
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            bool_feature(self.events.ma_crossover),
            bool_feature(self.events.breakout),
            bool_feature(self.events.volume_spike),
            bool_feature(self.events.strong_trend),
            self.momentum,
            self.ma_diff,
            self.price_short_diff,
            self.price_long_diff,
            self.obv_norm,
            self.volume_change,
            self.volume_ma_ratio,
            self.volatility,
            self.macd,
            self.macd_hist,
        ]
    }

    /// True when every numeric feature is finite and usable for training.
    pub fn is_clean(&self) -> bool {
        self.to_vec().iter().all(|v| v.is_finite())
    }
}

fn bool_feature(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
    pub warmup: usize,
}

impl FeatureTable {
    /// The most recent snapshot, used for live inference and digests.
    pub fn latest(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    /// Row for a bar index, if that bar is past the warm-up offset.
    pub fn row_for_bar(&self, index: usize) -> Option<&FeatureRow> {
        index
            .checked_sub(self.warmup)
            .and_then(|i| self.rows.get(i))
    }
}

/// Compute the feature table for a validated series. Rows cover bar indices
/// `warmup ..= n-1`; the crossover flag on each row is edge-triggered against
/// the immediately preceding bar.
pub fn build_features(bars: &[Bar], config: &FeatureConfig, events: &EventConfig) -> FeatureTable {
    let warmup = config.warmup();
    let n = bars.len();

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();

    let sma_short = sma(&closes, config.short_window);
    let sma_long = sma(&closes, config.long_window);
    let returns = pct_change(&closes, 1);
    let momentum = pct_change(&closes, config.momentum_window);
    let volatility = rolling_std(&returns, config.volatility_window);
    let macd_series = macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal);

    let obv_raw = obv(&closes, &volumes);
    let volume_mean = rolling_mean(&volumes, config.volume_window);
    let volume_change = pct_change(&volumes, 1);
    let close_max = rolling_max(&closes, config.breakout_window);

    let build_row = |i: usize| -> FeatureRow {
        let close = closes[i];
        let volume_sum = volume_mean[i] * config.volume_window as f64;
        FeatureRow {
            index: i,
            date: bars[i].date,
            close,
            momentum: momentum[i],
            ma_diff: (sma_short[i] - sma_long[i]) / close,
            price_short_diff: (close - sma_short[i]) / close,
            price_long_diff: (close - sma_long[i]) / close,
            obv_norm: obv_raw[i] / volume_sum,
            volume_change: volume_change[i],
            volume_ma_ratio: volumes[i] / volume_mean[i],
            volatility: volatility[i],
            macd: macd_series.line[i],
            macd_hist: macd_series.histogram[i],
            // Max close over [i-w, i-1]; the window excludes today.
            prior_high_close: close_max[i - 1],
            entry_signal: false,
            events: EventFlags::default(),
        }
    };

    // One extra leading row (at warmup-1) seeds the edge trigger for the
    // first exposed row, then is discarded.
    let first = warmup.saturating_sub(1).max(1);
    let mut rows: Vec<FeatureRow> = (first..n).map(build_row).collect();

    for i in 0..rows.len() {
        let prev = if i > 0 { Some(rows[i - 1].clone()) } else { None };
        let flags = detect_events(prev.as_ref(), &rows[i], events);
        rows[i].events = flags;
        rows[i].entry_signal = flags.entry_signal(&events.entry);
    }

    let exposed: Vec<FeatureRow> = rows
        .into_iter()
        .filter(|r| r.index >= warmup)
        .collect();

    FeatureTable {
        rows: exposed,
        warmup,
    }
}
