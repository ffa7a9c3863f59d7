//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD Line (seeded from the first
//! `signal` defined line values with a simple mean, same convention as the
//! underlying EMA)
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! Warmup: line defined from index slow-1, signal and histogram from
//! index slow-1 + signal-1.

use crate::domain::indicator::ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    let n = values.len();
    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdSeries {
            line: vec![f64::NAN; n],
            signal: vec![f64::NAN; n],
            histogram: vec![f64::NAN; n],
        };
    }

    let ema_fast = ema(values, fast);
    let ema_slow = ema(values, slow);

    // NaN warmup propagates through subtraction, so the line is defined
    // exactly where both EMAs are.
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    let line_start = slow.saturating_sub(1);
    let mut signal = vec![f64::NAN; n];

    if line_start + signal_period <= n {
        let k = 2.0 / (signal_period as f64 + 1.0);
        let seed_end = line_start + signal_period;
        let seed: f64 = line[line_start..seed_end].iter().sum::<f64>() / signal_period as f64;

        let mut current = seed;
        signal[seed_end - 1] = current;
        for i in seed_end..n {
            current = line[i] * k + current * (1.0 - k);
            signal[i] = current;
        }
    }

    let histogram: Vec<f64> = line.iter().zip(signal.iter()).map(|(l, s)| l - s).collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}
