//! Rolling-window and change primitives shared by the feature engine.

/// Rolling maximum over the trailing `period` values (inclusive of index i).
/// Warmup: first (period-1) slots are NaN.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }

    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < period {
                f64::NAN
            } else {
                values[i + 1 - period..=i]
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max)
            }
        })
        .collect()
}

/// Rolling arithmetic mean over the trailing `period` values.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    crate::domain::indicator::sma(values, period)
}

/// Rolling sample standard deviation (n-1 denominator) over the trailing
/// `period` values. NaN inputs inside the window propagate to the output.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    if period < 2 {
        return vec![f64::NAN; values.len()];
    }

    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < period {
                return f64::NAN;
            }
            let window = &values[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (period - 1) as f64;
            variance.sqrt()
        })
        .collect()
}

/// Percentage change relative to the value `period` slots earlier:
/// (v[i] - v[i-period]) / v[i-period]. Warmup: first `period` slots are NaN.
/// A zero base yields a non-finite value, filtered downstream.
pub fn pct_change(values: &[f64], period: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if i < period {
                f64::NAN
            } else {
                let base = values[i - period];
                (v - base) / base
            }
        })
        .collect()
}
