//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(values[i-n+1 ..= i]). Warmup: first (n-1) slots are NaN.

/// Calculate a simple moving average with a running-sum window.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out.push(sum / period as f64);
        } else {
            out.push(f64::NAN);
        }
    }

    out
}
