//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the simple mean of the first n values, then
//! EMA[i] = v[i]*k + EMA[i-1]*(1-k). Warmup: first (n-1) slots are NaN.
//!
//! The simple-mean seed is a deliberate convention; a recursive-from-first
//! seed differs only in the early values. Tests pin values after warm-up.

/// Calculate an exponential moving average.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    let mut current = 0.0;

    for (i, &v) in values.iter().enumerate() {
        if i < period - 1 {
            sum += v;
            out.push(f64::NAN);
        } else if i == period - 1 {
            sum += v;
            current = sum / period as f64;
            out.push(current);
        } else {
            current = v * k + current * (1.0 - k);
            out.push(current);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ema_warmup() {
        let out = ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!(out[2].is_finite());
    }

    #[test]
    fn ema_seed_is_simple_mean() {
        let out = ema(&[10.0, 20.0, 30.0], 3);
        assert_relative_eq!(out[2], 20.0, epsilon = 1e-12);
    }

    #[test]
    fn ema_recursion_after_seed() {
        let out = ema(&[10.0, 20.0, 30.0, 40.0], 3);
        // k = 0.5; 40*0.5 + 20*0.5 = 30
        assert_relative_eq!(out[3], 30.0, epsilon = 1e-12);
    }

    #[test]
    fn ema_constant_series_is_constant() {
        let out = ema(&[7.0; 10], 4);
        for v in out.iter().skip(3) {
            assert_relative_eq!(*v, 7.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn ema_zero_period_is_all_nan() {
        let out = ema(&[1.0, 2.0], 0);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
