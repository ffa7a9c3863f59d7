//! OBV (On-Balance Volume).
//!
//! OBV[0] = volume[0]
//! If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
//! If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
//! If close[i] == close[i-1]: OBV[i] = OBV[i-1]
//!
//! No warmup; every slot is defined.

/// Calculate the cumulative signed-volume running total.
pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    let mut total = 0.0;
    let mut prev_close = 0.0;

    for (i, (&close, &volume)) in closes.iter().zip(volumes.iter()).enumerate() {
        if i == 0 {
            total = volume;
        } else if close > prev_close {
            total += volume;
        } else if close < prev_close {
            total -= volume;
        }
        prev_close = close;
        out.push(total);
    }

    out
}
