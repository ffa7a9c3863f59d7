//! Label construction for the next-day direction target.
//!
//! Label t = 1 iff close(t+1) > close(t). The final bar of a series has no
//! label: it is excluded from training but retained for live inference.

use crate::domain::bar::Bar;
use crate::domain::error::TrendcastError;

/// One label per bar index 0..n-1 (exclusive of the last bar).
pub fn build_labels(bars: &[Bar]) -> Vec<u8> {
    bars.windows(2)
        .map(|pair| u8::from(pair[1].close > pair[0].close))
        .collect()
}

/// Label for a single bar index. Requesting the final index is a contract
/// violation and fails with `NoLabelAvailable`.
pub fn label_at(bars: &[Bar], index: usize) -> Result<u8, TrendcastError> {
    if index + 1 >= bars.len() {
        return Err(TrendcastError::NoLabelAvailable { index });
    }
    Ok(u8::from(bars[index + 1].close > bars[index].close))
}
