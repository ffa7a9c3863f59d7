//! Technical indicator primitives.
//!
//! Every function here is a pure transform over a value slice and returns a
//! vector of the same length. Slots inside the warm-up window carry
//! `f64::NAN`; downstream consumers treat a non-finite value as "feature not
//! yet defined". All windows are strictly backward-looking: the value at
//! index `i` depends on inputs `[i - w + 1, i]` only.

pub mod ema;
pub mod macd;
pub mod obv;
pub mod rolling;
pub mod sma;

pub use ema::ema;
pub use macd::{macd, MacdSeries};
pub use obv::obv;
pub use rolling::{pct_change, rolling_max, rolling_mean, rolling_std};
pub use sma::sma;
