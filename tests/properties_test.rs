//! Property tests over arbitrary bar series.
//!
//! Two properties hold for every input, not just hand-picked fixtures:
//! rebuilding the feature table from the same bars is bit-identical, and
//! mutating a bar leaves every feature row and label before it untouched.

use chrono::{Days, NaiveDate};
use proptest::collection::vec;
use proptest::prelude::*;
use trendcast::domain::bar::Bar;
use trendcast::domain::events::EventConfig;
use trendcast::domain::features::{build_features, FeatureConfig, FeatureRow, FeatureTable};
use trendcast::domain::label::build_labels;

// Longest lookback is macd_slow + macd_signal = 8 bars.
fn feature_config() -> FeatureConfig {
    FeatureConfig {
        short_window: 3,
        long_window: 5,
        breakout_window: 3,
        volume_window: 3,
        momentum_window: 2,
        volatility_window: 2,
        macd_fast: 3,
        macd_slow: 6,
        macd_signal: 2,
    }
}

fn bars_from(series: &[(f64, i64)]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    series
        .iter()
        .enumerate()
        .map(|(i, &(close, volume))| Bar {
            ticker: "PROP".into(),
            date: start.checked_add_days(Days::new(i as u64)).unwrap(),
            open: close - 0.25,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume,
        })
        .collect()
}

fn assert_rows_bit_identical(a: &FeatureRow, b: &FeatureRow) -> Result<(), TestCaseError> {
    prop_assert_eq!(a.index, b.index);
    prop_assert_eq!(a.date, b.date);
    prop_assert_eq!(a.events, b.events);
    prop_assert_eq!(a.entry_signal, b.entry_signal);
    prop_assert_eq!(a.prior_high_close.to_bits(), b.prior_high_close.to_bits());
    for (va, vb) in a.to_vec().iter().zip(b.to_vec().iter()) {
        prop_assert_eq!(va.to_bits(), vb.to_bits());
    }
    Ok(())
}

fn build(bars: &[Bar]) -> FeatureTable {
    build_features(bars, &feature_config(), &EventConfig::default())
}

fn arb_series() -> impl Strategy<Value = Vec<(f64, i64)>> {
    vec((1.0f64..500.0, 1i64..1_000_000), 12..60)
}

// Series plus an index past the warm-up offset to mutate.
fn arb_series_and_index() -> impl Strategy<Value = (Vec<(f64, i64)>, usize)> {
    arb_series().prop_flat_map(|series| {
        let n = series.len();
        (Just(series), 9..n)
    })
}

proptest! {
    #[test]
    fn rebuild_is_bit_identical(series in arb_series()) {
        let bars = bars_from(&series);
        let a = build(&bars);
        let b = build(&bars);

        prop_assert_eq!(a.rows.len(), b.rows.len());
        for (ra, rb) in a.rows.iter().zip(b.rows.iter()) {
            assert_rows_bit_identical(ra, rb)?;
        }
    }

    #[test]
    fn mutating_a_bar_leaves_earlier_rows_unchanged(
        (series, m) in arb_series_and_index()
    ) {
        let bars = bars_from(&series);
        let before = build(&bars);
        let labels_before = build_labels(&bars);

        let mut mutated = bars.clone();
        mutated[m].close += 37.5;
        mutated[m].volume += 4321;
        let after = build(&mutated);
        let labels_after = build_labels(&mutated);

        // Feature row t depends on bars [0, t] only.
        prop_assert_eq!(before.rows.len(), after.rows.len());
        for (ra, rb) in before.rows.iter().zip(after.rows.iter()) {
            if ra.index < m {
                assert_rows_bit_identical(ra, rb)?;
            }
        }

        // Label t compares bars t and t+1, so only t = m-1 and t = m move.
        for t in 0..m.saturating_sub(1) {
            prop_assert_eq!(labels_before[t], labels_after[t]);
        }
    }
}
