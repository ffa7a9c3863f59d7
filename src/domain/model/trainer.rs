//! Training, evaluation and inference orchestration.
//!
//! Labeled feature rows are assembled into a time-ordered dataset, split
//! chronologically, fitted, scored on the held-out tail, and finally used to
//! estimate the up-probability for the latest (unlabeled) snapshot.

use crate::domain::bar::Bar;
use crate::domain::error::TrendcastError;
use crate::domain::features::{FeatureTable, FEATURE_NAMES};
use crate::domain::label::build_labels;
use crate::domain::model::dataset::Dataset;
use crate::domain::model::forest::{ForestConfig, RandomForest};

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Earliest fraction of labeled rows used for fitting.
    pub train_fraction: f64,
    /// Below this many clean labeled rows a tree ensemble is unreliable.
    pub min_training_rows: usize,
    pub forest: ForestConfig,
    /// When set, hyperparameters are selected by a bounded grid search over
    /// the training partition only.
    pub grid_search: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            min_training_rows: 30,
            forest: ForestConfig::default(),
            grid_search: false,
        }
    }
}

/// Everything the rest of the system needs from a training run. The fitted
/// forest itself is discarded once these are extracted.
#[derive(Debug, Clone)]
pub struct ModelReport {
    /// Fraction of correct predictions on the held-out chronological tail.
    pub accuracy: f64,
    /// (feature name, relative importance), descending; importances sum to 1.
    pub importance: Vec<(String, f64)>,
    /// Probability that the next close exceeds the latest close.
    pub up_probability: f64,
    /// Fraction of up-labels in the full dataset, the trivial-classifier
    /// baseline the accuracy should be read against.
    pub base_rate: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub forest: ForestConfig,
}

/// Assemble the labeled dataset: one row per feature-table entry that has a
/// next-day label and only finite feature values.
fn build_dataset(table: &FeatureTable, bars: &[Bar]) -> Dataset {
    let labels = build_labels(bars);
    let mut dataset = Dataset::new(FEATURE_NAMES.iter().map(|s| s.to_string()).collect());

    for row in &table.rows {
        if row.index >= labels.len() {
            // The final bar has no label; it is inference-only.
            continue;
        }
        if !row.is_clean() {
            continue;
        }
        dataset.push(row.to_vec(), labels[row.index], row.date);
    }

    dataset
}

/// Bounded grid search restricted to the training partition. The candidate
/// grid is scored on an inner chronological tail of the training rows; the
/// evaluation partition is never consulted. Pure: no state beyond the
/// returned config. Ties keep the earliest candidate.
pub fn select_hyperparams(train: &Dataset, grid: &[ForestConfig]) -> ForestConfig {
    debug_assert!(!grid.is_empty());
    let inner = train.chronological_split(0.8);
    if inner.test.n_samples() == 0 {
        return grid[0];
    }

    let mut best = grid[0];
    let mut best_score = f64::NEG_INFINITY;
    for &candidate in grid {
        let mut forest = RandomForest::new(candidate);
        forest.fit(&inner.train);
        let score = forest.accuracy(&inner.test);
        if score > best_score {
            best_score = score;
            best = candidate;
        }
    }
    best
}

/// Default candidate grid around the base hyperparameters.
pub fn default_grid(base: ForestConfig) -> Vec<ForestConfig> {
    let mut grid = Vec::new();
    for &n_trees in &[100, 200] {
        for &max_depth in &[4, 6, 8] {
            for &min_samples_leaf in &[1, 5] {
                grid.push(ForestConfig {
                    n_trees,
                    max_depth,
                    min_samples_leaf,
                    ..base
                });
            }
        }
    }
    grid
}

/// Fit on the chronological head, score on the tail, and infer the
/// up-probability for the latest snapshot.
pub fn train_and_predict(
    table: &FeatureTable,
    bars: &[Bar],
    config: &ModelConfig,
) -> Result<ModelReport, TrendcastError> {
    let dataset = build_dataset(table, bars);

    if dataset.n_samples() < config.min_training_rows {
        return Err(TrendcastError::InsufficientTrainingData {
            rows: dataset.n_samples(),
            minimum: config.min_training_rows,
        });
    }

    let split = dataset.chronological_split(config.train_fraction);

    let forest_config = if config.grid_search {
        select_hyperparams(&split.train, &default_grid(config.forest))
    } else {
        config.forest
    };

    let mut forest = RandomForest::new(forest_config);
    forest.fit(&split.train);
    let accuracy = forest.accuracy(&split.test);

    let latest = table
        .latest()
        .expect("dataset rows imply a non-empty table");
    let up_probability = forest.predict_proba_one(&latest.to_vec());

    Ok(ModelReport {
        accuracy,
        importance: forest.importance_ranking(),
        up_probability,
        base_rate: dataset.base_rate(),
        train_rows: split.train.n_samples(),
        test_rows: split.test.n_samples(),
        forest: forest_config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::EventConfig;
    use crate::domain::features::{build_features, FeatureConfig};
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                ticker: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Days::new(i as u64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000 + (i % 7) as i64 * 100,
            })
            .collect()
    }

    fn wavy_closes(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.61).sin() * 6.0 + i as f64 * 0.05)
            .collect()
    }

    fn small_feature_config() -> FeatureConfig {
        FeatureConfig {
            short_window: 3,
            long_window: 6,
            breakout_window: 4,
            volume_window: 4,
            momentum_window: 2,
            volatility_window: 3,
            macd_fast: 3,
            macd_slow: 5,
            macd_signal: 3,
        }
    }

    fn small_model_config() -> ModelConfig {
        ModelConfig {
            forest: ForestConfig {
                n_trees: 15,
                max_depth: 4,
                ..ForestConfig::default()
            },
            ..ModelConfig::default()
        }
    }

    #[test]
    fn trains_and_reports_on_enough_data() {
        let bars = make_bars(&wavy_closes(120));
        let table = build_features(&bars, &small_feature_config(), &EventConfig::default());
        let report = train_and_predict(&table, &bars, &small_model_config()).unwrap();

        assert!((0.0..=1.0).contains(&report.accuracy));
        assert!((0.0..=1.0).contains(&report.up_probability));
        assert_eq!(report.importance.len(), FEATURE_NAMES.len());
        let total: f64 = report.importance.iter().map(|(_, v)| v).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(report.train_rows > report.test_rows);

        let dataset = build_dataset(&table, &bars);
        assert!((report.base_rate - dataset.base_rate()).abs() < f64::EPSILON);
        assert!(report.base_rate > 0.0 && report.base_rate < 1.0);
    }

    #[test]
    fn too_few_rows_is_insufficient_training_data() {
        let bars = make_bars(&wavy_closes(20));
        let table = build_features(&bars, &small_feature_config(), &EventConfig::default());
        match train_and_predict(&table, &bars, &small_model_config()) {
            Err(TrendcastError::InsufficientTrainingData { rows, minimum }) => {
                assert!(rows < minimum);
            }
            other => panic!("expected InsufficientTrainingData, got {other:?}"),
        }
    }

    #[test]
    fn last_bar_is_excluded_from_training() {
        let bars = make_bars(&wavy_closes(100));
        let table = build_features(&bars, &small_feature_config(), &EventConfig::default());
        let dataset = build_dataset(&table, &bars);

        // n bars yield n-1 labels; the table holds warmup..n-1 rows of which
        // the last is inference-only.
        assert_eq!(dataset.n_samples(), table.rows.len() - 1);
        assert!(dataset.dates.iter().all(|d| *d < bars.last().unwrap().date));
    }

    #[test]
    fn training_run_is_reproducible() {
        let bars = make_bars(&wavy_closes(110));
        let table = build_features(&bars, &small_feature_config(), &EventConfig::default());
        let config = small_model_config();

        let a = train_and_predict(&table, &bars, &config).unwrap();
        let b = train_and_predict(&table, &bars, &config).unwrap();
        assert_eq!(a.accuracy, b.accuracy);
        assert_eq!(a.up_probability, b.up_probability);
        assert_eq!(a.importance, b.importance);
    }

    #[test]
    fn grid_search_picks_from_the_grid() {
        let bars = make_bars(&wavy_closes(150));
        let table = build_features(&bars, &small_feature_config(), &EventConfig::default());
        let dataset = build_dataset(&table, &bars);
        let split = dataset.chronological_split(0.8);

        let grid = vec![
            ForestConfig {
                n_trees: 5,
                max_depth: 2,
                ..ForestConfig::default()
            },
            ForestConfig {
                n_trees: 10,
                max_depth: 4,
                ..ForestConfig::default()
            },
        ];
        let chosen = select_hyperparams(&split.train, &grid);
        assert!(grid.contains(&chosen));

        // Pure function: same inputs, same choice.
        assert_eq!(chosen, select_hyperparams(&split.train, &grid));
    }
}
