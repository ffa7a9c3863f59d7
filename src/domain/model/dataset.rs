//! Training matrix with time-ordered rows.

use chrono::NaiveDate;

/// Extreme values are clipped here before training, mirroring the cleaning
/// the feature table applies to ratio features with near-zero denominators.
const CLIP_LIMIT: f64 = 1e6;

/// Feature matrix plus binary labels. Rows are stored in ascending time
/// order; the chronological split relies on that invariant.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
    pub dates: Vec<NaiveDate>,
    pub feature_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    pub fn new(feature_names: Vec<String>) -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
            dates: Vec::new(),
            feature_names,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Append a row, clipping each value into [-CLIP_LIMIT, CLIP_LIMIT].
    /// Rows with non-finite values must be filtered by the caller first.
    pub fn push(&mut self, features: Vec<f64>, label: u8, date: NaiveDate) {
        debug_assert_eq!(features.len(), self.feature_names.len());
        let clipped = features
            .into_iter()
            .map(|v| v.clamp(-CLIP_LIMIT, CLIP_LIMIT))
            .collect();
        self.features.push(clipped);
        self.labels.push(label);
        self.dates.push(date);
    }

    /// Chronological train/test partition: the earliest `train_fraction` of
    /// rows trains, the trailing remainder evaluates. No shuffling, so no
    /// future information reaches the training partition.
    pub fn chronological_split(&self, train_fraction: f64) -> Split {
        let n = self.n_samples();
        let cut = ((n as f64) * train_fraction).floor() as usize;
        let cut = cut.min(n);

        let take = |range: std::ops::Range<usize>| Dataset {
            features: self.features[range.clone()].to_vec(),
            labels: self.labels[range.clone()].to_vec(),
            dates: self.dates[range.clone()].to_vec(),
            feature_names: self.feature_names.clone(),
        };

        Split {
            train: take(0..cut),
            test: take(cut..n),
        }
    }

    /// Fraction of positive labels; 0.5 on an empty set.
    pub fn base_rate(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.5;
        }
        self.labels.iter().filter(|&&l| l == 1).count() as f64 / self.labels.len() as f64
    }
}
