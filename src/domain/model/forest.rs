//! Bagged random forest over CART classification trees.
//!
//! Trees are grown in parallel from bootstrap samples, each with a derived
//! seed, so a fixed forest seed reproduces the same model bit for bit.

use crate::domain::model::dataset::Dataset;
use crate::domain::model::tree::{DecisionTree, TreeConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features per split; `None` means sqrt(n_features).
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        // 200 trees, depth 6, seed 42.
        Self {
            n_trees: 200,
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    pub fn fit(&mut self, dataset: &Dataset) {
        self.feature_names = dataset.feature_names.clone();
        let n_features = dataset.n_features();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .max(1);

        let config = self.config;
        self.trees = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_seed = config.seed.wrapping_add(i as u64);
                let sample = bootstrap_sample(dataset, tree_seed);
                let mut tree = DecisionTree::new(TreeConfig {
                    max_depth: config.max_depth,
                    min_samples_split: config.min_samples_split,
                    min_samples_leaf: config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: tree_seed,
                });
                tree.fit(&sample);
                tree
            })
            .collect();

        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (slot, &imp) in self
                .feature_importances
                .iter_mut()
                .zip(tree.feature_importances())
            {
                *slot += imp;
            }
        }
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    /// Probability of the positive class: mean of per-tree leaf probabilities.
    pub fn predict_proba_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let total: f64 = self
            .trees
            .iter()
            .map(|t| t.predict_proba_one(features))
            .sum();
        total / self.trees.len() as f64
    }

    pub fn predict_one(&self, features: &[f64]) -> u8 {
        u8::from(self.predict_proba_one(features) > 0.5)
    }

    /// Fraction of correct binary predictions over a labeled dataset.
    pub fn accuracy(&self, dataset: &Dataset) -> f64 {
        if dataset.n_samples() == 0 {
            return 0.0;
        }
        let correct = dataset
            .features
            .iter()
            .zip(dataset.labels.iter())
            .filter(|(f, label)| self.predict_one(f) == **label)
            .count();
        correct as f64 / dataset.n_samples() as f64
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// (name, importance) pairs sorted by descending importance.
    pub fn importance_ranking(&self) -> Vec<(String, f64)> {
        let mut ranking: Vec<(String, f64)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(self.feature_importances.iter().copied())
            .collect();
        ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).expect("finite importances"));
        ranking
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Sample `n` rows with replacement using a seeded RNG.
fn bootstrap_sample(dataset: &Dataset, seed: u64) -> Dataset {
    let n = dataset.n_samples();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut sample = Dataset::new(dataset.feature_names.clone());
    for _ in 0..n {
        let i = rng.gen_range(0..n);
        sample.push(
            dataset.features[i].clone(),
            dataset.labels[i],
            dataset.dates[i],
        );
    }
    sample
}
