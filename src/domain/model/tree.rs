//! CART classification tree with Gini impurity.

use crate::domain::model::dataset::Dataset;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    feature_idx: usize,
    threshold: f64,
    /// Probability of the positive class at this node (used at leaves).
    positive_prob: f64,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn leaf(positive_prob: f64) -> Self {
        Self {
            feature_idx: 0,
            threshold: 0.0,
            positive_prob,
            left: None,
            right: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<Node>,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            feature_importances: Vec::new(),
        }
    }

    pub fn fit(&mut self, dataset: &Dataset) {
        self.feature_importances = vec![0.0; dataset.n_features()];
        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build(dataset, &indices, 0, &mut rng));

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    fn build(
        &mut self,
        dataset: &Dataset,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let positive_prob = positive_fraction(dataset, indices);
        let impurity = gini(positive_prob);

        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || impurity < 1e-10
        {
            return Node::leaf(positive_prob);
        }

        match self.find_best_split(dataset, indices, impurity, rng) {
            Some(split) => {
                if split.left.len() < self.config.min_samples_leaf
                    || split.right.len() < self.config.min_samples_leaf
                {
                    return Node::leaf(positive_prob);
                }

                self.feature_importances[split.feature_idx] += split.importance;
                let left = self.build(dataset, &split.left, depth + 1, rng);
                let right = self.build(dataset, &split.right, depth + 1, rng);

                Node {
                    feature_idx: split.feature_idx,
                    threshold: split.threshold,
                    positive_prob,
                    left: Some(Box::new(left)),
                    right: Some(Box::new(right)),
                }
            }
            None => Node::leaf(positive_prob),
        }
    }

    fn find_best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n_features = dataset.n_features();
        let max_features = self.config.max_features.unwrap_or(n_features).min(n_features);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);
        // Deterministic tie-break: candidates are scanned in index order.
        feature_indices.sort_unstable();

        let mut best: Option<BestSplit> = None;
        let mut best_gain = 0.0;

        for &feature_idx in &feature_indices {
            let mut values: Vec<f64> = indices
                .iter()
                .map(|&i| dataset.features[i][feature_idx])
                .collect();
            values.sort_by(|a, b| a.partial_cmp(b).expect("finite feature values"));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| dataset.features[i][feature_idx] <= threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let left_impurity = gini(positive_fraction(dataset, &left));
                let right_impurity = gini(positive_fraction(dataset, &right));
                let n_left = left.len() as f64;
                let n_right = right.len() as f64;
                let weighted = (n_left * left_impurity + n_right * right_impurity)
                    / (n_left + n_right);
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some(BestSplit {
                        feature_idx,
                        threshold,
                        importance: gain * indices.len() as f64,
                        left,
                        right,
                    });
                }
            }
        }

        best
    }

    /// Probability of the positive class for one sample.
    pub fn predict_proba_one(&self, features: &[f64]) -> f64 {
        let mut node = match &self.root {
            Some(root) => root,
            None => return 0.5,
        };
        loop {
            if node.is_leaf() {
                return node.positive_prob;
            }
            node = if features[node.feature_idx] <= node.threshold {
                node.left.as_ref().expect("internal node has left child")
            } else {
                node.right.as_ref().expect("internal node has right child")
            };
        }
    }

    pub fn predict_one(&self, features: &[f64]) -> u8 {
        u8::from(self.predict_proba_one(features) > 0.5)
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

struct BestSplit {
    feature_idx: usize,
    threshold: f64,
    importance: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

fn positive_fraction(dataset: &Dataset, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.5;
    }
    let positives = indices.iter().filter(|&&i| dataset.labels[i] == 1).count();
    positives as f64 / indices.len() as f64
}

/// Binary Gini impurity: 2p(1-p).
fn gini(p: f64) -> f64 {
    2.0 * p * (1.0 - p)
}
