//! Tree-ensemble classifier for next-day direction.

pub mod dataset;
pub mod forest;
pub mod trainer;
pub mod tree;

pub use dataset::{Dataset, Split};
pub use forest::{ForestConfig, RandomForest};
pub use trainer::{select_hyperparams, train_and_predict, ModelConfig, ModelReport};
pub use tree::{DecisionTree, TreeConfig};
