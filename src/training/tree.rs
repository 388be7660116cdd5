//! Decision tree classifier (Gini CART)

use super::models::{check_shapes, Model};
use crate::error::{Result, TabError};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf holding the positive fraction of its training rows
    Leaf {
        positive_rate: f64,
        n_samples: usize,
    },
    /// Internal node with a `<=` split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Binary decision tree split on Gini impurity.
///
/// The ranking score is the positive fraction of the reached leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples in each child
    pub min_samples_leaf: usize,
    /// Features considered per split; all when unset
    pub max_features: Option<usize>,
    // Seeds the per-split feature subsampling used by forest trees
    feature_seed: Option<u64>,
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeClassifier {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            feature_seed: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Consider a random subset of features at each split
    pub fn with_max_features(mut self, max_features: usize, seed: u64) -> Self {
        self.max_features = Some(max_features);
        self.feature_seed = Some(seed);
        self
    }

    /// Positive-class probability per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(TabError::ModelNotFitted)?;

        let probabilities: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let row: Vec<f64> = x.row(i).to_vec();
                leaf_rate(root, &row)
            })
            .collect();
        Ok(Array1::from_vec(probabilities))
    }

    /// Tree depth (leaf-only tree has depth 1)
    pub fn depth(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => node_depth(node),
        }
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut Option<ChaCha8Rng>,
    ) -> TreeNode {
        let n_samples = indices.len();
        let positives: f64 = indices.iter().map(|&i| y[i]).sum();
        let positive_rate = positives / n_samples as f64;

        let is_pure = positive_rate == 0.0 || positive_rate == 1.0;
        let should_stop = is_pure
            || n_samples < self.min_samples_split
            || self.max_depth.map_or(false, |d| depth >= d);

        if should_stop {
            return TreeNode::Leaf {
                positive_rate,
                n_samples,
            };
        }

        if let Some((feature_idx, threshold)) = self.find_best_split(x, y, indices, rng) {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, feature_idx]] <= threshold);

            let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, rng));
            let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, rng));

            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                n_samples,
            }
        } else {
            TreeNode::Leaf {
                positive_rate,
                n_samples,
            }
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut Option<ChaCha8Rng>,
    ) -> Option<(usize, f64)> {
        let n_features = x.ncols();
        let candidates: Vec<usize> = match (self.max_features, rng) {
            (Some(m), Some(rng)) if m < n_features => {
                let mut all: Vec<usize> = (0..n_features).collect();
                all.shuffle(rng);
                all.truncate(m);
                all
            }
            _ => (0..n_features).collect(),
        };

        let n = indices.len() as f64;
        let positives: f64 = indices.iter().map(|&i| y[i]).sum();
        let parent_impurity = gini(positives, n);

        let mut best_gain = 0.0f64;
        let mut best: Option<(usize, f64)> = None;

        for &feature_idx in &candidates {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let mut left_count = 0.0f64;
                let mut left_pos = 0.0f64;
                for &idx in indices {
                    if x[[idx, feature_idx]] <= threshold {
                        left_count += 1.0;
                        left_pos += y[idx];
                    }
                }
                let right_count = n - left_count;
                let right_pos = positives - left_pos;

                if (left_count as usize) < self.min_samples_leaf
                    || (right_count as usize) < self.min_samples_leaf
                {
                    continue;
                }

                let weighted = (left_count * gini(left_pos, left_count)
                    + right_count * gini(right_pos, right_count))
                    / n;
                let gain = parent_impurity - weighted;
                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature_idx, threshold));
                }
            }
        }

        best
    }
}

/// Gini impurity of a binary node from its positive count and size.
fn gini(positives: f64, count: f64) -> f64 {
    if count == 0.0 {
        return 0.0;
    }
    let p = positives / count;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

fn leaf_rate(node: &TreeNode, row: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { positive_rate, .. } => *positive_rate,
        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            ..
        } => {
            if row[*feature_idx] <= *threshold {
                leaf_rate(left, row)
            } else {
                leaf_rate(right, row)
            }
        }
    }
}

fn node_depth(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

impl Model for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_shapes(x, y)?;
        if x.nrows() == 0 {
            return Err(TabError::TrainingError(
                "cannot fit tree on empty training set".to_string(),
            ));
        }

        let mut rng = self.feature_seed.map(ChaCha8Rng::seed_from_u64);
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut rng));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn has_score(&self) -> bool {
        true
    }

    fn score(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.predict_proba(x)
    }
}
