//! Random forest classifier

use super::models::{check_shapes, Model};
use super::tree::DecisionTreeClassifier;
use crate::error::{Result, TabError};
use ndarray::{Array1, Array2, Axis};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Ensemble of decision trees over bootstrap samples.
///
/// Each tree sees a bootstrap resample and considers a random
/// sqrt-sized feature subset at every split. The ranking score is the
/// mean leaf probability across trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: Option<usize>,
    /// Base seed for bootstrap and feature sampling
    pub seed: u64,
    trees: Vec<DecisionTreeClassifier>,
}

impl RandomForest {
    pub fn new(n_trees: usize) -> Self {
        Self {
            n_trees,
            max_depth: None,
            seed: 42,
            trees: Vec::new(),
        }
    }

    /// Set maximum tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the base seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Mean leaf probability across the forest
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(TabError::ModelNotFitted);
        }

        let mut total: Array1<f64> = Array1::zeros(x.nrows());
        for tree in &self.trees {
            total = total + tree.predict_proba(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

/// Bootstrap sample indices (with replacement) from a seeded generator.
pub(crate) fn bootstrap_indices(rng: &mut ChaCha8Rng, n: usize) -> Vec<usize> {
    (0..n).map(|_| (rng.next_u64() % n as u64) as usize).collect()
}

impl Model for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_shapes(x, y)?;
        if self.n_trees == 0 {
            return Err(TabError::ConfigError(
                "n_trees must be at least 1".to_string(),
            ));
        }
        if x.nrows() == 0 {
            return Err(TabError::TrainingError(
                "cannot fit forest on empty training set".to_string(),
            ));
        }

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let max_features = (n_features as f64).sqrt().ceil() as usize;
        let base_seed = self.seed;
        let max_depth = self.max_depth;

        self.trees = (0..self.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let tree_seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
                let indices = bootstrap_indices(&mut rng, n_samples);

                let x_boot = x.select(Axis(0), &indices);
                let y_boot = y.select(Axis(0), &indices);

                let mut tree = DecisionTreeClassifier::new()
                    .with_max_features(max_features, tree_seed);
                if let Some(depth) = max_depth {
                    tree = tree.with_max_depth(depth);
                }
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn clustered_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0, 1.0],
            [1.2, 0.8],
            [0.8, 1.2],
            [1.1, 1.1],
            [8.0, 8.0],
            [8.2, 7.8],
            [7.8, 8.2],
            [8.1, 8.1],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_classifies_clusters() {
        let (x, y) = clustered_data();
        let mut forest = RandomForest::new(10).with_seed(42);
        forest.fit(&x, &y).unwrap();

        let predictions = forest.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_seeded_fit_is_deterministic() {
        let (x, y) = clustered_data();

        let mut a = RandomForest::new(5).with_seed(7);
        a.fit(&x, &y).unwrap();
        let mut b = RandomForest::new(5).with_seed(7);
        b.fit(&x, &y).unwrap();

        assert_eq!(a.score(&x).unwrap(), b.score(&x).unwrap());
    }

    #[test]
    fn test_score_is_mean_leaf_probability() {
        let (x, y) = clustered_data();
        let mut forest = RandomForest::new(10).with_seed(42);
        forest.fit(&x, &y).unwrap();

        assert!(forest.has_score());
        let scores = forest.score(&x).unwrap();
        assert!(scores.iter().all(|&s| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn test_zero_trees_rejected() {
        let (x, y) = clustered_data();
        let mut forest = RandomForest::new(0);
        assert!(matches!(
            forest.fit(&x, &y).unwrap_err(),
            TabError::ConfigError(_)
        ));
    }
}
