//! Bagging ensemble of full-feature decision trees

use super::forest::bootstrap_indices;
use super::models::{check_shapes, Model};
use super::tree::DecisionTreeClassifier;
use crate::error::{Result, TabError};
use ndarray::{Array1, Array2, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged decision trees.
///
/// Like a random forest but every tree considers all features at each
/// split; only the training rows are resampled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaggingClassifier {
    /// Number of estimators
    pub n_estimators: usize,
    /// Maximum depth of each tree
    pub max_depth: Option<usize>,
    /// Base seed for bootstrap sampling
    pub seed: u64,
    trees: Vec<DecisionTreeClassifier>,
}

impl BaggingClassifier {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
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

    /// Mean leaf probability across the ensemble
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

impl Model for BaggingClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_shapes(x, y)?;
        if self.n_estimators == 0 {
            return Err(TabError::ConfigError(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if x.nrows() == 0 {
            return Err(TabError::TrainingError(
                "cannot fit bagging ensemble on empty training set".to_string(),
            ));
        }

        let n_samples = x.nrows();
        let base_seed = self.seed;
        let max_depth = self.max_depth;

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let tree_seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
                let indices = bootstrap_indices(&mut rng, n_samples);

                let x_boot = x.select(Axis(0), &indices);
                let y_boot = y.select(Axis(0), &indices);

                let mut tree = DecisionTreeClassifier::new();
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
        let mut bagging = BaggingClassifier::new(10).with_seed(42);
        bagging.fit(&x, &y).unwrap();

        let predictions = bagging.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_seeded_fit_is_deterministic() {
        let (x, y) = clustered_data();

        let mut a = BaggingClassifier::new(5).with_seed(7);
        a.fit(&x, &y).unwrap();
        let mut b = BaggingClassifier::new(5).with_seed(7);
        b.fit(&x, &y).unwrap();

        assert_eq!(a.score(&x).unwrap(), b.score(&x).unwrap());
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let (x, y) = clustered_data();
        let mut bagging = BaggingClassifier::new(0);
        assert!(matches!(
            bagging.fit(&x, &y).unwrap_err(),
            TabError::ConfigError(_)
        ));
    }
}
