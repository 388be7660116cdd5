//! Per-split training over the classifier family registry

use super::bagging::BaggingClassifier;
use super::baseline::StratifiedBaseline;
use super::forest::RandomForest;
use super::knn::KnnClassifier;
use super::linear::{LogisticRegression, Penalty};
use super::models::{BoxedModel, Model};
use super::svm::LinearSvm;
use super::tree::DecisionTreeClassifier;
use crate::error::Result;
use crate::utils::features_and_label;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Family names, in training order.
pub const FAMILIES: [&str; 7] = [
    "dummy",
    "logistic_regression",
    "decision_tree",
    "k_nearest_neighbors",
    "linear_svm",
    "random_forest",
    "bagging",
];

type FamilyFn = fn(&Trainer, &TrainerParams) -> Result<Vec<BoxedModel>>;

// Fit entry points, same order as FAMILIES
const REGISTRY: [(&str, FamilyFn); 7] = [
    ("dummy", |t: &Trainer, _: &TrainerParams| t.train_dummy()),
    ("logistic_regression", |t: &Trainer, p: &TrainerParams| {
        t.train_logistic_regression(p.penalty)
    }),
    ("decision_tree", |t: &Trainer, p: &TrainerParams| {
        t.train_decision_tree(p.max_depth)
    }),
    ("k_nearest_neighbors", |t: &Trainer, p: &TrainerParams| {
        t.train_k_nearest_neighbors(p.n_neighbors)
    }),
    ("linear_svm", |t: &Trainer, p: &TrainerParams| {
        t.train_linear_svm(p.svm_c)
    }),
    ("random_forest", |t: &Trainer, p: &TrainerParams| {
        t.train_random_forest(p.n_trees, p.max_depth)
    }),
    ("bagging", |t: &Trainer, p: &TrainerParams| {
        t.train_bagging(p.n_estimators, p.max_depth)
    }),
];

/// Hyperparameters consumed by [`Trainer::train_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerParams {
    /// Penalty for logistic regression
    pub penalty: Penalty,
    /// Maximum depth for tree-based families
    pub max_depth: Option<usize>,
    /// Neighbor count for KNN
    pub n_neighbors: usize,
    /// Regularization strength for the linear SVM
    pub svm_c: f64,
    /// Tree count for the random forest
    pub n_trees: usize,
    /// Estimator count for bagging
    pub n_estimators: usize,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            penalty: Penalty::L2,
            max_depth: None,
            n_neighbors: 5,
            svm_c: 1.0,
            n_trees: 100,
            n_estimators: 10,
        }
    }
}

impl TrainerParams {
    pub fn with_penalty(mut self, penalty: Penalty) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    pub fn with_svm_c(mut self, c: f64) -> Self {
        self.svm_c = c;
        self
    }

    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }
}

/// Fits one model per held training table.
///
/// A trainer holds the training split (or the per-window training tables of
/// a time split) and the label column name. Every `train_*` method returns
/// one fitted model per table, in table order.
pub struct Trainer {
    tables: Vec<DataFrame>,
    label: String,
    seed: u64,
}

impl Trainer {
    /// Trainer over a single training table
    pub fn new(table: DataFrame, label: &str) -> Self {
        Self {
            tables: vec![table],
            label: label.to_string(),
            seed: 42,
        }
    }

    /// Trainer over one table per split window
    pub fn from_tables(tables: Vec<DataFrame>, label: &str) -> Self {
        Self {
            tables,
            label: label.to_string(),
            seed: 42,
        }
    }

    /// Set the seed used by stochastic families
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Training tables held by this trainer
    pub fn tables(&self) -> &[DataFrame] {
        &self.tables
    }

    fn fit_each<F>(&self, family: &str, mut make: F) -> Result<Vec<BoxedModel>>
    where
        F: FnMut() -> BoxedModel,
    {
        let mut fitted = Vec::with_capacity(self.tables.len());
        for (idx, table) in self.tables.iter().enumerate() {
            let (x, y) = features_and_label(table, &self.label)?;
            tracing::debug!(
                family,
                table = idx,
                rows = x.nrows(),
                features = x.ncols(),
                "fitting model"
            );
            let mut model = make();
            model.fit(&x, &y)?;
            fitted.push(model);
        }
        Ok(fitted)
    }

    /// Stratified dummy baseline, one per table
    pub fn train_dummy(&self) -> Result<Vec<BoxedModel>> {
        let seed = self.seed;
        self.fit_each("dummy", || Box::new(StratifiedBaseline::new(seed)))
    }

    /// Logistic regression, one per table
    pub fn train_logistic_regression(&self, penalty: Penalty) -> Result<Vec<BoxedModel>> {
        self.fit_each("logistic_regression", || {
            Box::new(LogisticRegression::new().with_penalty(penalty))
        })
    }

    /// Decision tree, one per table
    pub fn train_decision_tree(&self, max_depth: Option<usize>) -> Result<Vec<BoxedModel>> {
        self.fit_each("decision_tree", || {
            let mut tree = DecisionTreeClassifier::new();
            if let Some(depth) = max_depth {
                tree = tree.with_max_depth(depth);
            }
            Box::new(tree)
        })
    }

    /// K-nearest neighbors, one per table
    pub fn train_k_nearest_neighbors(&self, n_neighbors: usize) -> Result<Vec<BoxedModel>> {
        self.fit_each("k_nearest_neighbors", || {
            Box::new(KnnClassifier::new(n_neighbors))
        })
    }

    /// Linear SVM, one per table
    pub fn train_linear_svm(&self, c: f64) -> Result<Vec<BoxedModel>> {
        self.fit_each("linear_svm", || Box::new(LinearSvm::new(c)))
    }

    /// Random forest, one per table
    pub fn train_random_forest(
        &self,
        n_trees: usize,
        max_depth: Option<usize>,
    ) -> Result<Vec<BoxedModel>> {
        let seed = self.seed;
        self.fit_each("random_forest", || {
            let mut forest = RandomForest::new(n_trees).with_seed(seed);
            if let Some(depth) = max_depth {
                forest = forest.with_max_depth(depth);
            }
            Box::new(forest)
        })
    }

    /// Bagged decision trees, one per table
    pub fn train_bagging(
        &self,
        n_estimators: usize,
        max_depth: Option<usize>,
    ) -> Result<Vec<BoxedModel>> {
        let seed = self.seed;
        self.fit_each("bagging", || {
            let mut bagging = BaggingClassifier::new(n_estimators).with_seed(seed);
            if let Some(depth) = max_depth {
                bagging = bagging.with_max_depth(depth);
            }
            Box::new(bagging)
        })
    }

    /// Train every family in [`FAMILIES`] order, minus any excluded names.
    ///
    /// Returns `(family_name, fitted models)` pairs; a family's models are in
    /// table order. Unknown names in `exclude` are ignored.
    pub fn train_all(
        &self,
        params: &TrainerParams,
        exclude: &[&str],
    ) -> Result<Vec<(String, Vec<BoxedModel>)>> {
        let mut out = Vec::new();
        for (family, fit) in REGISTRY {
            if exclude.contains(&family) {
                continue;
            }
            tracing::info!(family, "training family");
            out.push((family.to_string(), fit(self, params)?));
        }
        Ok(out)
    }
}
