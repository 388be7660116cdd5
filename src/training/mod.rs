//! Classifier families and per-split training
//!
//! Provides the polymorphic [`Model`] trait and one implementation per
//! family:
//! - Stratified dummy baseline
//! - Logistic regression (configurable penalty)
//! - Decision tree (configurable max depth)
//! - K-nearest neighbors (configurable k)
//! - Linear SVM, always standardized first (configurable regularization)
//! - Random forest (configurable tree count)
//! - Bagging ensemble (configurable estimator count)
//!
//! The [`Trainer`] fits one model per held training table and exposes the
//! enumerated family registry behind [`Trainer::train_all`].

mod baseline;
mod knn;
mod linear;
mod models;
mod svm;
mod trainer;
mod tree;

pub mod bagging;
pub mod forest;

pub use bagging::BaggingClassifier;
pub use baseline::StratifiedBaseline;
pub use forest::RandomForest;
pub use knn::KnnClassifier;
pub use linear::{LogisticRegression, Penalty};
pub use models::{BoxedModel, Model};
pub use svm::LinearSvm;
pub use trainer::{Trainer, TrainerParams, FAMILIES};
pub use tree::DecisionTreeClassifier;
