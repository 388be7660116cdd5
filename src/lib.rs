//! tabeval - Experiment harness for binary-classification model evaluation
//! over tabular data.
//!
//! Given one or more train/test table splits, the harness fits several
//! families of classifiers, scores them against held-out data, and produces
//! comparable performance summaries (accuracy, precision, recall, F1, AUC)
//! under configurable decision thresholds.
//!
//! # Modules
//!
//! - [`preprocessing`] - Cleaning, fixed-vocabulary one-hot encoding with an
//!   unknown fallback, equal-frequency binning
//! - [`training`] - Classifier families and the per-split [`training::Trainer`]
//! - [`evaluation`] - Split generation, testing, threshold-adjustable metrics,
//!   and cross-split result aggregation
//! - [`io`] - CSV table reading/writing against a conventional data directory

pub mod error;
pub mod io;
pub mod utils;

pub mod preprocessing;
pub mod training;
pub mod evaluation;

pub use error::{Result, TabError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, TabError};

    pub use crate::preprocessing::{
        categorical_columns, impute, Binner, CategoricalEncoder, Domain, ImputeStrategy,
    };

    pub use crate::training::{
        BaggingClassifier, DecisionTreeClassifier, KnnClassifier, LinearSvm,
        LogisticRegression, Model, Penalty, RandomForest, StratifiedBaseline, Trainer,
        TrainerParams,
    };

    pub use crate::evaluation::{
        random_split, time_split, MetricSummary, PredictionResult, ResultCollection, Split,
        Tester,
    };
}
