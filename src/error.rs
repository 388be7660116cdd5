//! Error types for the tabeval harness

use thiserror::Error;

/// Result type alias for tabeval operations
pub type Result<T> = std::result::Result<T, TabError>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum TabError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Number of models ({models}) does not match test sets ({tables})")]
    CardinalityError { models: usize, tables: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for TabError {
    fn from(err: polars::error::PolarsError) -> Self {
        TabError::DataError(err.to_string())
    }
}
