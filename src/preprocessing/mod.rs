//! Data cleaning and feature generation.
//!
//! Provides the fixed-vocabulary categorical encoder, the equal-frequency
//! binner, and imputation helpers. Encoders and binners follow a
//! fit/transform protocol: fitted state (the category [`Domain`], the bin
//! edges) is produced once and read-only afterwards, so the same encoding can
//! be replayed on unseen tables.

mod binner;
mod clean;
mod encoder;

pub use binner::Binner;
pub use clean::{categorical_columns, impute, ImputeStrategy};
pub use encoder::{CategoricalEncoder, Domain};
