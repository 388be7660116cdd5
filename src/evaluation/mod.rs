//! Split generation, held-out scoring, and metric aggregation
//!
//! The evaluation flow mirrors the training flow: a [`Split`] (or a series
//! of time-window splits) feeds a [`crate::training::Trainer`] on one side
//! and a [`Tester`] on the other. Testing yields [`PredictionResult`]s whose
//! metrics can be re-read under rank thresholds, and [`ResultCollection`]
//! lines families up side by side for comparison.

mod collection;
mod result;
mod split;
mod tester;

pub use collection::ResultCollection;
pub use result::{MetricSummary, PredictionResult};
pub use split::{random_split, time_split, Split};
pub use tester::Tester;
