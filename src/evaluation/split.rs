//! Train/test split generation

use crate::error::{Result, TabError};
use chrono::NaiveDate;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// One train/test partition of a table
#[derive(Debug, Clone)]
pub struct Split {
    pub train: DataFrame,
    pub test: DataFrame,
}

/// Shuffled random partition.
///
/// The test side gets `ceil(test_size * N)` rows; the same seed always
/// produces the same partition. No stratification.
pub fn random_split(df: &DataFrame, label: &str, test_size: f64, seed: u64) -> Result<Split> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TabError::ConfigError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    if df.column(label).is_err() {
        return Err(TabError::FeatureNotFound(label.to_string()));
    }

    let n = df.height();
    let mut indices: Vec<u32> = (0..n as u32).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = (test_size * n as f64).ceil() as usize;
    let test_indices: Vec<u32> = indices[..n_test].to_vec();
    let train_indices: Vec<u32> = indices[n_test..].to_vec();

    let test = df.take(&IdxCa::from_vec("idx".into(), test_indices))?;
    let train = df.take(&IdxCa::from_vec("idx".into(), train_indices))?;

    tracing::debug!(
        rows = n,
        train = train.height(),
        test = test.height(),
        "random split"
    );
    Ok(Split { train, test })
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| TabError::DataError(format!("cannot parse date \"{}\": {}", value, e)))
}

/// Cumulative time-window splits.
///
/// Divides `[begin, end]` into `n_splits` equal-width windows bounded by
/// thresholds `t_1 < ... < t_n` and yields `n_splits - 1` splits where split
/// `i` trains on all rows dated at or before `t_i` and tests on the window
/// `(t_i, t_{i+1}]`. Rows exactly on a boundary land on the train side of the
/// later split, never in both. The date column holds `%Y-%m-%d` strings and
/// is optionally dropped from both outputs.
pub fn time_split(
    df: &DataFrame,
    column: &str,
    begin: &str,
    end: &str,
    n_splits: usize,
    drop_date: bool,
) -> Result<Vec<Split>> {
    if n_splits < 2 {
        return Err(TabError::ConfigError(format!(
            "n_splits must be at least 2, got {}",
            n_splits
        )));
    }

    let begin_date = parse_date(begin)?;
    let end_date = parse_date(end)?;
    if end_date <= begin_date {
        return Err(TabError::ConfigError(format!(
            "time range is empty: {} to {}",
            begin, end
        )));
    }

    let date_column = df
        .column(column)
        .map_err(|_| TabError::FeatureNotFound(column.to_string()))?;
    let series = date_column.as_materialized_series().clone();
    let ca = series
        .str()
        .map_err(|e| TabError::DataError(e.to_string()))?;

    let mut dates = Vec::with_capacity(df.height());
    for value in ca.into_iter() {
        let value = value.ok_or_else(|| {
            TabError::DataError(format!("null date in column \"{}\"", column))
        })?;
        dates.push(parse_date(value)?);
    }

    let window = (end_date - begin_date) / n_splits as i32;
    let thresholds: Vec<NaiveDate> = (1..=n_splits)
        .map(|i| begin_date + window * i as i32)
        .collect();

    let mut splits = Vec::with_capacity(n_splits - 1);
    for i in 0..n_splits - 1 {
        let t_lo = thresholds[i];
        let t_hi = thresholds[i + 1];

        let train_mask: Vec<bool> = dates.iter().map(|&d| d <= t_lo).collect();
        let test_mask: Vec<bool> = dates.iter().map(|&d| d > t_lo && d <= t_hi).collect();

        let mut train = df.filter(&BooleanChunked::from_slice("mask".into(), &train_mask))?;
        let mut test = df.filter(&BooleanChunked::from_slice("mask".into(), &test_mask))?;
        if drop_date {
            train = train.drop(column)?;
            test = test.drop(column)?;
        }

        tracing::debug!(
            split = i + 1,
            train = train.height(),
            test = test.height(),
            "time split window"
        );
        splits.push(Split { train, test });
    }

    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated_df() -> DataFrame {
        df!(
            "date" => &[
                "2020-01-15", "2020-02-15", "2020-03-15", "2020-04-15",
                "2020-05-15", "2020-06-15", "2020-07-15", "2020-08-15",
            ],
            "x" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            "label" => &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_random_split_sizes() {
        let df = dated_df();
        let split = random_split(&df, "label", 0.25, 42).unwrap();
        assert_eq!(split.test.height(), 2);
        assert_eq!(split.train.height(), 6);
    }

    #[test]
    fn test_random_split_seeded_repeatable() {
        let df = dated_df();
        let a = random_split(&df, "label", 0.25, 7).unwrap();
        let b = random_split(&df, "label", 0.25, 7).unwrap();
        assert!(a.train.equals(&b.train));
        assert!(a.test.equals(&b.test));
    }

    #[test]
    fn test_random_split_invalid_fraction() {
        let df = dated_df();
        assert!(matches!(
            random_split(&df, "label", 1.5, 0).unwrap_err(),
            TabError::ConfigError(_)
        ));
    }

    #[test]
    fn test_time_split_count_and_growth() {
        let df = dated_df();
        let splits = time_split(&df, "date", "2020-01-01", "2020-09-01", 4, true).unwrap();
        assert_eq!(splits.len(), 3);

        // Later train sets contain at least as many rows as earlier ones
        for window in splits.windows(2) {
            assert!(window[1].train.height() >= window[0].train.height());
        }
        // Date column dropped
        assert!(splits[0].train.column("date").is_err());
    }

    #[test]
    fn test_time_split_disjoint_test_windows() {
        let df = dated_df();
        let splits = time_split(&df, "date", "2020-01-01", "2020-09-01", 4, false).unwrap();

        let mut seen: Vec<f64> = Vec::new();
        for split in &splits {
            let xs = crate::utils::column_f64(&split.test, "x").unwrap();
            for x in xs {
                assert!(!seen.contains(&x), "row {} appears in two test windows", x);
                seen.push(x);
            }
        }
    }

    #[test]
    fn test_time_split_requires_two_windows() {
        let df = dated_df();
        assert!(matches!(
            time_split(&df, "date", "2020-01-01", "2020-09-01", 1, false).unwrap_err(),
            TabError::ConfigError(_)
        ));
    }
}
