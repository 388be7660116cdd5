//! Reading and writing of data tables.
//!
//! Functions here default to assuming that all table files live under a
//! `data/` directory in the project root.

use crate::error::{Result, TabError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Conventional data directory for table files.
pub const DATA_DIR: &str = "data";

/// Load a named CSV table from the default data directory.
pub fn read_csv(name: &str) -> Result<DataFrame> {
    read_csv_from(name, Path::new(DATA_DIR))
}

/// Load a named CSV table from an explicit directory.
pub fn read_csv_from(name: &str, dir: &Path) -> Result<DataFrame> {
    let path = dir.join(name);
    let file = File::open(&path).map_err(|e| {
        TabError::DataError(format!("cannot open {}: {}", path.display(), e))
    })?;

    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file);

    reader
        .finish()
        .map_err(|e| TabError::DataError(e.to_string()))
}

/// Write a table as CSV into the default data directory.
pub fn write_csv(df: &mut DataFrame, name: &str) -> Result<()> {
    write_csv_to(df, name, Path::new(DATA_DIR))
}

/// Write a table as CSV into an explicit directory.
pub fn write_csv_to(df: &mut DataFrame, name: &str, dir: &Path) -> Result<()> {
    let path = dir.join(name);
    let mut file = File::create(&path).map_err(|e| {
        TabError::DataError(format!("cannot create {}: {}", path.display(), e))
    })?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| TabError::DataError(e.to_string()))
}
