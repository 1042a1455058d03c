//! CSV Data Loader Module
//! Reads the delimited input file into typed observation rows using Polars.

use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::model::{Observation, ObservationTable};

/// Header columns the input file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "country_name",
    "income",
    "income_group",
    "country_gdp",
    "phl",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("cannot read {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV: {0}")]
    Parse(#[from] PolarsError),
    #[error("required column `{0}` is missing from the header")]
    MissingColumn(String),
    #[error("column `{column}`, row {row}: value is not a finite number")]
    BadCell { column: String, row: usize },
}

/// Load the observation table from a delimited text file with a header row.
///
/// The file is probed with a plain open first so a missing or unreadable
/// path surfaces as `FileAccess` rather than a parser failure.
pub fn load_table(path: &Path) -> Result<ObservationTable, LoaderError> {
    File::open(path).map_err(|source| LoaderError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    // Use lazy evaluation for memory efficiency, then collect
    let df = LazyCsvReader::new(path.to_path_buf())
        .with_infer_schema_length(Some(10000))
        .finish()?
        .collect()?;

    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for column in REQUIRED_COLUMNS {
        if !header.iter().any(|name| name == column) {
            return Err(LoaderError::MissingColumn(column.to_string()));
        }
    }

    let country_name = string_values(&df, "country_name")?;
    let income = numeric_values(&df, "income")?;
    let income_group = string_values(&df, "income_group")?;
    let country_gdp = numeric_values(&df, "country_gdp")?;
    let phl = numeric_values(&df, "phl")?;

    let rows = (0..df.height())
        .map(|i| Observation {
            country_name: country_name[i].clone(),
            income: income[i],
            income_group: income_group[i].clone(),
            country_gdp: country_gdp[i],
            phl: phl[i],
        })
        .collect();

    Ok(ObservationTable { rows })
}

/// Extract a text column, rejecting null cells.
fn string_values(df: &DataFrame, column: &str) -> Result<Vec<String>, LoaderError> {
    let series = df.column(column)?.as_materialized_series().clone();
    (0..series.len())
        .map(|i| {
            let value = series.get(i)?;
            if value.is_null() {
                return Err(LoaderError::BadCell {
                    column: column.to_string(),
                    row: i,
                });
            }
            Ok(value.to_string().trim_matches('"').to_string())
        })
        .collect()
}

/// Extract a numeric column as f64, rejecting null or uncastable cells.
fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, LoaderError> {
    let cast = df.column(column)?.cast(&DataType::Float64)?;
    let values = cast.f64()?;
    (0..values.len())
        .map(|i| {
            values.get(i).ok_or_else(|| LoaderError::BadCell {
                column: column.to_string(),
                row: i,
            })
        })
        .collect()
}
