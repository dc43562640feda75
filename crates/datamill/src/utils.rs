//! Shared helpers for moving column data between representations.
//!
//! Table columns use polars nulls for missing values; the array
//! representation uses IEEE NaN. The conversions here are the single place
//! where that mapping happens.

use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Look up a column by name, with a name-carrying error on absence.
pub fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))
}

/// Extract a column as a `Vec<f64>`, nulls becoming NaN.
pub fn numeric_values(series: &Series) -> Result<Vec<f64>> {
    let casted = series.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Build a Float64 series from a buffer, NaN becoming null.
pub fn values_to_series(name: &str, values: &[f64]) -> Series {
    let options: Vec<Option<f64>> = values
        .iter()
        .map(|&v| if v.is_nan() { None } else { Some(v) })
        .collect();
    Series::new(name.into(), options)
}

/// Fill nulls in a numeric column with a constant, preserving the dtype.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> Result<Series> {
    let dtype = series.dtype().clone();
    let casted = series.cast(&DataType::Float64)?;
    let filled: Float64Chunked = casted
        .f64()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    let mut filled = filled.into_series();
    filled.rename(series.name().clone());
    Ok(filled.cast(&dtype)?)
}

/// Fill nulls in a string column with a constant.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> Result<Series> {
    let ca = series.str()?;
    let filled: StringChunked = ca
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    let mut filled = filled.into_series();
    filled.rename(series.name().clone());
    Ok(filled)
}
