//! Missing-value handling: bounded-run imputation, row dropping, constant
//! and column-sourced fills.

use polars::prelude::*;
use serde::Deserialize;

use crate::compose::ColumnAdapter;
use crate::error::{Result, ResultExt};
use crate::unit::{impl_unit_spec, ArrayTransform, OutputKind, TransformUnit};
use crate::utils;

/// Fill missing values (NaN), but only inside runs strictly shorter than
/// `max_run`. Longer runs are left as missing: short gaps are noise, long
/// gaps are real absence of data.
///
/// Runs touching either end of the sequence are bounded by a virtual present
/// sentinel on each side, so a leading or trailing gap is measured the same
/// way as an interior one. A non-positive `max_run` fills nothing, since no
/// run length is strictly below it. Returns a fresh buffer.
pub fn fill_bounded_runs(values: &[f64], max_run: i64, fill: f64) -> Vec<f64> {
    let mut out = values.to_vec();

    let mut padded = Vec::with_capacity(values.len() + 2);
    padded.push(true);
    padded.extend(values.iter().map(|v| !v.is_nan()));
    padded.push(true);

    // Each missing run produces exactly one present->missing transition and
    // one missing->present transition, in that order, so pairing consecutive
    // transition indices yields half-open [start, end) ranges in the
    // original indexing.
    let transitions: Vec<usize> = padded
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] != pair[1])
        .map(|(i, _)| i)
        .collect();

    for pair in transitions.chunks_exact(2) {
        let (start, end) = (pair[0], pair[1]);
        if ((end - start) as i64) < max_run {
            for value in &mut out[start..end] {
                *value = fill;
            }
        }
    }
    out
}

/// [`ArrayTransform`] wrapper around [`fill_bounded_runs`].
#[derive(Debug, Clone, Deserialize)]
pub struct BoundedGapFill {
    /// Runs of this length or longer are left untouched.
    pub max_run: i64,
    /// The value written into filled positions.
    #[serde(default)]
    pub fill: f64,
}

impl ArrayTransform for BoundedGapFill {
    fn apply(&mut self, values: &[f64]) -> Result<Vec<f64>> {
        Ok(fill_bounded_runs(values, self.max_run, self.fill))
    }
}

/// Table-facing bounded-run imputation over one column.
#[derive(Debug, Clone, Deserialize)]
pub struct GapFill {
    col: String,
    max_run: i64,
    #[serde(default)]
    fill: f64,
}

impl GapFill {
    pub fn new(col: impl Into<String>, max_run: i64, fill: f64) -> Self {
        Self {
            col: col.into(),
            max_run,
            fill,
        }
    }
}

impl TransformUnit for GapFill {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let transform = BoundedGapFill {
            max_run: self.max_run,
            fill: self.fill,
        };
        ColumnAdapter::new(Box::new(transform), vec![self.col.clone()]).apply(df)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Rewrite
    }

    fn name(&self) -> &'static str {
        "fill_gaps"
    }
}

impl_unit_spec!(GapFill, "fill_gaps");

/// Drop every row holding a null in any of the watched columns.
#[derive(Debug, Clone, Deserialize)]
pub struct DropMissingRows {
    /// Columns to inspect; all columns when omitted.
    #[serde(default)]
    cols: Option<Vec<String>>,
}

impl DropMissingRows {
    pub fn new(cols: Option<Vec<String>>) -> Self {
        Self { cols }
    }
}

impl TransformUnit for DropMissingRows {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let mut mask = BooleanChunked::full("mask".into(), true, df.height());
        match &self.cols {
            Some(cols) => {
                for name in cols {
                    mask = &mask & &utils::column(&df, name)?.is_not_null();
                }
            }
            None => {
                for column in df.get_columns() {
                    mask = &mask & &column.as_materialized_series().is_not_null();
                }
            }
        }
        Ok(df.filter(&mask)?)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Rewrite
    }

    fn name(&self) -> &'static str {
        "drop_missing_rows"
    }
}

impl_unit_spec!(DropMissingRows, "drop_missing_rows");

/// A constant usable as a fill value: numeric or textual.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

/// Replace nulls in the watched columns with a constant, in place.
#[derive(Debug, Clone, Deserialize)]
pub struct FillConstant {
    cols: Vec<String>,
    value: FillValue,
}

impl FillConstant {
    pub fn new(cols: Vec<String>, value: FillValue) -> Self {
        Self { cols, value }
    }
}

impl TransformUnit for FillConstant {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let mut df = df;
        for name in &self.cols {
            let series = utils::column(&df, name)?;
            let filled = match &self.value {
                FillValue::Number(v) => utils::fill_numeric_nulls(series, *v),
                FillValue::Text(v) => utils::fill_string_nulls(series, v),
            }
            .context(format!("filling column '{}'", name))?;
            df.replace(name, filled)?;
        }
        Ok(df)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Rewrite
    }

    fn name(&self) -> &'static str {
        "fill_constant"
    }
}

impl_unit_spec!(FillConstant, "fill_constant");

/// Replace nulls in one column with the row's value from another column.
#[derive(Debug, Clone, Deserialize)]
pub struct FillFromColumn {
    col: String,
    source: String,
}

impl FillFromColumn {
    pub fn new(col: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            col: col.into(),
            source: source.into(),
        }
    }
}

impl TransformUnit for FillFromColumn {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let target = utils::column(&df, &self.col)?;
        let source = utils::column(&df, &self.source)?;

        let filled = target
            .zip_with(&target.is_not_null(), source)
            .context(format!(
                "filling column '{}' from '{}'",
                self.col, self.source
            ))?;

        let mut df = df;
        df.replace(&self.col, filled)?;
        Ok(df)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Rewrite
    }

    fn name(&self) -> &'static str {
        "fill_from_column"
    }
}

impl_unit_spec!(FillFromColumn, "fill_from_column");

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NAN: f64 = f64::NAN;

    #[test]
    fn test_short_run_is_filled() {
        let out = fill_bounded_runs(&[1.0, NAN, NAN, 4.0], 3, 0.0);
        assert_eq!(out, vec![1.0, 0.0, 0.0, 4.0]);
    }

    #[test]
    fn test_run_at_threshold_is_left_missing() {
        // Length 3 is not strictly below 3.
        let out = fill_bounded_runs(&[1.0, NAN, NAN, NAN, 5.0], 3, 0.0);
        assert_eq!(out[0], 1.0);
        assert!(out[1].is_nan() && out[2].is_nan() && out[3].is_nan());
        assert_eq!(out[4], 5.0);
    }

    #[test]
    fn test_leading_run_is_bounded_by_the_start() {
        let out = fill_bounded_runs(&[NAN, 2.0, 3.0], 5, -1.0);
        assert_eq!(out, vec![-1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_trailing_run_is_bounded_by_the_end() {
        let out = fill_bounded_runs(&[1.0, 2.0, NAN], 2, 9.0);
        assert_eq!(out, vec![1.0, 2.0, 9.0]);
    }

    #[test]
    fn test_all_present_input_is_unchanged() {
        let input = [1.0, 2.0, 3.0];
        let out = fill_bounded_runs(&input, 10, 0.0);
        assert_eq!(out, input.to_vec());
    }

    #[test]
    fn test_non_positive_threshold_fills_nothing() {
        for threshold in [0, -1] {
            let out = fill_bounded_runs(&[NAN, 1.0], threshold, 7.0);
            assert!(out[0].is_nan());
        }
    }

    #[test]
    fn test_adjacent_runs_are_independent() {
        // Two runs of 2 separated by one present value: each is measured on
        // its own, not merged into a run of 5.
        let out = fill_bounded_runs(&[NAN, NAN, 3.0, NAN, NAN], 3, 0.0);
        assert_eq!(out, vec![0.0, 0.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_table_gap_fill_preserves_long_runs_and_dtype() {
        let df = df![
            "x" => [Some(1i64), None, None, Some(4), None, None, None, Some(8)]
        ]
        .unwrap();

        let out = GapFill::new("x", 3, 0.0).apply(df).unwrap();
        let x = out.column("x").unwrap();
        assert_eq!(x.dtype(), &DataType::Int64);
        // Run of 2 filled, run of 3 left as nulls.
        assert_eq!(x.get(1).unwrap().try_extract::<i64>().unwrap(), 0);
        assert_eq!(x.null_count(), 3);
    }

    #[test]
    fn test_drop_missing_rows_subset_and_all() {
        let df = df![
            "a" => [Some(1.0), None, Some(3.0)],
            "b" => [Some(1.0), Some(2.0), None]
        ]
        .unwrap();

        let subset = DropMissingRows::new(Some(vec!["a".to_string()]))
            .apply(df.clone())
            .unwrap();
        assert_eq!(subset.height(), 2);

        let all = DropMissingRows::new(None).apply(df).unwrap();
        assert_eq!(all.height(), 1);
    }

    #[test]
    fn test_fill_constant_numeric_and_text() {
        let df = df![
            "n" => [Some(1.0), None],
            "s" => [Some("x"), None]
        ]
        .unwrap();

        let out = FillConstant::new(vec!["n".to_string()], FillValue::Number(0.0))
            .apply(df)
            .unwrap();
        assert_eq!(out.column("n").unwrap().null_count(), 0);

        let out = FillConstant::new(vec!["s".to_string()], FillValue::Text("?".to_string()))
            .apply(out)
            .unwrap();
        assert_eq!(out.column("s").unwrap().null_count(), 0);
    }

    #[test]
    fn test_fill_from_column_takes_row_values() {
        let df = df![
            "x" => [Some(1.0), None, Some(3.0)],
            "backup" => [9.0, 20.0, 9.0]
        ]
        .unwrap();

        let out = FillFromColumn::new("x", "backup").apply(df).unwrap();
        let x = out.column("x").unwrap();
        assert_eq!(x.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
        assert_eq!(x.get(1).unwrap().try_extract::<f64>().unwrap(), 20.0);
    }
}
