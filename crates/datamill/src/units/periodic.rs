//! Cyclic feature encoding.

use std::f64::consts::TAU;

use polars::prelude::*;
use serde::Deserialize;

use crate::error::Result;
use crate::unit::{impl_unit_spec, OutputKind, TransformUnit};
use crate::utils;

fn default_period() -> f64 {
    1.0
}

/// Project a periodic quantity onto the unit circle.
///
/// Emits `{prefix}_sin` and `{prefix}_cos` of `value / period`, so the ends
/// of the cycle land next to each other instead of a full range apart. Pair
/// it with a calendar unit and the matching period (365.25 for day-of-year,
/// 12 for months, 7 for weekdays) to encode seasonality.
#[derive(Debug, Clone, Deserialize)]
pub struct SinCos {
    col: String,
    /// Output prefix; defaults to the input column name.
    #[serde(default)]
    prefix: Option<String>,
    /// Length of one full cycle in the column's own scale.
    #[serde(default = "default_period")]
    period: f64,
}

impl SinCos {
    pub fn new(col: impl Into<String>, period: f64) -> Self {
        Self {
            col: col.into(),
            prefix: None,
            period,
        }
    }
}

impl TransformUnit for SinCos {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let casted = utils::column(&df, &self.col)?.cast(&DataType::Float64)?;
        let ca = casted.f64()?;
        let period = self.period;
        let prefix = self.prefix.as_deref().unwrap_or(&self.col);

        let mut sin = ca.apply_values(|v| (TAU * v / period).sin()).into_series();
        sin.rename(format!("{}_sin", prefix).into());
        let mut cos = ca.apply_values(|v| (TAU * v / period).cos()).into_series();
        cos.rename(format!("{}_cos", prefix).into());

        Ok(DataFrame::new(vec![sin.into_column(), cos.into_column()])?)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::NewColumns
    }

    fn name(&self) -> &'static str {
        "sin_cos"
    }
}

impl_unit_spec!(SinCos, "sin_cos");

#[cfg(test)]
mod tests {
    use super::*;

    fn value(df: &DataFrame, name: &str, row: usize) -> f64 {
        df.column(name)
            .unwrap()
            .get(row)
            .unwrap()
            .try_extract::<f64>()
            .unwrap()
    }

    #[test]
    fn test_quarter_cycle_hits_the_axes() {
        let df = df!["phase" => [0.0, 0.25, 0.5]].unwrap();
        let out = SinCos::new("phase", 1.0).apply(df).unwrap();

        assert!((value(&out, "phase_sin", 0)).abs() < 1e-12);
        assert!((value(&out, "phase_cos", 0) - 1.0).abs() < 1e-12);
        assert!((value(&out, "phase_sin", 1) - 1.0).abs() < 1e-12);
        assert!((value(&out, "phase_cos", 2) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cycle_ends_meet() {
        // Day 1 and day 366 of a year-long cycle encode to nearby points.
        let df = df!["doy" => [1.0, 366.0]].unwrap();
        let out = SinCos::new("doy", 365.25).apply(df).unwrap();

        let ds = value(&out, "doy_sin", 0) - value(&out, "doy_sin", 1);
        let dc = value(&out, "doy_cos", 0) - value(&out, "doy_cos", 1);
        assert!((ds * ds + dc * dc).sqrt() < 0.05);
    }

    #[test]
    fn test_nulls_stay_null() {
        let df = df!["phase" => [Some(0.5), None]].unwrap();
        let out = SinCos::new("phase", 1.0).apply(df).unwrap();
        assert_eq!(out.column("phase_sin").unwrap().null_count(), 1);
        assert_eq!(out.column("phase_cos").unwrap().null_count(), 1);
    }
}
