//! Stateful column scalers.
//!
//! Every scaler learns its parameters from the first batch it sees and
//! reuses them for every later batch (see
//! [`FitState`](crate::unit::FitState)). The transform is always
//! `(value - shift) / scale`; the scalers differ only in what they learn.
//! Nulls pass through untouched. Scaled output is Float64 regardless of the
//! input dtype.

use polars::prelude::*;
use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::unit::{impl_unit_spec, FitState, OutputKind, TransformUnit};
use crate::utils;

/// Learned per-column affine parameters.
#[derive(Debug, Clone, Copy)]
struct ColumnScale {
    shift: f64,
    scale: f64,
}

fn nonzero(scale: f64) -> f64 {
    if scale == 0.0 { 1.0 } else { scale }
}

fn learn_standard(ca: &Float64Chunked, name: &str) -> Result<ColumnScale> {
    let mean = ca
        .mean()
        .ok_or_else(|| PipelineError::NoValidValues(name.to_string()))?;
    let std = ca.std(0).unwrap_or(0.0);
    Ok(ColumnScale {
        shift: mean,
        scale: nonzero(std),
    })
}

fn learn_min_max(ca: &Float64Chunked, name: &str) -> Result<ColumnScale> {
    let min = ca
        .min()
        .ok_or_else(|| PipelineError::NoValidValues(name.to_string()))?;
    let max = ca.max().unwrap_or(min);
    Ok(ColumnScale {
        shift: min,
        scale: nonzero(max - min),
    })
}

fn learn_robust(ca: &Float64Chunked, name: &str) -> Result<ColumnScale> {
    let missing = || PipelineError::NoValidValues(name.to_string());
    let median = ca.median().ok_or_else(missing)?;
    let q1 = ca.quantile(0.25, QuantileMethod::Linear)?.ok_or_else(missing)?;
    let q3 = ca.quantile(0.75, QuantileMethod::Linear)?.ok_or_else(missing)?;
    Ok(ColumnScale {
        shift: median,
        scale: nonzero(q3 - q1),
    })
}

fn scale_frame(
    df: DataFrame,
    cols: &[String],
    prefix: &str,
    return_new: bool,
    state: &mut FitState<Vec<ColumnScale>>,
    learn: impl Fn(&Float64Chunked, &str) -> Result<ColumnScale>,
) -> Result<DataFrame> {
    let params = state.fit_once(|| {
        cols.iter()
            .map(|name| {
                let casted = utils::column(&df, name)?.cast(&DataType::Float64)?;
                learn(casted.f64()?, name)
            })
            .collect()
    })?;

    let mut df = df;
    let mut new_columns = Vec::with_capacity(cols.len());
    for (name, p) in cols.iter().zip(params) {
        let casted = utils::column(&df, name)?.cast(&DataType::Float64)?;
        let scaled = casted
            .f64()?
            .apply_values(|v| (v - p.shift) / p.scale)
            .into_series();

        if return_new {
            let mut scaled = scaled;
            scaled.rename(format!("{}_{}", prefix, name).into());
            new_columns.push(scaled.into_column());
        } else {
            df.replace(name, scaled)?;
        }
    }

    if return_new {
        Ok(DataFrame::new(new_columns)?)
    } else {
        Ok(df)
    }
}

macro_rules! scaler_unit {
    ($ty:ident, $name:literal, $default_prefix:literal, $learn:path, $doc:literal) => {
        #[doc = $doc]
        #[derive(Deserialize)]
        pub struct $ty {
            cols: Vec<String>,
            /// Emit `{prefix}_{col}` columns instead of rewriting in place.
            #[serde(default)]
            return_new: bool,
            #[serde(default)]
            prefix: Option<String>,
            #[serde(skip)]
            state: FitState<Vec<ColumnScale>>,
        }

        impl $ty {
            pub fn new(cols: Vec<String>) -> Self {
                Self {
                    cols,
                    return_new: false,
                    prefix: None,
                    state: FitState::default(),
                }
            }

            pub fn is_fitted(&self) -> bool {
                self.state.is_fitted()
            }
        }

        impl TransformUnit for $ty {
            fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
                let prefix = self.prefix.as_deref().unwrap_or($default_prefix);
                scale_frame(
                    df,
                    &self.cols,
                    prefix,
                    self.return_new,
                    &mut self.state,
                    $learn,
                )
            }

            fn output_kind(&self) -> OutputKind {
                if self.return_new {
                    OutputKind::NewColumns
                } else {
                    OutputKind::Rewrite
                }
            }

            fn name(&self) -> &'static str {
                $name
            }
        }

        impl_unit_spec!($ty, $name);
    };
}

scaler_unit!(
    StandardScaler,
    "standard_scale",
    "std",
    learn_standard,
    "Center on the mean and divide by the population standard deviation."
);
scaler_unit!(
    MinMaxScaler,
    "min_max_scale",
    "minmax",
    learn_min_max,
    "Map the observed value range onto `[0, 1]`."
);
scaler_unit!(
    RobustScaler,
    "robust_scale",
    "robust",
    learn_robust,
    "Center on the median and divide by the interquartile range."
);
