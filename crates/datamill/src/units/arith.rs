//! Element-wise binary arithmetic over two numeric columns.
//!
//! Each unit computes one fresh column named `{prefix}_{col1}_{col2}` and
//! returns it as an independent frame, so a fan-out merge places it next to
//! the inputs. Missing values propagate: a null in either operand yields a
//! null in the result.

use polars::prelude::*;
use serde::Deserialize;

use crate::error::Result;
use crate::unit::{impl_unit_spec, OutputKind, TransformUnit};
use crate::utils;

macro_rules! binary_unit {
    ($ty:ident, $name:literal, $op:tt, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Deserialize)]
        pub struct $ty {
            col1: String,
            col2: String,
            /// Output column prefix; defaults to the unit name.
            #[serde(default)]
            prefix: Option<String>,
        }

        impl $ty {
            pub fn new(col1: impl Into<String>, col2: impl Into<String>) -> Self {
                Self {
                    col1: col1.into(),
                    col2: col2.into(),
                    prefix: None,
                }
            }

            fn output_name(&self) -> String {
                let prefix = self.prefix.as_deref().unwrap_or($name);
                format!("{}_{}_{}", prefix, self.col1, self.col2)
            }
        }

        impl TransformUnit for $ty {
            fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
                let left = utils::column(&df, &self.col1)?.cast(&DataType::Float64)?;
                let right = utils::column(&df, &self.col2)?.cast(&DataType::Float64)?;

                let result = left.f64()? $op right.f64()?;
                let mut series = result.into_series();
                series.rename(self.output_name().into());

                Ok(DataFrame::new(vec![series.into_column()])?)
            }

            fn output_kind(&self) -> OutputKind {
                OutputKind::NewColumns
            }

            fn name(&self) -> &'static str {
                $name
            }
        }

        impl_unit_spec!($ty, $name);
    };
}

binary_unit!(Add, "add", +, "Element-wise sum of two columns.");
binary_unit!(Sub, "sub", -, "Element-wise difference of two columns.");
binary_unit!(Mul, "mul", *, "Element-wise product of two columns.");
binary_unit!(Div, "div", /, "Element-wise quotient of two columns.");
