//! Bridge between table pipelines and array transforms.

use polars::prelude::DataFrame;
use tracing::debug;

use crate::error::{Result, ResultExt};
use crate::unit::{ArrayTransform, OutputKind, TransformUnit};
use crate::utils;

/// Lifts an [`ArrayTransform`] into the table pipeline.
///
/// For each named column the adapter extracts the values as an `f64` buffer
/// (nulls become NaN), runs the wrapped transform, and writes the result back
/// under the same name (NaN becomes null again), casting to the column's
/// original dtype. Columns not named pass through untouched.
pub struct ColumnAdapter {
    transform: Box<dyn ArrayTransform>,
    columns: Vec<String>,
}

static_assertions::assert_impl_all!(ColumnAdapter: Send);

impl ColumnAdapter {
    pub fn new(transform: Box<dyn ArrayTransform>, columns: Vec<String>) -> Self {
        Self { transform, columns }
    }
}

impl TransformUnit for ColumnAdapter {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let mut df = df;
        for name in &self.columns {
            debug!("adapting column '{}'", name);
            let series = utils::column(&df, name)?;
            let dtype = series.dtype().clone();

            let values = utils::numeric_values(series)?;
            let transformed = self.transform.apply(&values)?;

            let restored = utils::values_to_series(name, &transformed)
                .cast(&dtype)
                .context(format!("restoring dtype of column '{}'", name))?;
            df.replace(name, restored)
                .context(format!("writing back column '{}'", name))?;
        }
        Ok(df)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Rewrite
    }

    fn name(&self) -> &'static str {
        "column_adapter"
    }
}
