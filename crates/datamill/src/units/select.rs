//! Column selection.

use polars::prelude::*;
use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::unit::{impl_unit_spec, OutputKind, TransformUnit};

/// Remove columns from the frame. Naming an absent column is an error, so a
/// typo'd drop list fails instead of silently keeping the column.
#[derive(Debug, Clone, Deserialize)]
pub struct DropColumns {
    cols: Vec<String>,
}

impl DropColumns {
    pub fn new(cols: Vec<String>) -> Self {
        Self { cols }
    }
}

impl TransformUnit for DropColumns {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let mut df = df;
        for name in &self.cols {
            df = df
                .drop(name)
                .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))?;
        }
        Ok(df)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Rewrite
    }

    fn name(&self) -> &'static str {
        "drop_columns"
    }
}

impl_unit_spec!(DropColumns, "drop_columns");
