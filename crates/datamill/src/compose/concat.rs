//! Fan-out composition: many units over one input, merged column-wise.

use polars::prelude::DataFrame;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::builder::build_units;
use crate::config::UnitNode;
use crate::error::{PipelineError, Result, ResultExt};
use crate::registry::Registry;
use crate::unit::{OutputKind, TransformUnit, UnitSpec};

/// Applies every child unit to the *same* original input and merges the
/// outputs, column-wise, alongside that input in declaration order.
///
/// Every child must declare [`OutputKind::NewColumns`]; merging a unit that
/// rewrites its input would be ambiguous and is rejected at invocation. The
/// merge is left-aligned on row position; a child producing a different row
/// count surfaces as a polars shape error.
pub struct Concat {
    units: Vec<Box<dyn TransformUnit>>,
}

static_assertions::assert_impl_all!(Concat: Send);

impl Concat {
    /// Wrap an ordered unit list.
    pub fn new(units: Vec<Box<dyn TransformUnit>>) -> Self {
        Self { units }
    }

    /// The child units, in declaration (= column placement) order.
    pub fn units(&self) -> &[Box<dyn TransformUnit>] {
        &self.units
    }
}

impl TransformUnit for Concat {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        for unit in &self.units {
            if unit.output_kind() != OutputKind::NewColumns {
                return Err(PipelineError::KindMismatch {
                    unit: unit.name().to_string(),
                });
            }
        }

        let mut merged = df.clone();
        for unit in self.units.iter_mut() {
            debug!("concat branch '{}'", unit.name());
            let out = unit
                .apply(df.clone())
                .context(format!("in unit '{}'", unit.name()))?;
            merged = merged
                .hstack(out.get_columns())
                .context(format!("merging output of unit '{}'", unit.name()))?;
        }
        Ok(merged)
    }

    fn output_kind(&self) -> OutputKind {
        // The merged frame carries the original input plus the new columns;
        // callers thread it onward as the canonical frame.
        OutputKind::Rewrite
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[derive(Deserialize)]
struct ConcatArgs {
    units: Vec<UnitNode>,
}

impl UnitSpec for Concat {
    const NAME: &'static str = "concat";

    fn from_args(registry: &Registry, args: Value) -> Result<Box<dyn TransformUnit>> {
        let args: ConcatArgs = crate::unit::deserialize_args(Self::NAME, args)?;
        let units = build_units(registry, &args.units)?;
        Ok(Box::new(Concat::new(units)))
    }
}
