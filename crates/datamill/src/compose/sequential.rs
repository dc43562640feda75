//! Sequential chaining of units.

use polars::prelude::DataFrame;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::builder::build_units;
use crate::config::UnitNode;
use crate::error::{Result, ResultExt};
use crate::registry::Registry;
use crate::unit::{OutputKind, TransformUnit, UnitSpec};

/// Applies units in order, feeding each unit's output to the next.
///
/// `data -> unit1 -> data1 -> unit2 -> data2`. An empty chain is the
/// identity transform. A failure in any unit aborts the whole chain; there
/// is no partial-result recovery.
pub struct Sequential {
    units: Vec<Box<dyn TransformUnit>>,
}

static_assertions::assert_impl_all!(Sequential: Send);

impl Sequential {
    /// Wrap an ordered unit list.
    pub fn new(units: Vec<Box<dyn TransformUnit>>) -> Self {
        Self { units }
    }

    /// The child units, in declaration (= execution) order.
    pub fn units(&self) -> &[Box<dyn TransformUnit>] {
        &self.units
    }

    /// Number of child units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the chain is empty (the identity transform).
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl TransformUnit for Sequential {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let mut df = df;
        for (index, unit) in self.units.iter_mut().enumerate() {
            debug!("sequential step {}: '{}'", index, unit.name());
            df = unit
                .apply(df)
                .context(format!("in unit '{}' (step {})", unit.name(), index))?;
        }
        Ok(df)
    }

    fn output_kind(&self) -> OutputKind {
        // The chain threads its input through; the return value is the new
        // canonical frame even when the last unit emits fresh columns.
        OutputKind::Rewrite
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[derive(Deserialize)]
struct SequentialArgs {
    units: Vec<UnitNode>,
}

impl UnitSpec for Sequential {
    const NAME: &'static str = "sequential";

    fn from_args(registry: &Registry, args: Value) -> Result<Box<dyn TransformUnit>> {
        let args: SequentialArgs = crate::unit::deserialize_args(Self::NAME, args)?;
        let units = build_units(registry, &args.units)?;
        Ok(Box::new(Sequential::new(units)))
    }
}
