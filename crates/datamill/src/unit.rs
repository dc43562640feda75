//! The transformation unit contract.
//!
//! Every pipeline step implements [`TransformUnit`], the uniform invocation
//! surface that lets the builder and the composition units treat
//! heterogeneous transforms identically. Array-oriented transforms implement
//! [`ArrayTransform`] instead and join table pipelines through
//! [`ColumnAdapter`](crate::compose::ColumnAdapter).

use polars::prelude::DataFrame;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::registry::Registry;

/// How a unit's output relates to its input.
///
/// Composition units branch on this tag to decide whether to merge the output
/// alongside the original input or to treat the return value as the new
/// canonical frame. It is declared per unit, never inferred from call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// The unit returns an independent frame of freshly computed columns;
    /// the caller merges it with the original input if it wants enrichment.
    NewColumns,
    /// The unit returns the (possibly modified) input frame itself; the
    /// caller threads the return value onward as the new canonical input.
    Rewrite,
}

/// One transformation step over a table.
///
/// `apply` takes the frame by value and returns the transformed frame; a
/// stateful unit fits itself on the first call (see [`FitState`]), which is
/// why invocation takes `&mut self`. The first call on a shared instance must
/// be serialized by the caller; the engine itself never invokes concurrently.
pub trait TransformUnit: Send {
    /// Process one batch. The only required operation.
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame>;

    /// The declared relationship between output and input.
    fn output_kind(&self) -> OutputKind;

    /// Unit name for logs and error context.
    fn name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn TransformUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformUnit")
            .field("name", &self.name())
            .field("output_kind", &self.output_kind())
            .finish()
    }
}

/// A transform over a raw numeric buffer.
///
/// The missing-value sentinel in this representation is IEEE NaN; table
/// columns are converted null-to-NaN on the way in and NaN-to-null on the
/// way out by the representation adapter.
pub trait ArrayTransform: Send {
    /// Transform one column worth of values into a fresh buffer.
    fn apply(&mut self, values: &[f64]) -> Result<Vec<f64>>;
}

/// A unit type that can be built from a configuration argument map.
///
/// The default path deserializes the argument map straight into the unit
/// struct. Composition units override `from_args` to resolve nested unit
/// lists through the registry before construction.
pub trait UnitSpec: TransformUnit + Sized + 'static {
    /// The name this unit registers under when no explicit key is given.
    const NAME: &'static str;

    /// Build a boxed unit from its argument map.
    fn from_args(registry: &Registry, args: Value) -> Result<Box<dyn TransformUnit>>;
}

/// Deserialize an argument map into a unit struct, wrapping binding failures
/// so the error names the unit being constructed.
pub fn deserialize_args<T: DeserializeOwned>(name: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|source| PipelineError::Construction {
        unit: name.to_string(),
        source,
    })
}

/// Implement [`UnitSpec`] for a unit whose construction is plain argument
/// binding (no nested units to resolve).
macro_rules! impl_unit_spec {
    ($ty:ty, $name:literal) => {
        impl $crate::unit::UnitSpec for $ty {
            const NAME: &'static str = $name;

            fn from_args(
                _registry: &$crate::registry::Registry,
                args: serde_json::Value,
            ) -> $crate::error::Result<Box<dyn $crate::unit::TransformUnit>> {
                let unit: $ty = $crate::unit::deserialize_args($name, args)?;
                Ok(Box::new(unit))
            }
        }
    };
}
pub(crate) use impl_unit_spec;

/// Lifecycle of a stateful unit's learned parameters.
///
/// The transition is one-directional: a unit starts `Unfit`, the first
/// invocation moves it to `Fitted` with parameters learned from that call's
/// input, and it never goes back within its lifetime.
#[derive(Debug, Clone, Default)]
pub enum FitState<P> {
    /// No parameters learned yet; the next invocation will fit.
    #[default]
    Unfit,
    /// Parameters learned on the first invocation, reused ever after.
    Fitted(P),
}

impl<P> FitState<P> {
    /// Whether the one-shot transition has happened.
    pub fn is_fitted(&self) -> bool {
        matches!(self, FitState::Fitted(_))
    }

    /// Return the learned parameters, fitting first if this is the first call.
    ///
    /// `learn` runs at most once per instance lifetime.
    pub fn fit_once<F>(&mut self, learn: F) -> Result<&P>
    where
        F: FnOnce() -> Result<P>,
    {
        if matches!(self, FitState::Unfit) {
            *self = FitState::Fitted(learn()?);
        }
        match self {
            FitState::Fitted(params) => Ok(params),
            FitState::Unfit => unreachable!("fit_once installed parameters above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_state_starts_unfit() {
        let state: FitState<f64> = FitState::default();
        assert!(!state.is_fitted());
    }

    #[test]
    fn test_fit_once_learns_exactly_once() {
        let mut state: FitState<i32> = FitState::default();
        let mut calls = 0;

        let first = *state
            .fit_once(|| {
                calls += 1;
                Ok(41)
            })
            .unwrap();
        assert_eq!(first, 41);
        assert!(state.is_fitted());

        // Second invocation must reuse the learned value, not re-learn.
        let second = *state
            .fit_once(|| {
                calls += 1;
                Ok(99)
            })
            .unwrap();
        assert_eq!(second, 41);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_fit_once_failure_leaves_state_unfit() {
        let mut state: FitState<i32> = FitState::default();
        let result = state.fit_once(|| Err(PipelineError::NoValidValues("x".to_string())));
        assert!(result.is_err());
        assert!(!state.is_fitted());

        // A later successful fit is still possible.
        assert_eq!(*state.fit_once(|| Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_deserialize_args_names_the_unit() {
        #[derive(Debug, serde::Deserialize)]
        struct Args {
            #[allow(dead_code)]
            col: String,
        }

        let err = deserialize_args::<Args>("add", serde_json::json!({ "wrong": 1 })).unwrap_err();
        assert!(matches!(err, PipelineError::Construction { ref unit, .. } if unit == "add"));
    }
}
