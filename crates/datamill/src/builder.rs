//! Recursive interpretation of configuration trees into unit trees.
//!
//! For each node the builder resolves the lone key through the registry and
//! hands the argument map to the resolved factory. Factories of composition
//! units call back into [`build_units`] for arguments that are themselves
//! unit lists, which is what makes the grammar recursive.

use tracing::debug;

use crate::compose::Sequential;
use crate::config::UnitNode;
use crate::error::Result;
use crate::registry::Registry;
use crate::unit::TransformUnit;

/// Build one unit from a configuration node.
///
/// Fails with [`UnknownUnit`](crate::PipelineError::UnknownUnit) if the name
/// does not resolve and with
/// [`Construction`](crate::PipelineError::Construction) if the factory
/// rejects the bound arguments. No partial result survives a failure.
pub fn build_unit(registry: &Registry, node: &UnitNode) -> Result<Box<dyn TransformUnit>> {
    debug!("building unit '{}'", node.name);
    let factory = registry.resolve(&node.name)?;
    factory(registry, node.args.clone())
}

/// Build every node of a configuration list, preserving declaration order.
///
/// Declaration order is semantically meaningful: it is execution order for
/// sequential composition and column placement order for fan-out merges.
pub fn build_units(
    registry: &Registry,
    nodes: &[UnitNode],
) -> Result<Vec<Box<dyn TransformUnit>>> {
    nodes
        .iter()
        .map(|node| build_unit(registry, node))
        .collect()
}

/// Build a configuration list and wrap it in a [`Sequential`] root.
pub fn build_pipeline(registry: &Registry, nodes: &[UnitNode]) -> Result<Sequential> {
    Ok(Sequential::new(build_units(registry, nodes)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use polars::prelude::*;
    use serde_json::json;

    fn node(json: serde_json::Value) -> UnitNode {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_build_preserves_declaration_order() {
        let registry = Registry::with_builtins();
        let nodes = vec![
            node(json!({"add": {"col1": "a", "col2": "b"}})),
            node(json!({"mul": {"col1": "a", "col2": "b"}})),
            node(json!({"sub": {"col1": "a", "col2": "b"}})),
        ];

        let units = build_units(&registry, &nodes).unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.name()).collect();
        assert_eq!(names, vec!["add", "mul", "sub"]);
    }

    #[test]
    fn test_unknown_name_aborts_whole_build() {
        let registry = Registry::with_builtins();
        let nodes = vec![
            node(json!({"add": {"col1": "a", "col2": "b"}})),
            node(json!({"no_such_unit": {}})),
        ];

        let err = build_units(&registry, &nodes).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownUnit(name) if name == "no_such_unit"));
    }

    #[test]
    fn test_bad_arguments_become_construction_error() {
        let registry = Registry::with_builtins();
        let nodes = vec![node(json!({"add": {"col1": "a"}}))]; // col2 missing

        let err = build_units(&registry, &nodes).unwrap_err();
        assert!(matches!(err, PipelineError::Construction { ref unit, .. } if unit == "add"));
    }

    #[test]
    fn test_nested_composition_builds_recursively() {
        let registry = Registry::with_builtins();
        let nodes = vec![node(json!({
            "concat": {
                "units": [
                    {"add": {"col1": "a", "col2": "b"}},
                    {"sub": {"col1": "a", "col2": "b"}},
                ]
            }
        }))];

        let mut pipeline = build_pipeline(&registry, &nodes).unwrap();
        assert_eq!(pipeline.len(), 1);

        let df = df!["a" => [1.0, 2.0], "b" => [10.0, 20.0]].unwrap();
        let out = pipeline.apply(df).unwrap();
        assert_eq!(
            out.get_column_names()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
            vec!["a", "b", "add_a_b", "sub_a_b"]
        );
    }

    #[test]
    fn test_empty_list_builds_identity_pipeline() {
        let registry = Registry::with_builtins();
        let mut pipeline = build_pipeline(&registry, &[]).unwrap();
        assert!(pipeline.is_empty());

        let df = df!["a" => [1.0]].unwrap();
        let out = pipeline.apply(df.clone()).unwrap();
        assert!(out.equals(&df));
    }
}
