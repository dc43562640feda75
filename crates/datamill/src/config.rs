//! Declarative configuration types for the pipeline builder.
//!
//! A pipeline configuration is an ordered list of nodes; each node is a
//! single-key mapping `{unit_name: arguments}` where `arguments` is a mapping
//! of constructor keyword values. Any argument whose semantic type is "a list
//! of units" is itself such a list, recursively. No other structural forms
//! are accepted.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::Result;

/// One configuration node: a unit name plus its argument map.
///
/// Deserializes from a single-key mapping; any other shape is rejected so a
/// typo (two units squashed into one mapping, a bare string) fails loudly at
/// parse time rather than surfacing as a half-built pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitNode {
    /// The registered unit name.
    pub name: String,
    /// The constructor argument map, expanded by the unit's factory.
    pub args: Value,
}

impl UnitNode {
    /// Convenience constructor, mostly for tests and programmatic configs.
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl<'de> Deserialize<'de> for UnitNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(D::Error::custom(format!(
                "unit node must be a single-key mapping, got {} keys",
                map.len()
            )));
        }
        // len() == 1 makes this iterator yield exactly one pair.
        let (name, args) = map.into_iter().next().ok_or_else(|| {
            D::Error::custom("unit node must be a single-key mapping, got 0 keys")
        })?;
        Ok(UnitNode { name, args })
    }
}

/// Top-level bundle configuration: a pipeline plus an external model
/// reference. Both parts are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleConfig {
    /// Ordered top-level unit list; declaration order is execution order.
    #[serde(default)]
    pub pipeline: Option<Vec<UnitNode>>,
    /// Path to an externally trained model artifact. Opaque to the engine.
    #[serde(default)]
    pub model: Option<PathBuf>,
}

impl BundleConfig {
    /// Parse a bundle configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a bundle configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
