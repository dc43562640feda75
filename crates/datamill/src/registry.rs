//! Name-to-factory registry used to build units from configuration.
//!
//! The registry decouples the string vocabulary of configuration files from
//! concrete unit constructors. It is an explicit object, constructed once at
//! process start and passed into the builder; there is no ambient global
//! state. Registration is append-only for the life of the registry.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::unit::{TransformUnit, UnitSpec};

/// Factory signature stored per registered name.
///
/// The registry reference lets composition-unit factories recursively build
/// their nested unit lists.
pub type UnitFactory = fn(&Registry, Value) -> Result<Box<dyn TransformUnit>>;

/// Append-only map from unit name to constructor.
#[derive(Default)]
pub struct Registry {
    factories: HashMap<String, UnitFactory>,
}

impl Registry {
    /// An empty registry. Useful for tests and fully custom vocabularies.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with every built-in unit.
    ///
    /// This is the single initialization routine that enumerates the built-in
    /// unit types; it runs before any configuration is parsed, so the
    /// one-name-one-constructor invariant never depends on load order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::units::register_builtins(&mut registry)
            .expect("built-in unit names are statically unique");
        registry
    }

    /// Register a factory under an explicit name.
    ///
    /// Fails with [`PipelineError::DuplicateUnit`] if the name is taken;
    /// there is no removal or overwrite.
    pub fn register(&mut self, name: impl Into<String>, factory: UnitFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(PipelineError::DuplicateUnit(name));
        }
        debug!("registered unit '{}'", name);
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Register a unit type under its own declared name.
    pub fn register_default<T: UnitSpec>(&mut self) -> Result<()> {
        self.register(T::NAME, T::from_args)
    }

    /// Look up the factory for a name.
    pub fn resolve(&self, name: &str) -> Result<UnitFactory> {
        self.factories
            .get(name)
            .copied()
            .ok_or_else(|| PipelineError::UnknownUnit(name.to_string()))
    }

    /// Whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Iterate over the registered names (unordered).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

// The registry is shared immutably across pipeline builds once populated.
static_assertions::assert_impl_all!(Registry: Send, Sync);
