//! Variable resolution
//!
//! A [`VariableResolver`] maps identifier names to values at evaluation time.
//! Resolvers are owned by the caller and only ever read here.

use ruleguard_core::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Caller-supplied variable lookup
pub trait VariableResolver {
    /// Value bound to `name`, or `None` when the name is not defined.
    ///
    /// A defined variable may still hold [`Value::Null`].
    fn resolve(&self, name: &str) -> Option<Value>;

    /// True when `name` is defined, whatever its value
    fn is_defined(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

impl<R: VariableResolver + ?Sized> VariableResolver for &R {
    fn resolve(&self, name: &str) -> Option<Value> {
        (**self).resolve(name)
    }

    fn is_defined(&self, name: &str) -> bool {
        (**self).is_defined(name)
    }
}

impl VariableResolver for HashMap<String, Value> {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn is_defined(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl VariableResolver for BTreeMap<String, Value> {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn is_defined(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl VariableResolver for serde_json::Map<String, serde_json::Value> {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().map(Value::from)
    }

    fn is_defined(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

/// Resolver with no variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyResolver;

impl VariableResolver for EmptyResolver {
    fn resolve(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Owned variable map, loadable from JSON or YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapResolver {
    variables: HashMap<String, Value>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a variable
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl From<HashMap<String, Value>> for MapResolver {
    fn from(variables: HashMap<String, Value>) -> Self {
        Self { variables }
    }
}

impl FromIterator<(String, Value)> for MapResolver {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            variables: iter.into_iter().collect(),
        }
    }
}

impl VariableResolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.variables.get(name).cloned()
    }

    fn is_defined(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }
}
