//! Configuration types for RuleValidator

use crate::error::ConfigError;
use crate::validator::ValidationContext;
use ruleguard_runtime::MapResolver;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Function library available to rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionLibrary {
    /// The `fn:` string library
    #[default]
    Standard,
    /// No functions; any function reference is a syntax error
    None,
}

/// Validator configuration
///
/// ```yaml
/// evaluate: true
/// absent_identifiers: [age]
/// functions: standard
/// context:
///   country: US
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Evaluate rules against `context` after the structural checks
    pub evaluate: bool,

    /// Identifiers that may be missing from `context`
    pub absent_identifiers: HashSet<String>,

    /// Variables rules are evaluated against
    pub context: MapResolver,

    /// Function library
    pub functions: FunctionLibrary,
}

impl ValidatorConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self {
            evaluate: true,
            absent_identifiers: HashSet::new(),
            context: MapResolver::new(),
            functions: FunctionLibrary::Standard,
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.json` file, or YAML for any other extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Enable or disable evaluation
    pub fn with_evaluate(mut self, evaluate: bool) -> Self {
        self.evaluate = evaluate;
        self
    }

    /// Declare an identifier as possibly absent
    pub fn with_absent_identifier(mut self, name: impl Into<String>) -> Self {
        self.absent_identifiers.insert(name.into());
        self
    }

    /// Set the evaluation context
    pub fn with_context(mut self, context: MapResolver) -> Self {
        self.context = context;
        self
    }

    /// Set the function library
    pub fn with_functions(mut self, functions: FunctionLibrary) -> Self {
        self.functions = functions;
        self
    }

    /// Validation context borrowing this configuration
    pub fn validation_context(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.context)
            .with_absent(&self.absent_identifiers)
            .with_evaluate(self.evaluate)
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::new()
    }
}
