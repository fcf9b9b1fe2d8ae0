//! Builder pattern for RuleValidator

use crate::config::{FunctionLibrary, ValidatorConfig};
use crate::validator::RuleValidator;
use ruleguard_runtime::{FunctionRegistry, NativeFunction};

/// Builder for RuleValidator
///
/// # Example
///
/// ```rust,ignore
/// use ruleguard_validator::RuleValidatorBuilder;
///
/// let validator = RuleValidatorBuilder::new()
///     .add_function("app:isBeta", Some(1), is_beta)
///     .build();
/// ```
pub struct RuleValidatorBuilder {
    functions: FunctionRegistry,
}

impl RuleValidatorBuilder {
    /// Create a new builder with the standard function library
    pub fn new() -> Self {
        Self {
            functions: FunctionRegistry::standard(),
        }
    }

    /// Create a builder for the function library named in `config`
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new().with_library(config.functions)
    }

    /// Replace the function library
    pub fn with_library(mut self, library: FunctionLibrary) -> Self {
        self.functions = match library {
            FunctionLibrary::Standard => FunctionRegistry::standard(),
            FunctionLibrary::None => FunctionRegistry::new(),
        };
        self
    }

    /// Replace the function registry
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Add a function rules may call as `name(args)`
    pub fn add_function(
        mut self,
        name: impl Into<String>,
        arity: Option<usize>,
        func: NativeFunction,
    ) -> Self {
        self.functions.register(name, arity, func);
        self
    }

    /// Build the validator
    pub fn build(self) -> RuleValidator {
        tracing::debug!(
            "Building rule validator with {} function(s)",
            self.functions.len()
        );
        RuleValidator::with_functions(self.functions)
    }
}

impl Default for RuleValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
