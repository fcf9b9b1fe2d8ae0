//! Expression factory and compiled expressions
//!
//! [`ExpressionFactory::compile`] parses rule text once and checks every
//! function reference against the factory's registry. The resulting
//! [`CompiledExpression`] can be evaluated any number of times against
//! different resolvers.

use crate::error::{Result, RuntimeError};
use crate::evaluator::Evaluator;
use crate::functions::FunctionRegistry;
use crate::operators::{to_bool, to_number};
use crate::resolver::VariableResolver;
use ruleguard_core::{NodeKind, SyntaxTree, Value};
use ruleguard_parser::ExpressionParser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Type an expression result is coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Boolean,
    Number,
    String,
    #[default]
    Any,
}

impl ResultType {
    /// Coerce an evaluation result
    pub fn coerce(self, value: Value) -> Result<Value> {
        match self {
            ResultType::Any => Ok(value),
            ResultType::Boolean => to_bool(&value).map(Value::Bool),
            ResultType::Number => match value {
                Value::Null => Ok(Value::Number(0.0)),
                other => to_number(&other).map(Value::Number),
            },
            ResultType::String => Ok(Value::String(value.to_string())),
        }
    }
}

/// Compiles rule text against a function registry
#[derive(Debug, Clone)]
pub struct ExpressionFactory {
    functions: Arc<FunctionRegistry>,
}

impl Default for ExpressionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionFactory {
    /// Factory with the standard `fn:` library
    pub fn new() -> Self {
        Self::with_functions(FunctionRegistry::standard())
    }

    pub fn with_functions(functions: FunctionRegistry) -> Self {
        Self {
            functions: Arc::new(functions),
        }
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Parse `text` and resolve its function references
    pub fn compile(&self, text: &str, result_type: ResultType) -> Result<CompiledExpression> {
        let tree = ExpressionParser::parse(text)?;

        let mut unknown = None;
        tree.walk(|node| {
            if node.kind == NodeKind::Function && unknown.is_none() {
                let name = node.image().unwrap_or_default();
                if !self.functions.contains(name) {
                    unknown = Some(name.to_string());
                }
            }
            Ok::<(), RuntimeError>(())
        })?;
        if let Some(name) = unknown {
            tracing::debug!("Rule {} references unknown function {}", text, name);
            return Err(RuntimeError::UnknownFunction(name));
        }

        tracing::trace!("Compiled {} into {} node(s)", text, tree.len());
        Ok(CompiledExpression {
            text: text.to_string(),
            tree,
            result_type,
            functions: Arc::clone(&self.functions),
        })
    }
}

/// A parsed expression bound to a function registry
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    text: String,
    tree: SyntaxTree,
    result_type: ResultType,
    functions: Arc<FunctionRegistry>,
}

impl CompiledExpression {
    /// Source text as given to [`ExpressionFactory::compile`]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn result_type(&self) -> ResultType {
        self.result_type
    }

    /// Evaluate against `resolver`, coercing to the declared result type
    pub fn evaluate(&self, resolver: &dyn VariableResolver) -> Result<Value> {
        let value = Evaluator::new(&self.tree, &self.functions, resolver).evaluate()?;
        self.result_type.coerce(value)
    }

    /// Evaluate as [`evaluate`](Self::evaluate) does, then read the result as a boolean
    pub fn evaluate_bool(&self, resolver: &dyn VariableResolver) -> Result<bool> {
        match self.evaluate(resolver)? {
            Value::Bool(value) => Ok(value),
            other => to_bool(&other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{EmptyResolver, MapResolver};

    #[test]
    fn test_compile_checks_functions() {
        let factory = ExpressionFactory::new();
        assert!(factory.compile("${fn:trim(x)}", ResultType::Any).is_ok());
        assert_eq!(
            factory.compile("${fn:missing(x)}", ResultType::Any).err(),
            Some(RuntimeError::UnknownFunction("fn:missing".to_string()))
        );
    }

    #[test]
    fn test_compile_does_not_resolve_identifiers() {
        let factory = ExpressionFactory::with_functions(FunctionRegistry::new());
        let compiled = factory.compile("${anything > 1}", ResultType::Boolean).unwrap();
        assert_eq!(compiled.text(), "${anything > 1}");
        assert_eq!(
            compiled.evaluate(&EmptyResolver),
            Err(RuntimeError::UnknownIdentifier("anything".to_string()))
        );
    }

    #[test]
    fn test_result_type_coercion() {
        let factory = ExpressionFactory::new();
        let resolver = MapResolver::new().with("flag", "TRUE").with("n", "42");

        let as_bool = factory.compile("${flag}", ResultType::Boolean).unwrap();
        assert_eq!(as_bool.evaluate(&resolver).unwrap(), Value::Bool(true));

        let as_number = factory.compile("${n}", ResultType::Number).unwrap();
        assert_eq!(as_number.evaluate(&resolver).unwrap(), Value::Number(42.0));

        let as_string = factory.compile("${1 + 1}", ResultType::String).unwrap();
        assert_eq!(as_string.evaluate(&resolver).unwrap(), Value::from("2"));
    }

    #[test]
    fn test_boolean_coercion_failure() {
        let factory = ExpressionFactory::new();
        let compiled = factory.compile("${[1, 2]}", ResultType::Boolean).unwrap();
        assert!(matches!(
            compiled.evaluate(&EmptyResolver),
            Err(RuntimeError::Coercion { .. })
        ));
    }

    #[test]
    fn test_reuse_across_resolvers() {
        let compiled = ExpressionFactory::new()
            .compile("${country == 'US'}", ResultType::Boolean)
            .unwrap();
        let us = MapResolver::new().with("country", "US");
        let fr = MapResolver::new().with("country", "FR");
        assert!(compiled.evaluate_bool(&us).unwrap());
        assert!(!compiled.evaluate_bool(&fr).unwrap());
    }

    #[test]
    fn test_evaluate_bool_applies_result_type() {
        let factory = ExpressionFactory::new();
        let resolver = MapResolver::new().with("flag", "TRUE");

        let as_bool = factory.compile("${flag}", ResultType::Boolean).unwrap();
        assert!(as_bool.evaluate_bool(&resolver).unwrap());

        // the declared number coercion runs first and rejects the string
        let as_number = factory.compile("${flag}", ResultType::Number).unwrap();
        assert!(as_number.evaluate_bool(&resolver).is_err());
    }
}
