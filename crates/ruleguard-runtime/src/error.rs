//! Runtime error types

use ruleguard_core::TreeError;
use ruleguard_parser::ParseError;
use thiserror::Error;

/// Runtime error
///
/// Covers both compile-time failures (`Parse`, `UnknownFunction`) and
/// failures raised while evaluating a compiled expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Expression text does not parse
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Function reference with no registered implementation
    #[error("Function '{0}' is not defined")]
    UnknownFunction(String),

    /// Identifier the resolver cannot resolve
    #[error("Identifier '{0}' cannot be resolved")]
    UnknownIdentifier(String),

    /// Null operand for an operator that needs a value
    #[error("Cannot apply '{op}' to null")]
    NullOperand { op: String },

    /// Value cannot be coerced to the requested type
    #[error("Cannot coerce {value_type} '{value}' to {target}")]
    Coercion {
        value: String,
        value_type: &'static str,
        target: &'static str,
    },

    /// Type error
    #[error("Type error: {0}")]
    TypeError(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Property access on a value without that property
    #[error("Property '{property}' not found on {type_name}")]
    PropertyNotFound {
        property: String,
        type_name: &'static str,
    },

    /// Method call on a value without that method
    #[error("Method '{method}' not found on {type_name}")]
    MethodNotFound {
        method: String,
        type_name: &'static str,
    },

    /// Function or method called with the wrong number of arguments
    #[error("'{name}' expects {expected} argument(s), got {actual}")]
    Arity {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Construct that cannot be executed against a read-only context
    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    /// Syntax tree bookkeeping fault
    #[error("Syntax tree error: {0}")]
    Tree(#[from] TreeError),
}

impl RuntimeError {
    /// True for failures raised before evaluation starts
    pub fn is_compile_error(&self) -> bool {
        matches!(self, RuntimeError::Parse(_) | RuntimeError::UnknownFunction(_))
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
