//! ruleguard runtime - compilation and evaluation of rule expressions
//!
//! This crate provides the expression capability the rule validator builds on:
//! compiling rule text against a function library and evaluating the compiled
//! expression against caller-supplied variables.

pub mod error;
pub mod evaluator;
pub mod expression;
pub mod functions;
pub(crate) mod operators;
pub mod resolver;

// Re-export main types
pub use error::{Result, RuntimeError};
pub use evaluator::Evaluator;
pub use expression::{CompiledExpression, ExpressionFactory, ResultType};
pub use functions::{FunctionDef, FunctionRegistry, NativeFunction};
pub use operators::{to_bool, to_number};
pub use resolver::{EmptyResolver, MapResolver, VariableResolver};

// Re-export commonly used types from dependencies
pub use ruleguard_core::{SyntaxTree, Value};
