//! ruleguard parser - text to syntax tree for targeting rules
//!
//! This crate turns rule text such as `${country == 'US' && age > 18}` into a
//! [`SyntaxTree`](ruleguard_core::SyntaxTree). Parsing is pure: the same text
//! always yields the same tree.

pub mod delimiters;
pub mod error;
pub mod expression_parser;
pub mod lexer;

// Re-export main parser types
pub use delimiters::{is_blank, is_empty_rule, strip_delimiters};
pub use error::{ParseError, Result};
pub use expression_parser::ExpressionParser;
