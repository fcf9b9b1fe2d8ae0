//! ruleguard core - types shared across the ruleguard crates
//!
//! This crate provides:
//! - Value types for runtime data
//! - The syntax tree produced by the rule expression parser
//! - Error types for tree bookkeeping

pub mod ast;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use ast::{
    ArithmeticOp, CompareOp, Construct, LiteralKind, Node, NodeId, NodeKind, Span, SyntaxTree,
    TreeBuilder,
};
pub use error::TreeError;
pub use types::Value;
