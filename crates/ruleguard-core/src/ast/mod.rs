//! Syntax tree definitions for rule expressions
//!
//! This module contains:
//! - Node kinds and nodes
//! - Comparison and arithmetic operators
//! - The arena-backed tree and its builder

pub mod node;
pub mod operator;
pub mod tree;

pub use node::{Construct, LiteralKind, Node, NodeId, NodeKind, Span};
pub use operator::{ArithmeticOp, CompareOp};
pub use tree::{SyntaxTree, TreeBuilder};
