//! Error types for ruleguard core

use crate::ast::NodeId;
use thiserror::Error;

/// Faults in syntax tree bookkeeping.
///
/// These never describe a problem with a rule's text; they signal a defect in
/// whatever built or walked the tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node {0} is not part of the syntax tree")]
    DanglingNode(NodeId),

    #[error("Syntax tree has no root node")]
    MissingRoot,
}

pub type Result<T> = std::result::Result<T, TreeError>;
