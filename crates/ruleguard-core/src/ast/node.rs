//! Syntax tree nodes

use super::operator::{ArithmeticOp, CompareOp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node inside its [`SyntaxTree`](super::SyntaxTree) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Byte range of a node in the original rule text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Literal flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    Null,
}

/// Closed set of syntax tree node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Variable reference, image is the name
    Identifier,
    /// Literal value, image is the source text
    Literal(LiteralKind),
    /// `a == b`, `a < b`, ...
    Compare(CompareOp),
    /// `a && b && ...`: one child per operand
    And,
    /// `a || b || ...`: one child per operand
    Or,
    /// `!a`, `not a`
    Not,
    /// `-a`
    Negate,
    /// `empty a`
    Empty,
    /// `a + b`, `a * b`, ...
    Arithmetic(ArithmeticOp),
    /// `cond ? a : b`
    Ternary,
    /// `a.b`: children are the target and a `Member`
    Property,
    /// Name after a `.`, image is the name
    Member,
    /// `a[b]`
    Index,
    /// `a.b(args)`: children are the target, a `Member` and `Arguments`
    MethodCall,
    /// `ns:name(args)`: image is the qualified name, children are the arguments
    Function,
    /// Argument list of a method call
    Arguments,
    /// `[a, b, c]`
    List,
    /// `a = b`
    Assign,
    /// `a += b`
    Concatenation,
    /// `x -> body`: children are `LambdaParameters` and the body
    Arrow,
    /// Parameter identifiers of a lambda
    LambdaParameters,
}

/// Constructs the expression grammar accepts but targeting rules must not use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Construct {
    Assignment,
    Concatenation,
    Arrow,
}

impl Construct {
    /// The operator the author typed
    pub fn operator(&self) -> &'static str {
        match self {
            Construct::Assignment => "=",
            Construct::Concatenation => "+=",
            Construct::Arrow => "->",
        }
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Assignment => f.write_str("assignment"),
            Construct::Concatenation => f.write_str("concatenation"),
            Construct::Arrow => f.write_str("arrow"),
        }
    }
}

impl NodeKind {
    /// Returns the disallowed construct this kind represents, if any
    pub fn disallowed_construct(&self) -> Option<Construct> {
        match self {
            NodeKind::Assign => Some(Construct::Assignment),
            NodeKind::Concatenation => Some(Construct::Concatenation),
            NodeKind::Arrow => Some(Construct::Arrow),
            _ => None,
        }
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, NodeKind::Identifier)
    }
}

/// A node in the syntax tree arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Source text for leaves and named nodes
    pub image: Option<String>,
    pub span: Span,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            image: None,
            span,
            children: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_children(mut self, children: Vec<NodeId>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disallowed_constructs() {
        assert_eq!(NodeKind::Assign.disallowed_construct(), Some(Construct::Assignment));
        assert_eq!(
            NodeKind::Concatenation.disallowed_construct(),
            Some(Construct::Concatenation)
        );
        assert_eq!(NodeKind::Arrow.disallowed_construct(), Some(Construct::Arrow));
        assert_eq!(NodeKind::Identifier.disallowed_construct(), None);
        assert_eq!(
            NodeKind::Compare(CompareOp::Eq).disallowed_construct(),
            None
        );
    }

    #[test]
    fn test_construct_display() {
        assert_eq!(Construct::Assignment.to_string(), "assignment");
        assert_eq!(Construct::Arrow.operator(), "->");
    }

    #[test]
    fn test_node_leaf() {
        let leaf = Node::new(NodeKind::Identifier, Span::new(0, 3)).with_image("age");
        assert!(leaf.is_leaf());
        assert_eq!(leaf.image(), Some("age"));

        let parent = Node::new(NodeKind::Not, Span::new(0, 4)).with_children(vec![NodeId(0)]);
        assert!(!parent.is_leaf());
    }

    #[test]
    fn test_span_join() {
        assert_eq!(Span::new(4, 6).join(Span::new(0, 2)), Span::new(0, 6));
    }
}
