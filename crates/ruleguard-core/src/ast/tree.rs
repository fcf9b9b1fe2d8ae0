//! Arena-backed syntax tree
//!
//! Nodes live in a flat `Vec` and refer to their children by [`NodeId`].
//! A child is always pushed before its parent, so the arena is acyclic by
//! construction and every traversal is read-only.

use super::node::{Node, NodeId};
use crate::error::{Result, TreeError};

/// Parsed representation of a rule
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    /// Root node id
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Root node
    pub fn root(&self) -> Result<&Node> {
        self.node(self.root)
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(TreeError::DanglingNode(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visit every node depth-first in pre-order.
    ///
    /// The first error returned by `visit` aborts the walk and is returned.
    pub fn walk<'a, E, F>(&'a self, mut visit: F) -> std::result::Result<(), E>
    where
        E: From<TreeError>,
        F: FnMut(&'a Node) -> std::result::Result<(), E>,
    {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            visit(node)?;
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(())
    }

    /// First node in pre-order matching `predicate`
    pub fn find<P>(&self, mut predicate: P) -> Result<Option<&Node>>
    where
        P: FnMut(&Node) -> bool,
    {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if predicate(node) {
                return Ok(Some(node));
            }
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(None)
    }

    /// Every node without children, in source order
    pub fn leaves(&self) -> Result<Vec<&Node>> {
        let mut leaves = Vec::new();
        self.walk::<TreeError, _>(|node| {
            if node.is_leaf() {
                leaves.push(node);
            }
            Ok(())
        })?;
        Ok(leaves)
    }
}

/// Incremental builder used by parsers
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node whose children have already been pushed
    pub fn push(&mut self, node: Node) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());
        if let Some(child) = node.children.iter().find(|child| child.0 >= id.0) {
            return Err(TreeError::DanglingNode(*child));
        }
        self.nodes.push(node);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(TreeError::DanglingNode(id))
    }

    /// Finish the tree rooted at `root`
    pub fn finish(self, root: NodeId) -> Result<SyntaxTree> {
        if self.nodes.is_empty() {
            return Err(TreeError::MissingRoot);
        }
        if root.0 >= self.nodes.len() {
            return Err(TreeError::DanglingNode(root));
        }
        Ok(SyntaxTree {
            nodes: self.nodes,
            root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompareOp, LiteralKind, NodeKind, Span};

    // country == 'US'
    fn comparison_tree() -> SyntaxTree {
        let mut builder = TreeBuilder::new();
        let left = builder
            .push(Node::new(NodeKind::Identifier, Span::new(0, 7)).with_image("country"))
            .unwrap();
        let right = builder
            .push(
                Node::new(NodeKind::Literal(LiteralKind::String), Span::new(11, 15))
                    .with_image("'US'"),
            )
            .unwrap();
        let root = builder
            .push(
                Node::new(NodeKind::Compare(CompareOp::Eq), Span::new(0, 15))
                    .with_children(vec![left, right]),
            )
            .unwrap();
        builder.finish(root).unwrap()
    }

    #[test]
    fn test_walk_visits_preorder() {
        let tree = comparison_tree();
        let mut kinds = Vec::new();
        tree.walk::<TreeError, _>(|node| {
            kinds.push(node.kind);
            Ok(())
        })
        .unwrap();

        assert_eq!(
            kinds,
            vec![
                NodeKind::Compare(CompareOp::Eq),
                NodeKind::Identifier,
                NodeKind::Literal(LiteralKind::String),
            ]
        );
    }

    #[test]
    fn test_walk_aborts_on_error() {
        #[derive(Debug, PartialEq)]
        enum Stop {
            At(NodeKind),
            Tree,
        }
        impl From<TreeError> for Stop {
            fn from(_: TreeError) -> Self {
                Stop::Tree
            }
        }

        let tree = comparison_tree();
        let mut visited = 0;
        let result = tree.walk(|node| {
            visited += 1;
            if node.kind == NodeKind::Identifier {
                return Err(Stop::At(node.kind));
            }
            Ok(())
        });

        assert_eq!(result, Err(Stop::At(NodeKind::Identifier)));
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_find_and_leaves() -> anyhow::Result<()> {
        let tree = comparison_tree();

        let ident = tree
            .find(|node| node.kind.is_identifier())?
            .ok_or_else(|| anyhow::anyhow!("no identifier in tree"))?;
        assert_eq!(ident.image(), Some("country"));

        let images: Vec<_> = tree
            .leaves()?
            .into_iter()
            .filter_map(|node| node.image())
            .collect();
        assert_eq!(images, vec!["country", "'US'"]);
        Ok(())
    }

    #[test]
    fn test_builder_rejects_forward_child() {
        let mut builder = TreeBuilder::new();
        let result =
            builder.push(Node::new(NodeKind::Not, Span::default()).with_children(vec![NodeId(3)]));
        assert_eq!(result, Err(TreeError::DanglingNode(NodeId(3))));
    }

    #[test]
    fn test_builder_requires_root() {
        assert_eq!(TreeBuilder::new().finish(NodeId(0)), Err(TreeError::MissingRoot));
    }
}
