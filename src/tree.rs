use std::convert::TryFrom;

use crate::node::{NodeData, NodeId, NodeKind, Op};
use crate::parse::{self, ParseError};
use crate::source::SourceRange;

/// Arena-backed syntax tree: nodes are addressed by [`NodeId`] and carry
/// parent back-references, so chains can be climbed and flattened without
/// holding references into the tree. The tree owns its source text and is
/// immutable once built; rewriting happens through
/// [`Rewrite`](crate::rewrite::Rewrite) instead.
#[derive(Debug)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl SyntaxTree {
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn operator(&self, id: NodeId) -> Option<Op> {
        self.node(id).op
    }

    pub fn range(&self, id: NodeId) -> SourceRange {
        self.node(id).range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Source text covered by the node.
    pub fn text(&self, id: NodeId) -> &str {
        let range = self.range(id);
        &self.source[range.offset..range.end()]
    }

    /// Source text covered by an arbitrary range; `None` when the range
    /// falls outside the source or splits a UTF-8 character.
    pub(crate) fn slice(&self, range: SourceRange) -> Option<&str> {
        self.source.get(range.offset..range.end())
    }

    /// Depth-first pre-order walk of the subtree rooted at `from`.
    pub fn preorder(&self, from: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![from],
        }
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

impl TryFrom<&str> for SyntaxTree {
    type Error = ParseError;

    fn try_from(source: &str) -> Result<Self, ParseError> {
        parse::parse(source)
    }
}

/// Assembles a [`SyntaxTree`] bottom-up: children are allocated before
/// their parent, and allocating the parent wires the back-references. The
/// bundled parser is the main producer, but any front-end can feed trees
/// through this.
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder { nodes: Vec::new() }
    }

    pub fn node(&mut self, kind: NodeKind, range: SourceRange, children: Vec<NodeId>) -> NodeId {
        self.alloc(kind, None, range, children)
    }

    pub fn operator_node(
        &mut self,
        kind: NodeKind,
        op: Op,
        range: SourceRange,
        children: Vec<NodeId>,
    ) -> NodeId {
        self.alloc(kind, Some(op), range, children)
    }

    pub(crate) fn range(&self, id: NodeId) -> SourceRange {
        self.nodes[id.index()].range
    }

    pub fn finish(self, root: NodeId, source: impl Into<String>) -> SyntaxTree {
        SyntaxTree {
            source: source.into(),
            nodes: self.nodes,
            root,
        }
    }

    fn alloc(
        &mut self,
        kind: NodeKind,
        op: Option<Op>,
        range: SourceRange,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for &child in children.iter() {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(NodeData {
            kind,
            op,
            range,
            parent: None,
            children,
        });
        id
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder::new()
    }
}

pub struct Preorder<'tree> {
    tree: &'tree SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'tree> Iterator for Preorder<'tree> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(self.tree.children(next).iter().rev());
        Some(next)
    }
}
