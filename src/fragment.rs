//! Fragments address a portion of source code backed by the syntax tree:
//! either one whole subtree, or a contiguous slice of an associative
//! operator chain that no single node spans. Construction goes through
//! [`Fragment::for_full_subtree`] and [`Fragment::for_source_range`];
//! fragments compare by object identity, while [`Fragment::matches`]
//! compares structure.

mod chain;
mod factory;
mod finder;

use std::fmt;

use crate::matcher::{AstMatcher, NodeMatcher};
use crate::node::NodeId;
use crate::rewrite::{Rewrite, RewriteError, RewriteNode};
use crate::source::SourceRange;
use crate::tree::SyntaxTree;

pub use self::chain::ChainFragment;
pub use self::finder::{find_matching_fragments, find_matching_fragments_with};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<'tree> {
    Simple(SimpleFragment<'tree>),
    Chain(ChainFragment<'tree>),
}

impl<'tree> Fragment<'tree> {
    pub fn tree(&self) -> &'tree SyntaxTree {
        match self {
            Fragment::Simple(fragment) => fragment.tree(),
            Fragment::Chain(fragment) => fragment.tree(),
        }
    }

    /// The node backing this fragment: the node itself for a simple
    /// fragment, the chain's group root for a chain fragment.
    pub fn associated_node(&self) -> NodeId {
        match self {
            Fragment::Simple(fragment) => fragment.node(),
            Fragment::Chain(fragment) => fragment.group_root(),
        }
    }

    pub fn range(&self) -> SourceRange {
        match self {
            Fragment::Simple(fragment) => fragment.tree().range(fragment.node()),
            Fragment::Chain(fragment) => fragment.range(),
        }
    }

    pub fn start_byte(&self) -> usize {
        self.range().offset
    }

    pub fn end_byte(&self) -> usize {
        self.range().end()
    }

    pub fn text(&self) -> &'tree str {
        match self {
            Fragment::Simple(fragment) => fragment.text(),
            Fragment::Chain(fragment) => fragment.text(),
        }
    }

    pub fn is_expression(&self) -> bool {
        match self {
            Fragment::Simple(fragment) => fragment.tree().kind(fragment.node()).is_expression(),
            Fragment::Chain(_) => true,
        }
    }

    /// Structural equivalence under the default matcher. Fragments of
    /// different variants never match, whatever their text.
    pub fn matches(&self, other: &Fragment<'_>) -> bool {
        self.matches_with(other, &AstMatcher)
    }

    pub fn matches_with<M: NodeMatcher>(&self, other: &Fragment<'_>, matcher: &M) -> bool {
        match (self, other) {
            (Fragment::Simple(l), Fragment::Simple(r)) => l.matches_with(r, matcher),
            (Fragment::Chain(l), Fragment::Chain(r)) => l.matches_with(r, matcher),
            _ => false,
        }
    }

    /// Every fragment under this fragment's associated node that matches
    /// `pattern`, including this fragment itself when it does.
    pub fn sub_fragments_matching(&self, pattern: &Fragment<'_>) -> Vec<Fragment<'tree>> {
        find_matching_fragments(self.tree(), self.associated_node(), pattern)
    }

    /// Record replacement of this fragment with `replacement`.
    pub fn replace(&self, rewrite: &mut Rewrite<'tree>, replacement: RewriteNode) {
        debug_assert!(std::ptr::eq(self.tree(), rewrite.tree()));
        match self {
            Fragment::Simple(fragment) => rewrite.replace(fragment.node(), replacement),
            Fragment::Chain(fragment) => fragment.replace(rewrite, replacement),
        }
    }

    /// A rewrite node reproducing this fragment, for insertion elsewhere.
    /// Only expression fragments can be copied.
    pub fn create_copy_target(
        &self,
        rewrite: &mut Rewrite<'tree>,
    ) -> Result<RewriteNode, RewriteError> {
        match self {
            Fragment::Simple(fragment) => fragment.create_copy_target(rewrite),
            Fragment::Chain(fragment) => Ok(fragment.create_copy_target(rewrite)),
        }
    }
}

#[derive(Clone)]
pub struct SimpleFragment<'tree> {
    tree: &'tree SyntaxTree,
    node: NodeId,
}

impl<'tree> SimpleFragment<'tree> {
    pub(crate) fn new(tree: &'tree SyntaxTree, node: NodeId) -> Self {
        SimpleFragment { tree, node }
    }

    pub fn tree(&self) -> &'tree SyntaxTree {
        self.tree
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn text(&self) -> &'tree str {
        self.tree.text(self.node)
    }

    pub(crate) fn matches_with<M: NodeMatcher>(
        &self,
        other: &SimpleFragment<'_>,
        matcher: &M,
    ) -> bool {
        matcher.nodes_match(self.tree, self.node, other.tree, other.node)
    }

    pub(crate) fn create_copy_target(
        &self,
        rewrite: &mut Rewrite<'tree>,
    ) -> Result<RewriteNode, RewriteError> {
        let kind = self.tree.kind(self.node);
        if !kind.is_expression() {
            return Err(RewriteError::NotAnExpression { kind });
        }
        Ok(rewrite.create_copy(self.node))
    }
}

impl PartialEq for SimpleFragment<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.node == other.node
    }
}

impl Eq for SimpleFragment<'_> {}

impl fmt::Debug for SimpleFragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleFragment")
            .field("node", &self.node)
            .field("text", &self.text())
            .finish()
    }
}

/// Non-whitespace source text inside `selection` but outside `inner`
/// disqualifies a selection from standing for the node(s) spanning `inner`.
pub(crate) fn includes_non_whitespace_outside(
    tree: &SyntaxTree,
    selection: SourceRange,
    inner: SourceRange,
) -> bool {
    if !selection.covers(inner) {
        return false;
    }
    let source = tree.source();
    let before = &source[selection.offset..inner.offset];
    let after = &source[inner.end()..selection.end()];
    !before.trim().is_empty() || !after.trim().is_empty()
}
