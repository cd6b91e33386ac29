//! Fragment construction: full-subtree fragments and source-range
//! resolution. Range resolution classifies the range against the tree
//! first, then tries three interpretations in order: exactly one node
//! (modulo whitespace), an empty range inside a node, and a slice of an
//! associative operator chain.

use log::debug;

use crate::node::NodeId;
use crate::selection;
use crate::source::SourceRange;
use crate::tree::SyntaxTree;

use super::chain::ChainFragment;
use super::{includes_non_whitespace_outside, Fragment, SimpleFragment};

impl<'tree> Fragment<'tree> {
    /// The fragment standing for the whole subtree at `node`: a chain
    /// fragment when `node` is part of an associative operator chain,
    /// otherwise a simple fragment. Total, every node has one.
    pub fn for_full_subtree(tree: &'tree SyntaxTree, node: NodeId) -> Fragment<'tree> {
        match ChainFragment::for_full_chain(tree, node) {
            Some(chain) => Fragment::Chain(chain),
            None => Fragment::Simple(SimpleFragment::new(tree, node)),
        }
    }

    /// Resolve a byte range against the tree. Returns `None` when the
    /// range is out of bounds, splits a multi-byte character, or does not
    /// line up with anything the tree can name: a single node, a position
    /// inside a node, or an operand slice of an associative chain.
    pub fn for_source_range(tree: &'tree SyntaxTree, range: SourceRange) -> Option<Fragment<'tree>> {
        tree.slice(range)?;
        let analysis = selection::analyze(tree, tree.root(), range);

        if let Some(&node) = analysis.selected.first() {
            let exact = analysis.selected.len() == 1
                && !includes_non_whitespace_outside(tree, range, tree.range(node));
            if exact {
                debug!(
                    "range {}..{} selects a whole node: {:?}",
                    range.offset,
                    range.end(),
                    tree.kind(node)
                );
                return Some(Fragment::for_full_subtree(tree, node));
            }
        }

        let covering = analysis.covering?;
        if range.is_empty() && analysis.selected.is_empty() {
            // a bare position stands for the innermost node around it
            return Some(Fragment::for_full_subtree(tree, covering));
        }

        let chain = ChainFragment::sub_slice_for_range(tree, covering, range)?;
        debug!(
            "range {}..{} selects {} operands of a chain",
            range.offset,
            range.end(),
            chain.operands().len()
        );
        Some(Fragment::Chain(chain))
    }
}
