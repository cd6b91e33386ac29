//! Classifies a source range against a scope subtree: which topmost nodes
//! the range fully covers, and which node most tightly contains it. The
//! fragment factory drives its range resolution off this analysis.

use crate::node::NodeId;
use crate::source::SourceRange;
use crate::tree::SyntaxTree;

#[derive(Debug, Default)]
pub(crate) struct SelectionAnalysis {
    /// Topmost nodes fully covered by the selection. Only nodes sharing a
    /// parent with the first covered node are collected, so the list is
    /// always a run of siblings.
    pub(crate) selected: Vec<NodeId>,
    /// Innermost node properly containing the selection.
    pub(crate) covering: Option<NodeId>,
}

pub(crate) fn analyze(tree: &SyntaxTree, scope: NodeId, selection: SourceRange) -> SelectionAnalysis {
    let mut analysis = SelectionAnalysis::default();
    visit(tree, scope, selection, &mut analysis);
    analysis
}

fn visit(tree: &SyntaxTree, node: NodeId, selection: SourceRange, out: &mut SelectionAnalysis) {
    let range = tree.range(node);
    if selection.end() < range.offset || range.end() < selection.offset {
        return;
    }
    if selection.covers(range) {
        let keep = match out.selected.first() {
            None => true,
            Some(&first) => tree.parent(first) == tree.parent(node),
        };
        if keep {
            out.selected.push(node);
        }
        return;
    }
    if range.covers(selection) {
        out.covering = Some(node);
        for &child in tree.children(node) {
            visit(tree, child, selection, out);
        }
        return;
    }
    if range.offset < selection.end() && selection.end() < range.end() {
        // the selection starts before this node and ends inside it; there
        // is no covered subnode worth reporting
        return;
    }
    for &child in tree.children(node) {
        visit(tree, child, selection, out);
    }
}
