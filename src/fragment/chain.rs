//! Chain fragments represent a contiguous slice of the operand list of a
//! maximal associative operator chain. `a + b + c + d` parses to a
//! left-nested tree, but refactorings need to treat it as the flat list
//! `[a, b, c, d]` and address slices like `[b, c]` that no node spans.

use std::fmt;

use itertools::Itertools;

use crate::matcher::NodeMatcher;
use crate::node::{NodeId, NodeKind, Op};
use crate::rewrite::{Rewrite, RewriteNode};
use crate::source::SourceRange;
use crate::tree::SyntaxTree;

use super::includes_non_whitespace_outside;

#[derive(Clone)]
pub struct ChainFragment<'tree> {
    tree: &'tree SyntaxTree,
    root: NodeId,
    op: Op,
    /// The slice of the chain's operand list this fragment stands for,
    /// in source order. Always at least two operands.
    operands: Vec<NodeId>,
    /// Index of `operands[0]` within the full operand list.
    first: usize,
}

impl<'tree> ChainFragment<'tree> {
    /// The whole chain around `node`, or `None` when `node` is not an
    /// infix expression with an associative operator. Interior nodes of a
    /// larger same-operator run resolve to the run's group root.
    pub(crate) fn for_full_chain(tree: &'tree SyntaxTree, node: NodeId) -> Option<Self> {
        let op = associative_operator(tree, node)?;
        let root = chain_root(tree, node, op);
        let operands = flatten(tree, root, op);
        if operands.len() < 2 {
            return None;
        }
        Some(ChainFragment {
            tree,
            root,
            op,
            operands,
            first: 0,
        })
    }

    /// The slice of the chain around `node` selected by `range`, walking
    /// the inter-operand gaps. Fails when the range boundaries do not fall
    /// on operand boundaries (modulo whitespace), or select fewer than two
    /// operands.
    pub(crate) fn sub_slice_for_range(
        tree: &'tree SyntaxTree,
        node: NodeId,
        range: SourceRange,
    ) -> Option<Self> {
        let op = associative_operator(tree, node)?;
        let root = chain_root(tree, node, op);
        let group = flatten(tree, root, op);
        if group.len() < 2 {
            return None;
        }
        let (first, operands) = sub_group_for_range(tree, &group, range)?;
        if operands.len() < 2 {
            return None;
        }
        if includes_non_whitespace_outside(tree, range, operand_span(tree, &operands)) {
            return None;
        }
        Some(ChainFragment {
            tree,
            root,
            op,
            operands,
            first,
        })
    }

    pub fn tree(&self) -> &'tree SyntaxTree {
        self.tree
    }

    /// Topmost infix node of the chain; the node all edits target.
    pub fn group_root(&self) -> NodeId {
        self.root
    }

    pub fn operator(&self) -> Op {
        self.op
    }

    pub fn operands(&self) -> &[NodeId] {
        &self.operands
    }

    pub fn range(&self) -> SourceRange {
        operand_span(self.tree, &self.operands)
    }

    pub fn text(&self) -> &'tree str {
        let span = self.range();
        &self.tree.source()[span.offset..span.end()]
    }

    pub(crate) fn matches_with<M: NodeMatcher>(
        &self,
        other: &ChainFragment<'_>,
        matcher: &M,
    ) -> bool {
        self.op == other.op
            && self.operands.len() == other.operands.len()
            && self
                .operands
                .iter()
                .zip(other.operands.iter())
                .all(|(&l, &r)| matcher.nodes_match(self.tree, l, other.tree, r))
    }

    /// Slide a window as wide as `pattern` over this fragment's operands;
    /// every pairwise-matching window yields a fragment over the same
    /// group root. Naive scan and deliberately so.
    pub(crate) fn matching_windows<M: NodeMatcher>(
        &self,
        pattern: &ChainFragment<'_>,
        matcher: &M,
    ) -> Vec<ChainFragment<'tree>> {
        if self.op != pattern.op {
            return Vec::new();
        }
        let width = pattern.operands.len();
        let mut found = Vec::new();
        for (at, window) in self.operands.windows(width).enumerate() {
            let matched = window
                .iter()
                .zip(pattern.operands.iter())
                .all(|(&l, &r)| matcher.nodes_match(self.tree, l, pattern.tree, r));
            if matched {
                found.push(ChainFragment {
                    tree: self.tree,
                    root: self.root,
                    op: self.op,
                    operands: window.to_vec(),
                    first: self.first + at,
                });
            }
        }
        found
    }

    /// Record replacement of this slice with `replacement`. A slice
    /// covering the whole chain replaces the group root directly; the
    /// edges of a partial slice lie on no node boundary, so the whole
    /// chain is rebuilt from copies of the unaffected operands and the
    /// group root is replaced with the rebuilt chain.
    pub(crate) fn replace(&self, rewrite: &mut Rewrite<'tree>, replacement: RewriteNode) {
        let group = flatten(self.tree, self.root, self.op);
        if group.len() == self.operands.len() {
            rewrite.replace(self.root, replacement);
            return;
        }
        let after_slice = self.first + self.operands.len();
        let mut operands = Vec::with_capacity(group.len() - self.operands.len() + 1);
        for (at, &operand) in group.iter().enumerate() {
            if at == self.first {
                operands.push(replacement);
            } else if at < self.first || at >= after_slice {
                operands.push(rewrite.create_copy(operand));
            }
        }
        let rebuilt = rewrite.new_infix(self.op, operands);
        rewrite.replace(self.root, rebuilt);
    }

    /// A rewrite node reproducing this slice: a structural copy of the
    /// group root for a whole chain, otherwise an opaque placeholder
    /// carrying the slice text verbatim.
    pub(crate) fn create_copy_target(&self, rewrite: &mut Rewrite<'tree>) -> RewriteNode {
        let group = flatten(self.tree, self.root, self.op);
        if group.len() == self.operands.len() {
            rewrite.create_copy(self.root)
        } else {
            rewrite.create_placeholder(self.text())
        }
    }
}

impl PartialEq for ChainFragment<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && self.root == other.root
            && self.operands == other.operands
    }
}

impl Eq for ChainFragment<'_> {}

impl fmt::Debug for ChainFragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainFragment")
            .field("root", &self.root)
            .field("operands", &self.operands)
            .field("first", &self.first)
            .field("text", &self.text())
            .finish()
    }
}

pub(crate) fn associative_operator(tree: &SyntaxTree, node: NodeId) -> Option<Op> {
    if tree.kind(node) != NodeKind::Infix {
        return None;
    }
    tree.operator(node).filter(|op| op.is_associative())
}

/// Topmost node of the same-operator run containing `node`.
fn chain_root(tree: &SyntaxTree, node: NodeId, op: Op) -> NodeId {
    let mut root = node;
    while let Some(parent) = tree.parent(root) {
        if tree.kind(parent) == NodeKind::Infix && tree.operator(parent) == Some(op) {
            root = parent;
        } else {
            break;
        }
    }
    root
}

/// Operand list of the chain rooted at `root`, in source order: child
/// infix nodes with the same operator are descended into, everything else
/// is an operand. Recomputed from the tree on every use, never cached.
pub(crate) fn flatten(tree: &SyntaxTree, root: NodeId, op: Op) -> Vec<NodeId> {
    let mut operands = Vec::new();
    collect_operands(tree, root, op, &mut operands);
    operands
}

fn collect_operands(tree: &SyntaxTree, node: NodeId, op: Op, out: &mut Vec<NodeId>) {
    for &child in tree.children(node) {
        if tree.kind(child) == NodeKind::Infix && tree.operator(child) == Some(op) {
            collect_operands(tree, child, op, out);
        } else {
            out.push(child);
        }
    }
}

fn operand_span(tree: &SyntaxTree, operands: &[NodeId]) -> SourceRange {
    let first = tree.range(operands[0]);
    let last = tree.range(operands[operands.len() - 1]);
    first.cover(last)
}

/// Walk the operand gaps accumulating the operands `range` selects. The
/// walk enters at the first operand whose leading gap (or exact start)
/// contains `range.offset` and exits at the gap containing `range.end()`,
/// or at the exact end of the last operand.
fn sub_group_for_range(
    tree: &SyntaxTree,
    group: &[NodeId],
    range: SourceRange,
) -> Option<(usize, Vec<NodeId>)> {
    let mut operands = Vec::new();
    let mut first = 0;
    let mut entered = range.offset == tree.range(group[0]).offset;
    let mut exited = false;
    for (at, (&member, &next)) in group.iter().tuple_windows().enumerate() {
        if entered {
            if operands.is_empty() {
                first = at;
            }
            operands.push(member);
            if range_ends_in_gap(tree, range, member, next) {
                exited = true;
                break;
            }
        } else if range_starts_in_gap(tree, range, member, next) {
            entered = true;
        }
    }
    let last = group[group.len() - 1];
    if !exited && range.end() == tree.range(last).end() {
        if operands.is_empty() {
            first = group.len() - 1;
        }
        operands.push(last);
        exited = true;
    }
    if !exited || operands.is_empty() {
        return None;
    }
    Some((first, operands))
}

fn range_starts_in_gap(tree: &SyntaxTree, range: SourceRange, member: NodeId, next: NodeId) -> bool {
    tree.range(member).end() <= range.offset && range.offset <= tree.range(next).offset
}

fn range_ends_in_gap(tree: &SyntaxTree, range: SourceRange, member: NodeId, next: NodeId) -> bool {
    tree.range(member).end() <= range.end() && range.end() <= tree.range(next).offset
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;
    use crate::matcher::AstMatcher;

    fn parse(source: &str) -> SyntaxTree {
        SyntaxTree::try_from(source).unwrap()
    }

    fn node_with_text(tree: &SyntaxTree, text: &str) -> NodeId {
        tree.preorder(tree.root())
            .find(|&id| tree.text(id) == text)
            .unwrap()
    }

    fn operand_texts(tree: &SyntaxTree, fragment: &ChainFragment<'_>) -> Vec<String> {
        fragment
            .operands()
            .iter()
            .map(|&id| tree.text(id).to_string())
            .collect()
    }

    fn range_of(tree: &SyntaxTree, text: &str) -> SourceRange {
        let offset = tree.source().find(text).unwrap();
        SourceRange::new(offset, text.len())
    }

    #[test]
    fn test_flatten_in_source_order() {
        let tree = parse("x = a + b * c + d + e;");
        let chain = ChainFragment::for_full_chain(&tree, node_with_text(&tree, "a + b * c")).unwrap();
        assert_eq!(operand_texts(&tree, &chain), vec!["a", "b * c", "d", "e"]);
        assert_eq!(chain.operator(), Op::Add);
    }

    #[test]
    fn test_parentheses_stop_the_chain() {
        let tree = parse("x = a + (b + c) + d;");
        let chain = ChainFragment::for_full_chain(&tree, node_with_text(&tree, "a + (b + c)")).unwrap();
        assert_eq!(operand_texts(&tree, &chain), vec!["a", "(b + c)", "d"]);

        // the parenthesized run is a chain of its own
        let inner = ChainFragment::for_full_chain(&tree, node_with_text(&tree, "b + c")).unwrap();
        assert_eq!(operand_texts(&tree, &inner), vec!["b", "c"]);
    }

    #[test]
    fn test_interior_node_resolves_to_group_root() {
        let tree = parse("x = a + b + c + d;");
        let root = node_with_text(&tree, "a + b + c + d");
        let interior = node_with_text(&tree, "a + b");
        let chain = ChainFragment::for_full_chain(&tree, interior).unwrap();
        assert_eq!(chain.group_root(), root);
        assert_eq!(operand_texts(&tree, &chain), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_non_associative_operators_have_no_chain() {
        let tree = parse("x = a - b - c;");
        assert!(ChainFragment::for_full_chain(&tree, node_with_text(&tree, "a - b - c")).is_none());
        let tree = parse("x = a / b;");
        assert!(ChainFragment::for_full_chain(&tree, node_with_text(&tree, "a / b")).is_none());
    }

    #[test]
    fn test_mixed_operators_split_chains() {
        // same precedence does not merge chains across `-`
        let tree = parse("x = a + b - c + d;");
        let chain = ChainFragment::for_full_chain(&tree, node_with_text(&tree, "a + b")).unwrap();
        assert_eq!(operand_texts(&tree, &chain), vec!["a", "b"]);
        assert_eq!(chain.group_root(), node_with_text(&tree, "a + b"));
    }

    #[test]
    fn test_sub_slice_extraction() {
        let tree = parse("x = a + b + c + d;");
        let covering = node_with_text(&tree, "a + b + c");
        let slice =
            ChainFragment::sub_slice_for_range(&tree, covering, range_of(&tree, "b + c")).unwrap();
        assert_eq!(operand_texts(&tree, &slice), vec!["b", "c"]);
        assert_eq!(slice.first, 1);
        assert_eq!(slice.group_root(), node_with_text(&tree, "a + b + c + d"));
        assert_eq!(slice.text(), "b + c");
    }

    #[test]
    fn test_sub_slice_reaching_the_last_operand() {
        let tree = parse("x = a + b + c + d;");
        let covering = node_with_text(&tree, "a + b + c + d");
        let slice =
            ChainFragment::sub_slice_for_range(&tree, covering, range_of(&tree, "c + d")).unwrap();
        assert_eq!(operand_texts(&tree, &slice), vec!["c", "d"]);
        assert_eq!(slice.first, 2);
    }

    #[test]
    fn test_sub_slice_rejects_operand_splitting_ranges() {
        let tree = parse("x = aa + b + c;");
        let covering = node_with_text(&tree, "aa + b + c");
        // range ends inside `aa`
        let split = SourceRange::new(4, 1);
        assert!(ChainFragment::sub_slice_for_range(&tree, covering, split).is_none());
        // `a +` without the second operand
        let dangling = range_of(&tree, "aa +");
        assert!(ChainFragment::sub_slice_for_range(&tree, covering, dangling).is_none());
        // single whole operand is below the two-operand minimum
        let lone = range_of(&tree, "aa");
        assert!(ChainFragment::sub_slice_for_range(&tree, covering, lone).is_none());
    }

    #[test]
    fn test_sub_slice_tolerates_surrounding_whitespace() {
        let tree = parse("x = a +  b + c  + d;");
        let covering = node_with_text(&tree, "a +  b + c  + d");
        let padded = range_of(&tree, " b + c  ");
        let slice = ChainFragment::sub_slice_for_range(&tree, covering, padded).unwrap();
        assert_eq!(operand_texts(&tree, &slice), vec!["b", "c"]);
    }

    #[test]
    fn test_whole_chain_slice() {
        let tree = parse("x = a + b + c;");
        let covering = node_with_text(&tree, "a + b + c");
        let slice = ChainFragment::sub_slice_for_range(
            &tree,
            covering,
            range_of(&tree, "a + b + c"),
        )
        .unwrap();
        assert_eq!(operand_texts(&tree, &slice), vec!["a", "b", "c"]);
        assert_eq!(slice.first, 0);
    }

    #[test]
    fn test_matching_requires_operator_and_arity() {
        let ltree = parse("x = a + b;");
        let rtree = parse("y = a * b;");
        let l = ChainFragment::for_full_chain(&ltree, node_with_text(&ltree, "a + b")).unwrap();
        let r = ChainFragment::for_full_chain(&rtree, node_with_text(&rtree, "a * b")).unwrap();
        assert!(!l.matches_with(&r, &AstMatcher));

        let longer = parse("z = a + b + c;");
        let lf = ChainFragment::for_full_chain(&longer, node_with_text(&longer, "a + b")).unwrap();
        assert!(!l.matches_with(&lf, &AstMatcher));
    }

    #[test]
    fn test_matching_windows() {
        let tree = parse("x = a + b + a + b + c;");
        let chain = ChainFragment::for_full_chain(&tree, node_with_text(&tree, "a + b")).unwrap();
        let pattern_tree = parse("a + b;");
        let pattern =
            ChainFragment::for_full_chain(&pattern_tree, node_with_text(&pattern_tree, "a + b"))
                .unwrap();
        let windows = chain.matching_windows(&pattern, &AstMatcher);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].first, 0);
        assert_eq!(windows[1].first, 2);
        assert!(windows.iter().all(|w| w.group_root() == chain.group_root()));
    }

    #[test]
    fn test_overlapping_windows_are_all_reported() {
        let tree = parse("x = a + a + a;");
        let chain = ChainFragment::for_full_chain(&tree, node_with_text(&tree, "a + a")).unwrap();
        let pattern_tree = parse("a + a;");
        let pattern =
            ChainFragment::for_full_chain(&pattern_tree, node_with_text(&pattern_tree, "a + a"))
                .unwrap();
        let windows = chain.matching_windows(&pattern, &AstMatcher);
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn test_window_wider_than_chain_never_matches() {
        let tree = parse("x = a + b;");
        let chain = ChainFragment::for_full_chain(&tree, node_with_text(&tree, "a + b")).unwrap();
        let pattern_tree = parse("a + b + c;");
        let pattern = ChainFragment::for_full_chain(
            &pattern_tree,
            node_with_text(&pattern_tree, "a + b + c"),
        )
        .unwrap();
        assert!(chain.matching_windows(&pattern, &AstMatcher).is_empty());
    }
}
