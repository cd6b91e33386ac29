use crate::node::{NodeId, NodeKind};
use crate::tree::SyntaxTree;

/// Structural equivalence between nodes, possibly living in distinct
/// trees. The fragment engine calls this wherever two fragments are
/// compared, so a custom implementation changes what "matching" means
/// everywhere at once.
pub trait NodeMatcher {
    fn nodes_match(&self, ltree: &SyntaxTree, l: NodeId, rtree: &SyntaxTree, r: NodeId) -> bool;
}

/// Default matcher: nodes match when they have the same kind, the same
/// operator tag, and pairwise-matching children; leaves compare by their
/// source text. Formatting between tokens is irrelevant, operand order is
/// not.
#[derive(Debug, Clone, Copy, Default)]
pub struct AstMatcher;

impl NodeMatcher for AstMatcher {
    fn nodes_match(&self, ltree: &SyntaxTree, l: NodeId, rtree: &SyntaxTree, r: NodeId) -> bool {
        if ltree.kind(l) != rtree.kind(r) || ltree.operator(l) != rtree.operator(r) {
            return false;
        }
        if is_textual_leaf(ltree.kind(l)) {
            return ltree.text(l) == rtree.text(r);
        }
        let lc = ltree.children(l);
        let rc = rtree.children(r);
        lc.len() == rc.len()
            && lc
                .iter()
                .zip(rc.iter())
                .all(|(&lchild, &rchild)| self.nodes_match(ltree, lchild, rtree, rchild))
    }
}

fn is_textual_leaf(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Name
            | NodeKind::NumberLit
            | NodeKind::StringLit
            | NodeKind::BoolLit
            | NodeKind::DocComment
    )
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;

    fn matched(left: &str, right: &str) -> bool {
        let ltree = SyntaxTree::try_from(left).unwrap();
        let rtree = SyntaxTree::try_from(right).unwrap();
        AstMatcher.nodes_match(&ltree, ltree.root(), &rtree, rtree.root())
    }

    #[test]
    fn test_formatting_is_ignored() {
        assert!(matched("x = a + b;", "x   =  a+b ;"));
        assert!(matched("fn f() {}", "fn f() { }"));
    }

    #[test]
    fn test_leaf_text_is_significant() {
        assert!(!matched("x = a + b;", "x = b + a;"));
        assert!(!matched("x = 1 + b;", "x = 2 + b;"));
        assert!(!matched("x = \"a\";", "x = \"b\";"));
    }

    #[test]
    fn test_shape_is_significant() {
        assert!(!matched("x = a + b;", "x = a - b;"));
        assert!(!matched("x = a;", "x = (a);"));
        assert!(!matched("x = -a;", "x = !a;"));
        assert!(!matched("x = f(a);", "x = f(a, b);"));
    }

    #[test]
    fn test_subtrees_across_trees() {
        let ltree = SyntaxTree::try_from("x = a + b * c;").unwrap();
        let rtree = SyntaxTree::try_from("if ok { y = b * c; }").unwrap();
        let lmul = ltree
            .preorder(ltree.root())
            .find(|&id| ltree.text(id) == "b * c")
            .unwrap();
        let rmul = rtree
            .preorder(rtree.root())
            .find(|&id| rtree.text(id) == "b * c")
            .unwrap();
        assert!(AstMatcher.nodes_match(&ltree, lmul, &rtree, rmul));
        assert!(AstMatcher.nodes_match(&rtree, rmul, &ltree, lmul));
    }
}
