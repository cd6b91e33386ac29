//! Finds every fragment under a scope node that structurally matches a
//! pattern fragment. Chain patterns are matched as windows over each
//! candidate chain's operand list, so `a + b` is found inside
//! `a + b + c` even though no single node spans it.

use log::debug;

use crate::matcher::{AstMatcher, NodeMatcher};
use crate::node::{NodeId, NodeKind};
use crate::tree::SyntaxTree;

use super::Fragment;

pub fn find_matching_fragments<'tree>(
    tree: &'tree SyntaxTree,
    scope: NodeId,
    pattern: &Fragment<'_>,
) -> Vec<Fragment<'tree>> {
    find_matching_fragments_with(tree, scope, pattern, &AstMatcher)
}

pub fn find_matching_fragments_with<'tree, M: NodeMatcher>(
    tree: &'tree SyntaxTree,
    scope: NodeId,
    pattern: &Fragment<'_>,
    matcher: &M,
) -> Vec<Fragment<'tree>> {
    let mut found = Vec::new();
    visit(tree, scope, pattern, matcher, &mut found);
    debug!("{} fragments match `{}`", found.len(), pattern.text());
    found
}

fn visit<'tree, M: NodeMatcher>(
    tree: &'tree SyntaxTree,
    node: NodeId,
    pattern: &Fragment<'_>,
    matcher: &M,
    found: &mut Vec<Fragment<'tree>>,
) {
    if tree.kind(node) == NodeKind::DocComment {
        return;
    }
    for fragment in matches_at(tree, node, pattern, matcher) {
        // interior nodes of a chain re-derive the chain's own windows
        if !found.contains(&fragment) {
            found.push(fragment);
        }
    }
    for &child in tree.children(node) {
        visit(tree, child, pattern, matcher, found);
    }
}

fn matches_at<'tree, M: NodeMatcher>(
    tree: &'tree SyntaxTree,
    node: NodeId,
    pattern: &Fragment<'_>,
    matcher: &M,
) -> Vec<Fragment<'tree>> {
    match Fragment::for_full_subtree(tree, node) {
        Fragment::Chain(chain) => match pattern {
            Fragment::Chain(pattern) => chain
                .matching_windows(pattern, matcher)
                .into_iter()
                .map(Fragment::Chain)
                .collect(),
            Fragment::Simple(_) => Vec::new(),
        },
        Fragment::Simple(simple) => match pattern {
            Fragment::Simple(pattern) if simple.matches_with(pattern, matcher) => {
                vec![Fragment::Simple(simple)]
            }
            _ => Vec::new(),
        },
    }
}
