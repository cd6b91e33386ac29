//! Deferred text edits against a syntax tree. Replacements are recorded
//! per node and synthesized content is interned as [`RewriteNode`]
//! handles; nothing touches the source until [`Rewrite::apply`] splices
//! all edits into a fresh string.

use itertools::Itertools;
use log::debug;
use thiserror::Error;

use crate::node::{NodeId, NodeKind, Op};
use crate::tree::SyntaxTree;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewriteError {
    #[error("fragment of kind {kind:?} is not an expression")]
    NotAnExpression { kind: NodeKind },
    #[error("overlapping edits at byte {offset}")]
    OverlappingEdits { offset: usize },
}

/// Handle to content synthesized by a [`Rewrite`]. Only valid for the
/// rewrite that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteNode(usize);

#[derive(Debug)]
enum Synthesized {
    /// Verbatim text of an existing node.
    Copy(NodeId),
    /// Opaque text, reproduced as-is.
    Text(String),
    /// A flat operator chain over previously synthesized operands.
    Infix { op: Op, operands: Vec<RewriteNode> },
}

#[derive(Debug)]
struct Edit {
    target: NodeId,
    replacement: RewriteNode,
}

/// Records edits against an immutable tree. Handles can only refer to
/// handles created earlier, so synthesized content is always acyclic.
#[derive(Debug)]
pub struct Rewrite<'tree> {
    tree: &'tree SyntaxTree,
    synthesized: Vec<Synthesized>,
    edits: Vec<Edit>,
}

impl<'tree> Rewrite<'tree> {
    pub fn new(tree: &'tree SyntaxTree) -> Self {
        Rewrite {
            tree,
            synthesized: Vec::new(),
            edits: Vec::new(),
        }
    }

    pub fn tree(&self) -> &'tree SyntaxTree {
        self.tree
    }

    /// Content reproducing `node`'s source text.
    pub fn create_copy(&mut self, node: NodeId) -> RewriteNode {
        self.intern(Synthesized::Copy(node))
    }

    /// Content carrying `text` verbatim.
    pub fn create_placeholder(&mut self, text: impl Into<String>) -> RewriteNode {
        self.intern(Synthesized::Text(text.into()))
    }

    /// Content joining `operands` with `op`. The operands are emitted as
    /// given; no parentheses are inserted.
    pub fn new_infix(&mut self, op: Op, operands: Vec<RewriteNode>) -> RewriteNode {
        self.intern(Synthesized::Infix { op, operands })
    }

    fn intern(&mut self, content: Synthesized) -> RewriteNode {
        self.synthesized.push(content);
        RewriteNode(self.synthesized.len() - 1)
    }

    /// Record replacement of `target`'s whole extent with `replacement`.
    pub fn replace(&mut self, target: NodeId, replacement: RewriteNode) {
        self.edits.push(Edit {
            target,
            replacement,
        });
    }

    fn snippet(&self, node: RewriteNode) -> String {
        match &self.synthesized[node.0] {
            Synthesized::Copy(id) => self.tree.text(*id).to_string(),
            Synthesized::Text(text) => text.clone(),
            Synthesized::Infix { op, operands } => operands
                .iter()
                .map(|&operand| self.snippet(operand))
                .join(&format!(" {} ", op)),
        }
    }

    /// Splice all recorded edits into new source text. Edits are applied
    /// in source order regardless of recording order; edits whose targets
    /// overlap are rejected.
    pub fn apply(&self) -> Result<String, RewriteError> {
        let mut ordered: Vec<&Edit> = self.edits.iter().collect();
        ordered.sort_by_key(|edit| self.tree.range(edit.target).offset);

        let source = self.tree.source();
        let mut patched = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in ordered {
            let range = self.tree.range(edit.target);
            if range.offset < cursor {
                return Err(RewriteError::OverlappingEdits {
                    offset: range.offset,
                });
            }
            patched.push_str(&source[cursor..range.offset]);
            patched.push_str(&self.snippet(edit.replacement));
            cursor = range.end();
        }
        patched.push_str(&source[cursor..]);
        debug!("applied {} edits", self.edits.len());
        Ok(patched)
    }
}
