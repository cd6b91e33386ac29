use std::fmt;

use crate::source::SourceRange;

/// Identifies a node within its [`SyntaxTree`](crate::SyntaxTree) arena.
/// Ids are only meaningful together with the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    SourceFile,
    FnDecl,
    DocComment,
    Block,
    LetStmt,
    ReturnStmt,
    ExprStmt,
    IfStmt,
    WhileStmt,
    Assign,
    Infix,
    Prefix,
    Call,
    Paren,
    Name,
    NumberLit,
    StringLit,
    BoolLit,
}

impl NodeKind {
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            NodeKind::Assign
                | NodeKind::Infix
                | NodeKind::Prefix
                | NodeKind::Call
                | NodeKind::Paren
                | NodeKind::Name
                | NodeKind::NumberLit
                | NodeKind::StringLit
                | NodeKind::BoolLit
        )
    }
}

/// Operator tag carried by `Infix` and `Prefix` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Neg,
    Not,
}

impl Op {
    /// Operators whose chains may be regrouped: `a + b + c` can be sliced
    /// at any operand boundary, `a - b - c` cannot.
    pub fn is_associative(self) -> bool {
        matches!(
            self,
            Op::Add | Op::Mul | Op::BitXor | Op::BitOr | Op::BitAnd | Op::And | Op::Or
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Rem => "%",
            Op::BitAnd => "&",
            Op::BitOr => "|",
            Op::BitXor => "^",
            Op::And => "&&",
            Op::Or => "||",
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Neg => "-",
            Op::Not => "!",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) op: Option<Op>,
    pub(crate) range: SourceRange,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_associative_operators() {
        let associative = [
            Op::Add,
            Op::Mul,
            Op::BitXor,
            Op::BitOr,
            Op::BitAnd,
            Op::And,
            Op::Or,
        ];
        for op in associative.iter() {
            assert!(op.is_associative(), "{} should be associative", op);
        }
        let plain = [
            Op::Sub,
            Op::Div,
            Op::Rem,
            Op::Eq,
            Op::Ne,
            Op::Lt,
            Op::Le,
            Op::Gt,
            Op::Ge,
        ];
        for op in plain.iter() {
            assert!(!op.is_associative(), "{} should not be associative", op);
        }
    }

    #[test]
    fn test_expression_kinds() {
        assert!(NodeKind::Infix.is_expression());
        assert!(NodeKind::Name.is_expression());
        assert!(NodeKind::Paren.is_expression());
        assert!(!NodeKind::LetStmt.is_expression());
        assert!(!NodeKind::DocComment.is_expression());
        assert!(!NodeKind::Block.is_expression());
    }
}
