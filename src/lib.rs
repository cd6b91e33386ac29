//! Source fragments over expression trees: address a whole subtree or a
//! contiguous slice of an associative operator chain, find structurally
//! matching fragments across a tree, and record replacements that splice
//! back into the source text.
//!
//! `a + b + c + d` parses left-nested, so no single node spans `b + c`;
//! a fragment does:
//!
//! ```
//! use std::convert::TryFrom;
//! use kiritori::{Fragment, Rewrite, SourceRange, SyntaxTree};
//!
//! let tree = SyntaxTree::try_from("x = a + b + c + d;").unwrap();
//! let slice = Fragment::for_source_range(&tree, SourceRange::new(8, 5)).unwrap();
//! assert_eq!(slice.text(), "b + c");
//!
//! let mut rewrite = Rewrite::new(&tree);
//! let tmp = rewrite.create_placeholder("t");
//! slice.replace(&mut rewrite, tmp);
//! assert_eq!(rewrite.apply().unwrap(), "x = a + t + d;");
//! ```

mod fragment;
mod matcher;
mod node;
mod parse;
mod rewrite;
mod selection;
mod source;
mod tree;

pub use crate::fragment::{
    find_matching_fragments, find_matching_fragments_with, ChainFragment, Fragment, SimpleFragment,
};
pub use crate::matcher::{AstMatcher, NodeMatcher};
pub use crate::node::{NodeId, NodeKind, Op};
pub use crate::parse::ParseError;
pub use crate::rewrite::{Rewrite, RewriteError, RewriteNode};
pub use crate::source::SourceRange;
pub use crate::tree::{Preorder, SyntaxTree, TreeBuilder};
