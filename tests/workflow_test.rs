//! End-to-end fragment workflows over the public API: resolve a user
//! selection, find matching occurrences, and rewrite them.

use std::convert::TryFrom;

use kiritori::{find_matching_fragments, Fragment, Rewrite, RewriteError, SourceRange, SyntaxTree};

#[test]
fn test_extract_repeated_subexpression() -> anyhow::Result<()> {
    let source = "fn area(w, h, pad) { let inner = w * h + pad; let outer = w * h + pad + pad; return outer - inner; }";
    let tree = SyntaxTree::try_from(source)?;

    let offset = source.find("w * h + pad").unwrap();
    let selection = SourceRange::new(offset, "w * h + pad".len());
    let fragment = Fragment::for_source_range(&tree, selection).expect("selection resolves");

    // one occurrence is a whole chain, the other the head of a longer one
    let matches = find_matching_fragments(&tree, tree.root(), &fragment);
    assert_eq!(matches.len(), 2);

    let mut rewrite = Rewrite::new(&tree);
    for found in &matches {
        let name = rewrite.create_placeholder("base");
        found.replace(&mut rewrite, name);
    }
    let patched = rewrite.apply()?;
    assert_eq!(
        patched,
        "fn area(w, h, pad) { let inner = base; let outer = base + pad; return outer - inner; }"
    );

    // the rewritten source still parses
    SyntaxTree::try_from(patched.as_str())?;
    Ok(())
}

#[test]
fn test_matching_is_scoped_to_the_queried_fragment() -> anyhow::Result<()> {
    let tree = SyntaxTree::try_from("x = a + b + a + b; y = a + b;")?;
    let chain = Fragment::for_source_range(&tree, SourceRange::new(4, 13)).expect("chain resolves");

    let pattern_tree = SyntaxTree::try_from("a + b;")?;
    let pattern =
        Fragment::for_source_range(&pattern_tree, SourceRange::new(0, 5)).expect("pattern resolves");

    // both windows of the first statement match; `y`'s chain is outside
    let found = chain.sub_fragments_matching(&pattern);
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].range(), SourceRange::new(4, 5));
    assert_eq!(found[1].range(), SourceRange::new(12, 5));

    let mut rewrite = Rewrite::new(&tree);
    let tmp = rewrite.create_placeholder("t");
    found[1].replace(&mut rewrite, tmp);
    assert_eq!(rewrite.apply()?, "x = a + b + t; y = a + b;");
    Ok(())
}

#[test]
fn test_two_slices_of_one_chain_conflict() -> anyhow::Result<()> {
    let tree = SyntaxTree::try_from("x = a + b + a + b;")?;
    let pattern_tree = SyntaxTree::try_from("a + b;")?;
    let pattern =
        Fragment::for_source_range(&pattern_tree, SourceRange::new(0, 5)).expect("pattern resolves");

    let found = find_matching_fragments(&tree, tree.root(), &pattern);
    assert_eq!(found.len(), 2);

    // both replacements rebuild the same chain, so they collide on its root
    let mut rewrite = Rewrite::new(&tree);
    for fragment in &found {
        let tmp = rewrite.create_placeholder("t");
        fragment.replace(&mut rewrite, tmp);
    }
    match rewrite.apply() {
        Err(RewriteError::OverlappingEdits { .. }) => Ok(()),
        other => panic!("expected overlapping edits, got {:?}", other),
    }
}
