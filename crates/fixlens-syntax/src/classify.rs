use fixlens_core::Result;

use crate::policy::{FoldMode, KindAction, KindPolicy};
use crate::tree::{SyntaxNode, SyntaxTree};

/// Outcome of classifying one declaration under a policy.
///
/// `hit` is the node that decided the walk early, when one did: for an
/// existential policy the first matching construct, for a universal policy
/// the first disqualifier. A universal pass and an existential miss both
/// leave it `None`.
#[derive(Debug, Clone)]
pub struct Classification<'t> {
    /// Whether the declaration satisfies the policy.
    pub matched: bool,
    /// The deciding node, if the walk was decided by one.
    pub hit: Option<&'t SyntaxNode>,
}

/// Classify `node` (usually a resolved declaration) under `policy`.
///
/// Walks the subtree depth-first in document order, consulting the policy's
/// kind table at every node: `Terminal` and positive `Inspect` nodes decide
/// the fold immediately, `Stop` subtrees are skipped, `Descend` recurses.
/// The function is pure — same tree, node, and policy always produce the
/// same answer.
///
/// # Errors
///
/// Returns [`FixlensError::UnknownNodeKind`] if any traversed node's kind
/// is outside the taxonomy. The walk stops at the first such node; no
/// partial answer is produced.
///
/// [`FixlensError::UnknownNodeKind`]: fixlens_core::FixlensError::UnknownNodeKind
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use fixlens_syntax::classify::classify;
/// use fixlens_syntax::parse::{parse_source, ParseOutcome};
/// use fixlens_syntax::policy::AssertionPolicy;
///
/// let source = b"class A { void m(int x) { assert x > 0; } }";
/// let ParseOutcome::Tree(tree) = parse_source(Path::new("A.java"), source).unwrap() else {
///     panic!("expected a tree");
/// };
/// let result = classify(&tree, &tree.root, &AssertionPolicy::default()).unwrap();
/// assert!(result.matched);
/// ```
pub fn classify<'t>(
    tree: &'t SyntaxTree,
    node: &'t SyntaxNode,
    policy: &dyn KindPolicy,
) -> Result<Classification<'t>> {
    let witness = witness_in(tree, node, policy)?;
    let matched = match policy.mode() {
        FoldMode::Any => witness.is_some(),
        FoldMode::All => witness.is_none(),
    };
    Ok(Classification {
        matched,
        hit: witness,
    })
}

/// Find the first node, in document order, that decides the fold.
fn witness_in<'t>(
    tree: &'t SyntaxTree,
    node: &'t SyntaxNode,
    policy: &dyn KindPolicy,
) -> Result<Option<&'t SyntaxNode>> {
    let kind = tree.kind_of(node)?;
    match policy.action(kind) {
        KindAction::Stop => Ok(None),
        KindAction::Terminal => Ok(Some(node)),
        KindAction::Inspect => {
            if policy.inspect(tree, node) {
                return Ok(Some(node));
            }
            witness_in_children(tree, node, policy)
        }
        KindAction::Descend => witness_in_children(tree, node, policy),
    }
}

fn witness_in_children<'t>(
    tree: &'t SyntaxTree,
    node: &'t SyntaxNode,
    policy: &dyn KindPolicy,
) -> Result<Option<&'t SyntaxNode>> {
    for child in &node.children {
        if let Some(witness) = witness_in(tree, child, policy)? {
            return Ok(Some(witness));
        }
    }
    Ok(None)
}
