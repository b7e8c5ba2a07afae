use std::path::Path;

use tree_sitter::Parser;

use fixlens_core::{FixlensError, Result};

use crate::tree::SyntaxTree;

/// Result of attempting to parse one file snapshot.
///
/// Failing to parse a snapshot is expected during history mining (historic
/// revisions contain broken intermediate states), so input problems are a
/// value, not an error: callers count them and move on.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use fixlens_syntax::parse::{parse_source, ParseOutcome};
///
/// let outcome = parse_source(Path::new("A.java"), b"class A {}").unwrap();
/// assert!(matches!(outcome, ParseOutcome::Tree(_)));
///
/// let outcome = parse_source(Path::new("B.java"), b"class {{{").unwrap();
/// assert!(matches!(outcome, ParseOutcome::Unparsable { .. }));
/// ```
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    /// The snapshot parsed cleanly.
    Tree(SyntaxTree),
    /// The snapshot could not be turned into a usable tree.
    Unparsable {
        /// Human-readable explanation, for diagnostics only.
        reason: String,
    },
}

impl ParseOutcome {
    /// The parsed tree, if this outcome holds one.
    pub fn tree(&self) -> Option<&SyntaxTree> {
        match self {
            ParseOutcome::Tree(tree) => Some(tree),
            ParseOutcome::Unparsable { .. } => None,
        }
    }
}

/// Parse one Java source snapshot into an owned [`SyntaxTree`].
///
/// Input problems — non-UTF-8 content, parser bailout, or a tree containing
/// syntax errors — yield [`ParseOutcome::Unparsable`]. Trees with errors are
/// rejected outright rather than classified partially: a half-parsed method
/// body under a policy table would skew counts silently.
///
/// # Errors
///
/// Returns [`FixlensError::Parse`] only if the Java grammar itself cannot be
/// loaded, which indicates a build problem rather than bad input.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use fixlens_syntax::parse::{parse_source, ParseOutcome};
///
/// let outcome = parse_source(Path::new("A.java"), b"class A { void m() {} }").unwrap();
/// let ParseOutcome::Tree(tree) = outcome else { panic!("expected a tree") };
/// assert_eq!(tree.file_path, Path::new("A.java"));
/// ```
pub fn parse_source(path: &Path, bytes: &[u8]) -> Result<ParseOutcome> {
    let source = match std::str::from_utf8(bytes) {
        Ok(source) => source.to_string(),
        Err(e) => {
            return Ok(ParseOutcome::Unparsable {
                reason: format!("not valid UTF-8: {e}"),
            })
        }
    };

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| FixlensError::Parse(format!("failed to load Java grammar: {e}")))?;

    let Some(ts_tree) = parser.parse(&source, None) else {
        return Ok(ParseOutcome::Unparsable {
            reason: "parser produced no tree".into(),
        });
    };

    if ts_tree.root_node().has_error() {
        return Ok(ParseOutcome::Unparsable {
            reason: "source contains syntax errors".into(),
        });
    }

    Ok(ParseOutcome::Tree(SyntaxTree::from_ts(
        path.to_path_buf(),
        source,
        ts_tree.root_node(),
    )))
}
