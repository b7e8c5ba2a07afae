use std::path::PathBuf;

use fixlens_core::{FixlensError, LineSpan, Result};

use crate::kinds::NodeKind;

/// An owned syntax tree for one file snapshot.
///
/// Built once from a tree-sitter parse and then handed around freely: unlike
/// `tree_sitter::Tree`, it has no lifetime tie to a parser and can be cached
/// across the hunks of a change-set. Only named grammar nodes are retained;
/// punctuation and keyword tokens are dropped during construction.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use fixlens_syntax::parse::{parse_source, ParseOutcome};
///
/// let source = b"class A { void m() {} }";
/// let outcome = parse_source(Path::new("A.java"), source).unwrap();
/// let ParseOutcome::Tree(tree) = outcome else { panic!("expected a tree") };
/// assert_eq!(tree.root.kind, "program");
/// ```
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    /// Path of the file this tree was parsed from, relative to the
    /// repository root.
    pub file_path: PathBuf,
    /// Full source text the byte ranges of the nodes index into.
    pub source: String,
    /// Root node, always of kind `program` for Java sources.
    pub root: SyntaxNode,
}

/// One named node of a [`SyntaxTree`].
///
/// The grammar kind is kept as the raw string tree-sitter reported; mapping
/// it into the closed [`NodeKind`](crate::kinds::NodeKind) taxonomy happens
/// at traversal time, so an out-of-taxonomy kind surfaces exactly where it
/// is first encountered.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    /// Grammar kind string (e.g. `"method_declaration"`).
    pub kind: String,
    /// 1-indexed inclusive line range the node occupies.
    pub span: LineSpan,
    /// Byte offset of the node's first character in the source.
    pub start_byte: usize,
    /// Byte offset one past the node's last character.
    pub end_byte: usize,
    /// Named children in document order.
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// The source text this node covers.
    ///
    /// Returns an empty string if the byte range does not fall on character
    /// boundaries of `tree.source`, which only happens for hand-built nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use fixlens_syntax::parse::{parse_source, ParseOutcome};
    ///
    /// let source = b"class A {}";
    /// let ParseOutcome::Tree(tree) = parse_source(Path::new("A.java"), source).unwrap() else {
    ///     panic!("expected a tree");
    /// };
    /// assert_eq!(tree.root.text(&tree), "class A {}");
    /// ```
    pub fn text<'t>(&self, tree: &'t SyntaxTree) -> &'t str {
        tree.source.get(self.start_byte..self.end_byte).unwrap_or("")
    }

    /// First named child of the given grammar kind, if any.
    pub fn child_of_kind(&self, kind: &str) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }
}

impl SyntaxTree {
    /// Build an owned tree from a completed tree-sitter parse.
    pub(crate) fn from_ts(file_path: PathBuf, source: String, root: tree_sitter::Node<'_>) -> Self {
        let root = convert(root);
        Self {
            file_path,
            source,
            root,
        }
    }

    /// Map a node's grammar kind string into the closed taxonomy.
    ///
    /// # Errors
    ///
    /// Returns [`FixlensError::UnknownNodeKind`] naming the kind, this
    /// tree's file, and the node's span if the kind has no taxonomy entry.
    /// Traversals must propagate that error: an out-of-taxonomy kind means
    /// the grammar and the taxonomy have drifted apart, and any count
    /// produced past it would be untrustworthy.
    pub fn kind_of(&self, node: &SyntaxNode) -> Result<NodeKind> {
        NodeKind::from_grammar(&node.kind).ok_or_else(|| FixlensError::UnknownNodeKind {
            kind: node.kind.clone(),
            file: self.file_path.clone(),
            span: node.span,
        })
    }
}

fn convert(node: tree_sitter::Node<'_>) -> SyntaxNode {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .map(convert)
        .collect::<Vec<_>>();

    // tree-sitter rows are 0-indexed; end_position is past the last
    // character, so its row is still the last occupied line.
    let span = LineSpan::new(
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    );

    SyntaxNode {
        kind: node.kind().to_string(),
        span,
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        children,
    }
}
