use fixlens_core::{DeclKey, Hunk, Result};

use crate::kinds::NodeKind;
use crate::tree::{SyntaxNode, SyntaxTree};

/// How the hunk-to-declaration search treats a node kind.
///
/// The mapping is total over [`NodeKind`]: every kind is deliberately placed
/// in one of the three roles, and the match in [`role_of`] has no wildcard
/// arm, so a grammar upgrade that adds kinds forces this table to be
/// revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveRole {
    /// May contain declarations in statement or member position; the search
    /// descends through it.
    Container,
    /// A resolvable declaration: methods, constructors, and record compact
    /// constructors.
    Declaration,
    /// Cannot contain a resolvable declaration except through expression
    /// bodies (anonymous classes, lambdas); the search treats it as a leaf.
    Opaque,
}

/// The role table for the hunk-to-declaration search.
pub fn role_of(kind: NodeKind) -> ResolveRole {
    use NodeKind::*;

    match kind {
        MethodDeclaration | ConstructorDeclaration | CompactConstructorDeclaration => {
            ResolveRole::Declaration
        }

        // Member structure.
        Program | ClassDeclaration | ClassBody | InterfaceDeclaration | InterfaceBody
        | EnumDeclaration | EnumBody | EnumBodyDeclarations | EnumConstant
        | RecordDeclaration | AnnotationTypeDeclaration | AnnotationTypeBody
        | ConstructorBody | StaticInitializer
        // Statement structure: local classes are statements in Java, so every
        // compound statement can host declarations.
        | Block | LabeledStatement | IfStatement | WhileStatement | DoStatement
        | ForStatement | EnhancedForStatement | SwitchExpression | SwitchBlock
        | SwitchBlockStatementGroup | SwitchRule | SynchronizedStatement | TryStatement
        | TryWithResourcesStatement | CatchClause | FinallyClause => ResolveRole::Container,

        // Everything else is a leaf for resolution. Declarations buried in
        // expression bodies (anonymous classes, lambda blocks) attribute to
        // the nearest enclosing declaration instead.
        PackageDeclaration | ImportDeclaration | Asterisk | ModuleDeclaration | ModuleBody
        | RequiresModuleDirective | RequiresModifier | ExportsModuleDirective
        | OpensModuleDirective | UsesModuleDirective | ProvidesModuleDirective
        | Identifier | ScopedIdentifier | TypeIdentifier | ScopedTypeIdentifier
        | AnnotationTypeElementDeclaration | ConstantDeclaration | FieldDeclaration
        | VariableDeclarator | Superclass | SuperInterfaces | ExtendsInterfaces | Permits
        | TypeList | FormalParameters | FormalParameter | SpreadParameter
        | ReceiverParameter | TypeParameters | TypeParameter | TypeBound
        | InferredParameters | Modifiers | Annotation | MarkerAnnotation
        | AnnotationArgumentList | ElementValuePair | ElementValueArrayInitializer
        | VoidType | IntegralType | FloatingPointType | BooleanType | ArrayType
        | GenericType | TypeArguments | Wildcard | Dimensions | DimensionsExpr
        | AnnotatedType | Throws | ExpressionStatement | AssertStatement | SwitchLabel
        | BreakStatement | ContinueStatement | ReturnStatement | YieldStatement
        | ThrowStatement | CatchFormalParameter | CatchType | ResourceSpecification
        | Resource | LocalVariableDeclaration | ExplicitConstructorInvocation
        | AssignmentExpression | BinaryExpression | InstanceofExpression
        | LambdaExpression | TernaryExpression | UpdateExpression | UnaryExpression
        | CastExpression | ArrayCreationExpression | ObjectCreationExpression
        | ArrayInitializer | MethodInvocation | ArgumentList | MethodReference
        | FieldAccess | ArrayAccess | ParenthesizedExpression | This | Super
        | ClassLiteral | TemplateExpression | Pattern | TypePattern | RecordPattern
        | RecordPatternBody | RecordPatternComponent | UnderscorePattern | Guard
        | DecimalIntegerLiteral | HexIntegerLiteral | OctalIntegerLiteral
        | BinaryIntegerLiteral | DecimalFloatingPointLiteral | HexFloatingPointLiteral
        | True | False | CharacterLiteral | StringLiteral | StringFragment
        | MultilineStringFragment | StringInterpolation | EscapeSequence | NullLiteral
        | LineComment | BlockComment => ResolveRole::Opaque,
    }
}

/// A resolved method-level declaration inside one tree.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use fixlens_core::Hunk;
/// use fixlens_syntax::parse::{parse_source, ParseOutcome};
/// use fixlens_syntax::resolve::resolve;
///
/// let source = b"class A {\n    void m() {\n        int x = 1;\n    }\n}\n";
/// let ParseOutcome::Tree(tree) = parse_source(Path::new("A.java"), source).unwrap() else {
///     panic!("expected a tree");
/// };
/// let hunk = Hunk {
///     file_path: PathBuf::from("A.java"),
///     new_start: 3,
///     new_lines: 1,
/// };
/// let decl = resolve(&tree, &hunk).unwrap().expect("hunk lands in m");
/// assert_eq!(decl.name.as_deref(), Some("m"));
/// ```
#[derive(Debug, Clone)]
pub struct Declaration<'t> {
    /// The declaration's node in the tree.
    pub node: &'t SyntaxNode,
    /// Which declaration kind it is.
    pub kind: NodeKind,
    /// Declared name, when the grammar provides one.
    pub name: Option<String>,
    /// Stable identity within this snapshot.
    pub key: DeclKey,
}

impl<'t> Declaration<'t> {
    fn new(tree: &'t SyntaxTree, node: &'t SyntaxNode, kind: NodeKind) -> Self {
        let name = node
            .child_of_kind("identifier")
            .map(|n| n.text(tree).to_string());
        Self {
            node,
            kind,
            name,
            key: DeclKey::new(tree.file_path.clone(), node.span),
        }
    }
}

/// Find the innermost declaration whose span overlaps `hunk`.
///
/// The search starts at the root, prunes any subtree whose span the hunk
/// does not overlap (child spans are contained in their parent's span, so
/// pruning cannot lose a match), descends through [`Container`] kinds, and
/// on reaching an overlapping declaration first recurses into its body: a
/// hit inside a nested declaration wins over the enclosing one. When
/// sibling declarations both overlap, the first in document order wins.
///
/// Returns `Ok(None)` when the hunk touches no resolvable declaration, for
/// example an import-only or field-only edit.
///
/// [`Container`]: ResolveRole::Container
///
/// # Errors
///
/// Returns [`FixlensError::UnknownNodeKind`] if a node in the traversed
/// region has a grammar kind outside the taxonomy.
///
/// [`FixlensError::UnknownNodeKind`]: fixlens_core::FixlensError::UnknownNodeKind
pub fn resolve<'t>(tree: &'t SyntaxTree, hunk: &Hunk) -> Result<Option<Declaration<'t>>> {
    match resolve_in(tree, &tree.root, hunk)? {
        Some(node) => {
            let kind = tree.kind_of(node)?;
            Ok(Some(Declaration::new(tree, node, kind)))
        }
        None => Ok(None),
    }
}

fn resolve_in<'t>(
    tree: &'t SyntaxTree,
    node: &'t SyntaxNode,
    hunk: &Hunk,
) -> Result<Option<&'t SyntaxNode>> {
    let kind = tree.kind_of(node)?;
    if !hunk.overlaps(node.span) {
        return Ok(None);
    }

    match role_of(kind) {
        ResolveRole::Container => {
            for child in &node.children {
                if let Some(found) = resolve_in(tree, child, hunk)? {
                    return Ok(Some(found));
                }
            }
            Ok(None)
        }
        ResolveRole::Declaration => {
            // Innermost wins: a declaration nested in this one takes
            // precedence over the declaration itself.
            for child in &node.children {
                if let Some(inner) = resolve_in(tree, child, hunk)? {
                    return Ok(Some(inner));
                }
            }
            Ok(Some(node))
        }
        ResolveRole::Opaque => Ok(None),
    }
}

/// Collect every declaration reachable by the resolver, in document order.
///
/// Uses the same role table as [`resolve`], so the returned set is exactly
/// the set of declarations a hunk could resolve to: local classes in
/// statement position are included, anonymous-class members are not.
///
/// # Errors
///
/// Returns [`FixlensError::UnknownNodeKind`] if any reachable node has a
/// grammar kind outside the taxonomy.
///
/// [`FixlensError::UnknownNodeKind`]: fixlens_core::FixlensError::UnknownNodeKind
pub fn collect_declarations(tree: &SyntaxTree) -> Result<Vec<Declaration<'_>>> {
    let mut found = Vec::new();
    collect_in(tree, &tree.root, &mut found)?;
    Ok(found)
}

fn collect_in<'t>(
    tree: &'t SyntaxTree,
    node: &'t SyntaxNode,
    found: &mut Vec<Declaration<'t>>,
) -> Result<()> {
    let kind = tree.kind_of(node)?;
    match role_of(kind) {
        ResolveRole::Container => {
            for child in &node.children {
                collect_in(tree, child, found)?;
            }
        }
        ResolveRole::Declaration => {
            found.push(Declaration::new(tree, node, kind));
            for child in &node.children {
                collect_in(tree, child, found)?;
            }
        }
        ResolveRole::Opaque => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use fixlens_core::{FixlensError, LineSpan};

    use super::*;
    use crate::parse::{parse_source, ParseOutcome};

    fn tree_for(source: &str) -> SyntaxTree {
        match parse_source(Path::new("Test.java"), source.as_bytes()).unwrap() {
            ParseOutcome::Tree(tree) => tree,
            ParseOutcome::Unparsable { reason } => panic!("unparsable fixture: {reason}"),
        }
    }

    fn hunk(start: u32, lines: u32) -> Hunk {
        Hunk {
            file_path: PathBuf::from("Test.java"),
            new_start: start,
            new_lines: lines,
        }
    }

    #[test]
    fn role_table_classifies_declarations() {
        assert_eq!(role_of(NodeKind::MethodDeclaration), ResolveRole::Declaration);
        assert_eq!(
            role_of(NodeKind::ConstructorDeclaration),
            ResolveRole::Declaration
        );
        assert_eq!(
            role_of(NodeKind::CompactConstructorDeclaration),
            ResolveRole::Declaration
        );
        assert_eq!(role_of(NodeKind::ClassBody), ResolveRole::Container);
        assert_eq!(role_of(NodeKind::Block), ResolveRole::Container);
        assert_eq!(role_of(NodeKind::FieldDeclaration), ResolveRole::Opaque);
        assert_eq!(role_of(NodeKind::LineComment), ResolveRole::Opaque);
    }

    #[test]
    fn hunk_outside_every_declaration_resolves_none() {
        let tree = tree_for(
            "class A {\n    int field = 0;\n\n    void m() {\n        int x = 1;\n    }\n}\n",
        );
        // Line 2 is the field declaration.
        assert!(resolve(&tree, &hunk(2, 1)).unwrap().is_none());
    }

    #[test]
    fn import_only_hunk_resolves_none() {
        let tree = tree_for(
            "import java.util.List;\nimport java.util.Map;\nimport java.util.Set;\n\nclass A {\n    void m() {}\n}\n",
        );
        assert!(resolve(&tree, &hunk(1, 3)).unwrap().is_none());
    }

    #[test]
    fn hunk_inside_leaf_method_resolves_to_it() {
        let tree = tree_for("class A {\n    void m() {\n        int x = 1;\n    }\n}\n");
        let decl = resolve(&tree, &hunk(3, 1)).unwrap().expect("inside m");
        assert_eq!(decl.kind, NodeKind::MethodDeclaration);
        assert_eq!(decl.name.as_deref(), Some("m"));
        assert_eq!(decl.key.span, LineSpan::new(2, 4));
    }

    #[test]
    fn signature_line_counts_as_the_declaration() {
        let tree = tree_for("class A {\n    void m() {\n        int x = 1;\n    }\n}\n");
        let decl = resolve(&tree, &hunk(2, 1)).unwrap().expect("signature edit");
        assert_eq!(decl.name.as_deref(), Some("m"));
    }

    #[test]
    fn nested_local_class_method_wins_over_enclosing_method() {
        let source = "\
class A {
    void outer() {
        class Local {
            void inner() {
                int x = 1;
            }
        }
    }
}
";
        let tree = tree_for(source);
        let decl = resolve(&tree, &hunk(5, 1)).unwrap().expect("inside inner");
        assert_eq!(decl.name.as_deref(), Some("inner"));

        // An edit on the enclosing method's own line still resolves to it.
        let decl = resolve(&tree, &hunk(2, 1)).unwrap().expect("outer signature");
        assert_eq!(decl.name.as_deref(), Some("outer"));
    }

    #[test]
    fn local_class_under_an_if_still_resolves_innermost() {
        let source = "\
class A {
    void outer(boolean flag) {
        if (flag) {
            class Local {
                void inner() {
                    int x = 1;
                }
            }
        }
    }
}
";
        let tree = tree_for(source);
        let decl = resolve(&tree, &hunk(6, 1)).unwrap().expect("inside inner");
        assert_eq!(decl.name.as_deref(), Some("inner"));
    }

    #[test]
    fn anonymous_class_edit_attributes_to_enclosing_method() {
        let source = "\
class A {
    void m() {
        Runnable r = new Runnable() {
            public void run() {
                int x = 1;
            }
        };
    }
}
";
        let tree = tree_for(source);
        // Anonymous bodies hang off an expression, which the role table
        // keeps opaque, so the edit lands on the named method around it.
        let decl = resolve(&tree, &hunk(5, 1)).unwrap().expect("inside m");
        assert_eq!(decl.name.as_deref(), Some("m"));
    }

    #[test]
    fn constructor_and_compact_constructor_resolve() {
        let tree = tree_for("class A {\n    A() {\n        int x = 1;\n    }\n}\n");
        let decl = resolve(&tree, &hunk(3, 1)).unwrap().expect("inside A()");
        assert_eq!(decl.kind, NodeKind::ConstructorDeclaration);
        assert_eq!(decl.name.as_deref(), Some("A"));

        let tree = tree_for("record R(int x) {\n    R {\n        int y = x;\n    }\n}\n");
        let decl = resolve(&tree, &hunk(3, 1)).unwrap().expect("inside R {}");
        assert_eq!(decl.kind, NodeKind::CompactConstructorDeclaration);
    }

    #[test]
    fn hunk_straddling_two_methods_takes_the_first() {
        let source = "\
class A {
    void first() {
        int x = 1;
    }
    void second() {
        int y = 2;
    }
}
";
        let tree = tree_for(source);
        // Lines 3-5 touch the end of `first` and the start of `second`.
        let decl = resolve(&tree, &hunk(3, 3)).unwrap().expect("overlap");
        assert_eq!(decl.name.as_deref(), Some("first"));
    }

    #[test]
    fn zero_length_deletion_at_method_start_resolves() {
        let tree = tree_for("class A {\n    void m() {\n        int x = 1;\n    }\n}\n");
        let decl = resolve(&tree, &hunk(2, 0)).unwrap().expect("deletion anchor");
        assert_eq!(decl.name.as_deref(), Some("m"));
    }

    #[test]
    fn resolving_repeatedly_gives_identical_answers() {
        let tree = tree_for("class A {\n    void m() {\n        int x = 1;\n    }\n}\n");
        let h = hunk(3, 1);
        let first = resolve(&tree, &h).unwrap().expect("inside m").key;
        for _ in 0..10 {
            let again = resolve(&tree, &h).unwrap().expect("inside m").key;
            assert_eq!(again, first);
        }
    }

    #[test]
    fn unknown_kind_in_traversed_region_is_fatal() {
        let tree = SyntaxTree {
            file_path: PathBuf::from("Drift.java"),
            source: String::new(),
            root: SyntaxNode {
                kind: "program".into(),
                span: LineSpan::new(1, 10),
                start_byte: 0,
                end_byte: 0,
                children: vec![SyntaxNode {
                    kind: "quantum_statement".into(),
                    span: LineSpan::new(2, 4),
                    start_byte: 0,
                    end_byte: 0,
                    children: Vec::new(),
                }],
            },
        };

        let err = resolve(&tree, &hunk(3, 1)).unwrap_err();
        match err {
            FixlensError::UnknownNodeKind { kind, file, span } => {
                assert_eq!(kind, "quantum_statement");
                assert_eq!(file, PathBuf::from("Drift.java"));
                assert_eq!(span, LineSpan::new(2, 4));
            }
            other => panic!("expected UnknownNodeKind, got {other}"),
        }
    }

    #[test]
    fn collect_finds_resolver_reachable_declarations_only() {
        let source = "\
class A {
    A() {}

    void m() {
        class L {
            void n() {}
        }
    }

    Runnable r = new Runnable() {
        public void run() {}
    };
}
";
        let tree = tree_for(source);
        let decls = collect_declarations(&tree).unwrap();
        let names: Vec<_> = decls.iter().map(|d| d.name.as_deref()).collect();
        // `run` hides inside an anonymous class, which resolution cannot
        // reach, so the census skips it for consistency.
        assert_eq!(names, vec![Some("A"), Some("m"), Some("n")]);
    }

    #[test]
    fn collect_on_interface_and_enum_members() {
        let source = "\
interface I {
    default int f() {
        return 1;
    }
}
enum E {
    ONE {
        int g() {
            return 2;
        }
    };
    int g() {
        return 3;
    }
}
";
        let tree = tree_for(source);
        let decls = collect_declarations(&tree).unwrap();
        let names: Vec<_> = decls.iter().map(|d| d.name.as_deref()).collect();
        assert_eq!(names, vec![Some("f"), Some("g"), Some("g")]);
    }
}
