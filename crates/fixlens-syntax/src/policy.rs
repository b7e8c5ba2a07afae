use fixlens_core::{ClassifyConfig, PolicyChoice};

use crate::kinds::NodeKind;
use crate::tree::{SyntaxNode, SyntaxTree};

/// How a policy combines results across a declaration's subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldMode {
    /// Existential: the declaration matches if any traversed node hits.
    /// Identity is "no", a hit is absorbing.
    Any,
    /// Universal: the declaration matches only if no traversed node
    /// disqualifies it. Identity is "yes", a disqualifier is absorbing.
    All,
}

/// What the classifier does when it reaches a node of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindAction {
    /// The kind alone decides: produce the fold's absorbing value and stop.
    Terminal,
    /// The kind is a candidate; ask the policy's [`inspect`] to look at the
    /// concrete node. A positive inspection is absorbing; a negative one
    /// keeps walking the node's children.
    ///
    /// [`inspect`]: KindPolicy::inspect
    Inspect,
    /// The kind says nothing by itself; walk its children.
    Descend,
    /// The kind's whole subtree is irrelevant noise (comments, literals,
    /// type references, and similar); contribute the identity value without
    /// looking inside.
    Stop,
}

/// A structural classification policy: a total mapping from node kinds to
/// actions plus a fold mode.
///
/// Implementations write their kind table as an exhaustive `match` with no
/// wildcard arm, so a taxonomy change forces every policy to be revisited
/// at compile time.
pub trait KindPolicy {
    /// Short name used in reports and logs.
    fn name(&self) -> &'static str;

    /// How subtree results combine.
    fn mode(&self) -> FoldMode;

    /// The kind table.
    fn action(&self, kind: NodeKind) -> KindAction;

    /// Node-level test backing [`KindAction::Inspect`].
    ///
    /// Only called for kinds the table maps to `Inspect`; the default suits
    /// policies that never use `Inspect`.
    fn inspect(&self, tree: &SyntaxTree, node: &SyntaxNode) -> bool {
        let _ = (tree, node);
        false
    }
}

/// Build the configured policy.
///
/// # Examples
///
/// ```
/// use fixlens_core::ClassifyConfig;
/// use fixlens_syntax::policy::build_policy;
///
/// let policy = build_policy(&ClassifyConfig::default());
/// assert_eq!(policy.name(), "assert");
/// ```
pub fn build_policy(config: &ClassifyConfig) -> Box<dyn KindPolicy> {
    match config.policy {
        PolicyChoice::Assert => Box::new(AssertionPolicy::new(config.throw_type.clone())),
        PolicyChoice::Conditional => Box::new(ConditionalPolicy),
        PolicyChoice::Loop => Box::new(LoopPolicy),
        PolicyChoice::Subset => Box::new(RestrictedSubsetPolicy),
    }
}

/// Existential policy for assertion-like constructs.
///
/// Hits on `assert` statements, and on `throw` statements whose thrown
/// expression directly constructs the configured exception type (guard
/// clauses like `throw new IllegalArgumentException(...)`). The type is
/// compared by simple name, so `java.lang.IllegalArgumentException`
/// qualifies too.
#[derive(Debug, Clone)]
pub struct AssertionPolicy {
    throw_type: String,
}

impl AssertionPolicy {
    /// Policy tracking `assert` plus `throw new <throw_type>(...)`.
    pub fn new(throw_type: impl Into<String>) -> Self {
        Self {
            throw_type: throw_type.into(),
        }
    }
}

impl Default for AssertionPolicy {
    fn default() -> Self {
        Self::new("IllegalArgumentException")
    }
}

impl KindPolicy for AssertionPolicy {
    fn name(&self) -> &'static str {
        "assert"
    }

    fn mode(&self) -> FoldMode {
        FoldMode::Any
    }

    fn action(&self, kind: NodeKind) -> KindAction {
        use NodeKind::*;

        match kind {
            AssertStatement => KindAction::Terminal,

            ThrowStatement => KindAction::Inspect,

            // Structure and statements that can carry statements below them.
            Program | ClassDeclaration | ClassBody | InterfaceDeclaration | InterfaceBody
            | EnumDeclaration | EnumBody | EnumBodyDeclarations | EnumConstant
            | RecordDeclaration | AnnotationTypeDeclaration | AnnotationTypeBody
            | ConstantDeclaration | MethodDeclaration | ConstructorDeclaration
            | ConstructorBody | CompactConstructorDeclaration | FieldDeclaration
            | VariableDeclarator | StaticInitializer | Block | ExpressionStatement
            | LabeledStatement | IfStatement | WhileStatement | DoStatement | ForStatement
            | EnhancedForStatement | SwitchExpression | SwitchBlock
            | SwitchBlockStatementGroup | SwitchRule | BreakStatement | ContinueStatement
            | ReturnStatement | YieldStatement | SynchronizedStatement | TryStatement
            | TryWithResourcesStatement | CatchClause | FinallyClause
            | ResourceSpecification | Resource | LocalVariableDeclaration
            | ExplicitConstructorInvocation
            // Expressions: lambdas and anonymous classes nest real statement
            // bodies, so expression kinds stay traversable.
            | AssignmentExpression | BinaryExpression | InstanceofExpression
            | LambdaExpression | TernaryExpression | UpdateExpression | UnaryExpression
            | CastExpression | ArrayCreationExpression | ObjectCreationExpression
            | ArrayInitializer | MethodInvocation | ArgumentList | FieldAccess
            | ArrayAccess | ParenthesizedExpression | TemplateExpression
            | StringInterpolation => KindAction::Descend,

            // Noise: nothing below these can hold an assert-like construct,
            // and text inside them (comments, strings, type names) must not
            // produce spurious hits.
            PackageDeclaration | ImportDeclaration | Asterisk | ModuleDeclaration
            | ModuleBody | RequiresModuleDirective | RequiresModifier
            | ExportsModuleDirective | OpensModuleDirective | UsesModuleDirective
            | ProvidesModuleDirective | Identifier | ScopedIdentifier | TypeIdentifier
            | ScopedTypeIdentifier | AnnotationTypeElementDeclaration | Superclass
            | SuperInterfaces | ExtendsInterfaces | Permits | TypeList | FormalParameters
            | FormalParameter | SpreadParameter | ReceiverParameter | TypeParameters
            | TypeParameter | TypeBound | InferredParameters | Modifiers | Annotation
            | MarkerAnnotation | AnnotationArgumentList | ElementValuePair
            | ElementValueArrayInitializer | VoidType | IntegralType | FloatingPointType
            | BooleanType | ArrayType | GenericType | TypeArguments | Wildcard
            | Dimensions | DimensionsExpr | AnnotatedType | Throws | SwitchLabel
            | CatchFormalParameter | CatchType | MethodReference | This | Super
            | ClassLiteral | Pattern | TypePattern | RecordPattern | RecordPatternBody
            | RecordPatternComponent | UnderscorePattern | Guard | DecimalIntegerLiteral
            | HexIntegerLiteral | OctalIntegerLiteral | BinaryIntegerLiteral
            | DecimalFloatingPointLiteral | HexFloatingPointLiteral | True | False
            | CharacterLiteral | StringLiteral | StringFragment | MultilineStringFragment
            | EscapeSequence | NullLiteral | LineComment | BlockComment => KindAction::Stop,
        }
    }

    fn inspect(&self, tree: &SyntaxTree, node: &SyntaxNode) -> bool {
        // The thrown expression is the first named child that is not a
        // comment.
        let thrown = node
            .children
            .iter()
            .find(|c| !matches!(c.kind.as_str(), "line_comment" | "block_comment"));
        let Some(thrown) = thrown else { return false };
        if thrown.kind != "object_creation_expression" {
            return false;
        }
        constructed_simple_name(tree, thrown) == Some(self.throw_type.as_str())
    }
}

/// Simple name of the type an `object_creation_expression` constructs.
fn constructed_simple_name<'t>(tree: &'t SyntaxTree, creation: &SyntaxNode) -> Option<&'t str> {
    let type_node = creation.children.iter().find(|c| {
        matches!(
            c.kind.as_str(),
            "type_identifier" | "scoped_type_identifier" | "generic_type"
        )
    })?;
    type_simple_name(tree, type_node)
}

fn type_simple_name<'t>(tree: &'t SyntaxTree, node: &SyntaxNode) -> Option<&'t str> {
    match node.kind.as_str() {
        "type_identifier" => Some(node.text(tree)),
        // The trailing segment of `a.b.Exc` is the simple name.
        "scoped_type_identifier" => node
            .children
            .iter()
            .rev()
            .find(|c| c.kind == "type_identifier")
            .map(|c| c.text(tree)),
        "generic_type" => node.children.first().and_then(|c| type_simple_name(tree, c)),
        _ => None,
    }
}

/// Existential policy for branching constructs: `if` and `switch`.
///
/// The grammar produces `switch_expression` for statement and expression
/// switches alike, so both count.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalPolicy;

impl KindPolicy for ConditionalPolicy {
    fn name(&self) -> &'static str {
        "conditional"
    }

    fn mode(&self) -> FoldMode {
        FoldMode::Any
    }

    fn action(&self, kind: NodeKind) -> KindAction {
        use NodeKind::*;

        match kind {
            IfStatement | SwitchExpression => KindAction::Terminal,

            Program | ClassDeclaration | ClassBody | InterfaceDeclaration | InterfaceBody
            | EnumDeclaration | EnumBody | EnumBodyDeclarations | EnumConstant
            | RecordDeclaration | AnnotationTypeDeclaration | AnnotationTypeBody
            | ConstantDeclaration | MethodDeclaration | ConstructorDeclaration
            | ConstructorBody | CompactConstructorDeclaration | FieldDeclaration
            | VariableDeclarator | StaticInitializer | Block | ExpressionStatement
            | LabeledStatement | WhileStatement | DoStatement | ForStatement
            | EnhancedForStatement | SwitchBlock | SwitchBlockStatementGroup | SwitchRule
            | BreakStatement | ContinueStatement | ReturnStatement | YieldStatement
            | SynchronizedStatement | AssertStatement | ThrowStatement | TryStatement
            | TryWithResourcesStatement | CatchClause | FinallyClause
            | ResourceSpecification | Resource | LocalVariableDeclaration
            | ExplicitConstructorInvocation | AssignmentExpression | BinaryExpression
            | InstanceofExpression | LambdaExpression | TernaryExpression
            | UpdateExpression | UnaryExpression | CastExpression
            | ArrayCreationExpression | ObjectCreationExpression | ArrayInitializer
            | MethodInvocation | ArgumentList | FieldAccess | ArrayAccess
            | ParenthesizedExpression | TemplateExpression | StringInterpolation => {
                KindAction::Descend
            }

            PackageDeclaration | ImportDeclaration | Asterisk | ModuleDeclaration
            | ModuleBody | RequiresModuleDirective | RequiresModifier
            | ExportsModuleDirective | OpensModuleDirective | UsesModuleDirective
            | ProvidesModuleDirective | Identifier | ScopedIdentifier | TypeIdentifier
            | ScopedTypeIdentifier | AnnotationTypeElementDeclaration | Superclass
            | SuperInterfaces | ExtendsInterfaces | Permits | TypeList | FormalParameters
            | FormalParameter | SpreadParameter | ReceiverParameter | TypeParameters
            | TypeParameter | TypeBound | InferredParameters | Modifiers | Annotation
            | MarkerAnnotation | AnnotationArgumentList | ElementValuePair
            | ElementValueArrayInitializer | VoidType | IntegralType | FloatingPointType
            | BooleanType | ArrayType | GenericType | TypeArguments | Wildcard
            | Dimensions | DimensionsExpr | AnnotatedType | Throws | SwitchLabel
            | CatchFormalParameter | CatchType | MethodReference | This | Super
            | ClassLiteral | Pattern | TypePattern | RecordPattern | RecordPatternBody
            | RecordPatternComponent | UnderscorePattern | Guard | DecimalIntegerLiteral
            | HexIntegerLiteral | OctalIntegerLiteral | BinaryIntegerLiteral
            | DecimalFloatingPointLiteral | HexFloatingPointLiteral | True | False
            | CharacterLiteral | StringLiteral | StringFragment | MultilineStringFragment
            | EscapeSequence | NullLiteral | LineComment | BlockComment => KindAction::Stop,
        }
    }
}

/// Existential policy for iteration constructs: `while` and classic `for`.
///
/// `do` and for-each loops deliberately do not count; they descend instead,
/// keeping this measurement comparable with the historical definition it
/// reproduces. Widening the policy is a matter of moving those two arms.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopPolicy;

impl KindPolicy for LoopPolicy {
    fn name(&self) -> &'static str {
        "loop"
    }

    fn mode(&self) -> FoldMode {
        FoldMode::Any
    }

    fn action(&self, kind: NodeKind) -> KindAction {
        use NodeKind::*;

        match kind {
            WhileStatement | ForStatement => KindAction::Terminal,

            Program | ClassDeclaration | ClassBody | InterfaceDeclaration | InterfaceBody
            | EnumDeclaration | EnumBody | EnumBodyDeclarations | EnumConstant
            | RecordDeclaration | AnnotationTypeDeclaration | AnnotationTypeBody
            | ConstantDeclaration | MethodDeclaration | ConstructorDeclaration
            | ConstructorBody | CompactConstructorDeclaration | FieldDeclaration
            | VariableDeclarator | StaticInitializer | Block | ExpressionStatement
            | LabeledStatement | IfStatement | DoStatement | EnhancedForStatement
            | SwitchExpression | SwitchBlock | SwitchBlockStatementGroup | SwitchRule
            | BreakStatement | ContinueStatement | ReturnStatement | YieldStatement
            | SynchronizedStatement | AssertStatement | ThrowStatement | TryStatement
            | TryWithResourcesStatement | CatchClause | FinallyClause
            | ResourceSpecification | Resource | LocalVariableDeclaration
            | ExplicitConstructorInvocation | AssignmentExpression | BinaryExpression
            | InstanceofExpression | LambdaExpression | TernaryExpression
            | UpdateExpression | UnaryExpression | CastExpression
            | ArrayCreationExpression | ObjectCreationExpression | ArrayInitializer
            | MethodInvocation | ArgumentList | FieldAccess | ArrayAccess
            | ParenthesizedExpression | TemplateExpression | StringInterpolation => {
                KindAction::Descend
            }

            PackageDeclaration | ImportDeclaration | Asterisk | ModuleDeclaration
            | ModuleBody | RequiresModuleDirective | RequiresModifier
            | ExportsModuleDirective | OpensModuleDirective | UsesModuleDirective
            | ProvidesModuleDirective | Identifier | ScopedIdentifier | TypeIdentifier
            | ScopedTypeIdentifier | AnnotationTypeElementDeclaration | Superclass
            | SuperInterfaces | ExtendsInterfaces | Permits | TypeList | FormalParameters
            | FormalParameter | SpreadParameter | ReceiverParameter | TypeParameters
            | TypeParameter | TypeBound | InferredParameters | Modifiers | Annotation
            | MarkerAnnotation | AnnotationArgumentList | ElementValuePair
            | ElementValueArrayInitializer | VoidType | IntegralType | FloatingPointType
            | BooleanType | ArrayType | GenericType | TypeArguments | Wildcard
            | Dimensions | DimensionsExpr | AnnotatedType | Throws | SwitchLabel
            | CatchFormalParameter | CatchType | MethodReference | This | Super
            | ClassLiteral | Pattern | TypePattern | RecordPattern | RecordPatternBody
            | RecordPatternComponent | UnderscorePattern | Guard | DecimalIntegerLiteral
            | HexIntegerLiteral | OctalIntegerLiteral | BinaryIntegerLiteral
            | DecimalFloatingPointLiteral | HexFloatingPointLiteral | True | False
            | CharacterLiteral | StringLiteral | StringFragment | MultilineStringFragment
            | EscapeSequence | NullLiteral | LineComment | BlockComment => KindAction::Stop,
        }
    }
}

/// Universal policy: is the declaration expressible in a restricted
/// value-oriented subset of the language?
///
/// A declaration qualifies only if its whole traversed subtree avoids
/// throwing, object construction, and class/interface type references.
/// Primitive types, literals, plain identifiers, and comments pass without
/// descent; nearly everything else is traversed so that a disqualifying
/// type reference anywhere — parameter types, casts, catch clauses, class
/// literals — is found.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestrictedSubsetPolicy;

impl KindPolicy for RestrictedSubsetPolicy {
    fn name(&self) -> &'static str {
        "subset"
    }

    fn mode(&self) -> FoldMode {
        FoldMode::All
    }

    fn action(&self, kind: NodeKind) -> KindAction {
        use NodeKind::*;

        match kind {
            // Disqualifiers.
            ThrowStatement | ObjectCreationExpression | TypeIdentifier
            | ScopedTypeIdentifier | GenericType => KindAction::Terminal,

            // Always acceptable, nothing interesting below.
            PackageDeclaration | ImportDeclaration | Asterisk | ModuleDeclaration
            | ModuleBody | RequiresModuleDirective | RequiresModifier
            | ExportsModuleDirective | OpensModuleDirective | UsesModuleDirective
            | ProvidesModuleDirective | Identifier | ScopedIdentifier | VoidType
            | IntegralType | FloatingPointType | BooleanType | This | Super
            | UnderscorePattern | DecimalIntegerLiteral | HexIntegerLiteral
            | OctalIntegerLiteral | BinaryIntegerLiteral | DecimalFloatingPointLiteral
            | HexFloatingPointLiteral | True | False | CharacterLiteral | StringLiteral
            | StringFragment | MultilineStringFragment | EscapeSequence | NullLiteral
            | LineComment | BlockComment => KindAction::Stop,

            // Traverse everything else looking for disqualifiers.
            Program | ClassDeclaration | ClassBody | InterfaceDeclaration | InterfaceBody
            | EnumDeclaration | EnumBody | EnumBodyDeclarations | EnumConstant
            | RecordDeclaration | AnnotationTypeDeclaration | AnnotationTypeBody
            | AnnotationTypeElementDeclaration | ConstantDeclaration | MethodDeclaration
            | ConstructorDeclaration | ConstructorBody | CompactConstructorDeclaration
            | FieldDeclaration | VariableDeclarator | StaticInitializer | Superclass
            | SuperInterfaces | ExtendsInterfaces | Permits | TypeList | FormalParameters
            | FormalParameter | SpreadParameter | ReceiverParameter | TypeParameters
            | TypeParameter | TypeBound | InferredParameters | Modifiers | Annotation
            | MarkerAnnotation | AnnotationArgumentList | ElementValuePair
            | ElementValueArrayInitializer | ArrayType | TypeArguments | Wildcard
            | Dimensions | DimensionsExpr | AnnotatedType | Throws | Block
            | ExpressionStatement | LabeledStatement | IfStatement | WhileStatement
            | DoStatement | ForStatement | EnhancedForStatement | AssertStatement
            | SwitchExpression | SwitchBlock | SwitchBlockStatementGroup | SwitchRule
            | SwitchLabel | BreakStatement | ContinueStatement | ReturnStatement
            | YieldStatement | SynchronizedStatement | TryStatement
            | TryWithResourcesStatement | CatchClause | CatchFormalParameter | CatchType
            | FinallyClause | ResourceSpecification | Resource | LocalVariableDeclaration
            | ExplicitConstructorInvocation | AssignmentExpression | BinaryExpression
            | InstanceofExpression | LambdaExpression | TernaryExpression
            | UpdateExpression | UnaryExpression | CastExpression
            | ArrayCreationExpression | ArrayInitializer | MethodInvocation
            | ArgumentList | MethodReference | FieldAccess | ArrayAccess
            | ParenthesizedExpression | ClassLiteral | TemplateExpression
            | StringInterpolation | Pattern | TypePattern | RecordPattern
            | RecordPatternBody | RecordPatternComponent | Guard => KindAction::Descend,
        }
    }
}
