use std::fmt;

/// Declares [`NodeKind`] together with its grammar-string mapping.
///
/// Keeping the variant list and both lookup directions in one place means a
/// kind cannot exist without a grammar string or vice versa; the `ALL` slice
/// lets tests prove the mapping is a bijection.
macro_rules! node_kinds {
    ($($variant:ident => $grammar:literal,)*) => {
        /// The closed taxonomy of named Java grammar node kinds.
        ///
        /// Every named node the Java grammar can produce has exactly one
        /// variant here. The enum is deliberately closed: role and policy
        /// tables match on it without a wildcard arm, so adding a variant
        /// (after a grammar upgrade) makes every table that has not
        /// considered the new kind fail to compile. A grammar string with no
        /// variant is reported by [`NodeKind::from_grammar`] as `None`, which
        /// traversals turn into a fatal
        /// [`UnknownNodeKind`](fixlens_core::FixlensError::UnknownNodeKind)
        /// error rather than guessing.
        ///
        /// # Examples
        ///
        /// ```
        /// use fixlens_syntax::kinds::NodeKind;
        ///
        /// let kind = NodeKind::from_grammar("assert_statement").unwrap();
        /// assert_eq!(kind, NodeKind::AssertStatement);
        /// assert_eq!(kind.as_grammar(), "assert_statement");
        /// assert!(NodeKind::from_grammar("quantum_statement").is_none());
        /// ```
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($variant,)*
        }

        impl NodeKind {
            /// Every variant, in declaration order.
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$variant,)*];

            /// Look up the variant for a grammar kind string.
            ///
            /// Returns `None` for kinds outside the taxonomy, including the
            /// `ERROR` node (error-bearing trees are rejected at parse time
            /// and never traversed).
            pub fn from_grammar(kind: &str) -> Option<NodeKind> {
                match kind {
                    $($grammar => Some(NodeKind::$variant),)*
                    _ => None,
                }
            }

            /// The grammar kind string this variant stands for.
            pub fn as_grammar(self) -> &'static str {
                match self {
                    $(NodeKind::$variant => $grammar,)*
                }
            }
        }
    };
}

node_kinds! {
    // File structure and the module system.
    Program => "program",
    PackageDeclaration => "package_declaration",
    ImportDeclaration => "import_declaration",
    Asterisk => "asterisk",
    ModuleDeclaration => "module_declaration",
    ModuleBody => "module_body",
    RequiresModuleDirective => "requires_module_directive",
    RequiresModifier => "requires_modifier",
    ExportsModuleDirective => "exports_module_directive",
    OpensModuleDirective => "opens_module_directive",
    UsesModuleDirective => "uses_module_directive",
    ProvidesModuleDirective => "provides_module_directive",

    // Names.
    Identifier => "identifier",
    ScopedIdentifier => "scoped_identifier",
    TypeIdentifier => "type_identifier",
    ScopedTypeIdentifier => "scoped_type_identifier",

    // Type declarations and their members.
    ClassDeclaration => "class_declaration",
    ClassBody => "class_body",
    InterfaceDeclaration => "interface_declaration",
    InterfaceBody => "interface_body",
    EnumDeclaration => "enum_declaration",
    EnumBody => "enum_body",
    EnumBodyDeclarations => "enum_body_declarations",
    EnumConstant => "enum_constant",
    RecordDeclaration => "record_declaration",
    AnnotationTypeDeclaration => "annotation_type_declaration",
    AnnotationTypeBody => "annotation_type_body",
    AnnotationTypeElementDeclaration => "annotation_type_element_declaration",
    ConstantDeclaration => "constant_declaration",
    MethodDeclaration => "method_declaration",
    ConstructorDeclaration => "constructor_declaration",
    ConstructorBody => "constructor_body",
    CompactConstructorDeclaration => "compact_constructor_declaration",
    FieldDeclaration => "field_declaration",
    VariableDeclarator => "variable_declarator",
    StaticInitializer => "static_initializer",

    // Clauses of a type declaration's header.
    Superclass => "superclass",
    SuperInterfaces => "super_interfaces",
    ExtendsInterfaces => "extends_interfaces",
    Permits => "permits",
    TypeList => "type_list",

    // Parameters and generics.
    FormalParameters => "formal_parameters",
    FormalParameter => "formal_parameter",
    SpreadParameter => "spread_parameter",
    ReceiverParameter => "receiver_parameter",
    TypeParameters => "type_parameters",
    TypeParameter => "type_parameter",
    TypeBound => "type_bound",
    InferredParameters => "inferred_parameters",

    // Modifiers and annotations.
    Modifiers => "modifiers",
    Annotation => "annotation",
    MarkerAnnotation => "marker_annotation",
    AnnotationArgumentList => "annotation_argument_list",
    ElementValuePair => "element_value_pair",
    ElementValueArrayInitializer => "element_value_array_initializer",

    // Types.
    VoidType => "void_type",
    IntegralType => "integral_type",
    FloatingPointType => "floating_point_type",
    BooleanType => "boolean_type",
    ArrayType => "array_type",
    GenericType => "generic_type",
    TypeArguments => "type_arguments",
    Wildcard => "wildcard",
    Dimensions => "dimensions",
    DimensionsExpr => "dimensions_expr",
    AnnotatedType => "annotated_type",
    Throws => "throws",

    // Statements.
    Block => "block",
    ExpressionStatement => "expression_statement",
    LabeledStatement => "labeled_statement",
    IfStatement => "if_statement",
    WhileStatement => "while_statement",
    DoStatement => "do_statement",
    ForStatement => "for_statement",
    EnhancedForStatement => "enhanced_for_statement",
    AssertStatement => "assert_statement",
    SwitchExpression => "switch_expression",
    SwitchBlock => "switch_block",
    SwitchBlockStatementGroup => "switch_block_statement_group",
    SwitchRule => "switch_rule",
    SwitchLabel => "switch_label",
    BreakStatement => "break_statement",
    ContinueStatement => "continue_statement",
    ReturnStatement => "return_statement",
    YieldStatement => "yield_statement",
    SynchronizedStatement => "synchronized_statement",
    ThrowStatement => "throw_statement",
    TryStatement => "try_statement",
    TryWithResourcesStatement => "try_with_resources_statement",
    CatchClause => "catch_clause",
    CatchFormalParameter => "catch_formal_parameter",
    CatchType => "catch_type",
    FinallyClause => "finally_clause",
    ResourceSpecification => "resource_specification",
    Resource => "resource",
    LocalVariableDeclaration => "local_variable_declaration",
    ExplicitConstructorInvocation => "explicit_constructor_invocation",

    // Expressions.
    AssignmentExpression => "assignment_expression",
    BinaryExpression => "binary_expression",
    InstanceofExpression => "instanceof_expression",
    LambdaExpression => "lambda_expression",
    TernaryExpression => "ternary_expression",
    UpdateExpression => "update_expression",
    UnaryExpression => "unary_expression",
    CastExpression => "cast_expression",
    ArrayCreationExpression => "array_creation_expression",
    ObjectCreationExpression => "object_creation_expression",
    ArrayInitializer => "array_initializer",
    MethodInvocation => "method_invocation",
    ArgumentList => "argument_list",
    MethodReference => "method_reference",
    FieldAccess => "field_access",
    ArrayAccess => "array_access",
    ParenthesizedExpression => "parenthesized_expression",
    This => "this",
    Super => "super",
    ClassLiteral => "class_literal",
    TemplateExpression => "template_expression",

    // Patterns.
    Pattern => "pattern",
    TypePattern => "type_pattern",
    RecordPattern => "record_pattern",
    RecordPatternBody => "record_pattern_body",
    RecordPatternComponent => "record_pattern_component",
    UnderscorePattern => "underscore_pattern",
    Guard => "guard",

    // Literals.
    DecimalIntegerLiteral => "decimal_integer_literal",
    HexIntegerLiteral => "hex_integer_literal",
    OctalIntegerLiteral => "octal_integer_literal",
    BinaryIntegerLiteral => "binary_integer_literal",
    DecimalFloatingPointLiteral => "decimal_floating_point_literal",
    HexFloatingPointLiteral => "hex_floating_point_literal",
    True => "true",
    False => "false",
    CharacterLiteral => "character_literal",
    StringLiteral => "string_literal",
    StringFragment => "string_fragment",
    MultilineStringFragment => "multiline_string_fragment",
    StringInterpolation => "string_interpolation",
    EscapeSequence => "escape_sequence",
    NullLiteral => "null_literal",

    // Comments (extras; they can appear anywhere among named children).
    LineComment => "line_comment",
    BlockComment => "block_comment",
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_grammar())
    }
}
