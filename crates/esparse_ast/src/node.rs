//! AST node definitions.
//!
//! A [`Node`] pairs the location data shared by every node ([`NodeData`])
//! with a [`NodeKind`] that has one variant per grammar production. Child
//! nodes are arena-allocated references. The tree serialises to the
//! Babylon JSON shape: every node is an object with a `type` tag, its
//! production fields, and `start`, `end` and `loc`.

use crate::token::Token;
use esparse_core::text::{Position, SourceLocation};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// The line/column span of a node, tagged with the source file name when
/// the parser was given one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeLocation<'a> {
    pub start: Position,
    pub end: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<&'a str>,
}

impl<'a> NodeLocation<'a> {
    pub fn new(loc: SourceLocation, filename: Option<&'a str>) -> Self {
        Self {
            start: loc.start,
            end: loc.end,
            filename,
        }
    }
}

impl From<SourceLocation> for NodeLocation<'_> {
    fn from(loc: SourceLocation) -> Self {
        Self::new(loc, None)
    }
}

/// Location and comment data shared by all AST nodes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData<'a> {
    pub start: u32,
    pub end: u32,
    pub loc: NodeLocation<'a>,
    /// Start of the outermost parenthesis wrapping this expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paren_start: Option<u32>,
    #[serde(skip_serializing_if = "no_comments")]
    pub leading_comments: Cell<&'a [Comment<'a>]>,
    #[serde(skip_serializing_if = "no_comments")]
    pub trailing_comments: Cell<&'a [Comment<'a>]>,
    #[serde(skip_serializing_if = "no_comments")]
    pub inner_comments: Cell<&'a [Comment<'a>]>,
}

impl<'a> NodeData<'a> {
    pub fn new(start: u32, end: u32, loc: impl Into<NodeLocation<'a>>) -> Self {
        Self {
            start,
            end,
            loc: loc.into(),
            paren_start: None,
            leading_comments: Cell::new(&[]),
            trailing_comments: Cell::new(&[]),
            inner_comments: Cell::new(&[]),
        }
    }
}

fn no_comments(comments: &Cell<&[Comment<'_>]>) -> bool {
    comments.get().is_empty()
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_empty<T>(slice: &&[T]) -> bool {
    slice.is_empty()
}

/// An AST node.
#[derive(Debug, Clone, Serialize)]
pub struct Node<'a> {
    #[serde(flatten)]
    pub kind: NodeKind<'a>,
    #[serde(flatten)]
    pub data: NodeData<'a>,
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a> = &'a [Node<'a>];

/// An optional arena-allocated node.
pub type OptionalNode<'a> = Option<&'a Node<'a>>;

impl<'a> Node<'a> {
    #[inline]
    pub fn new(kind: NodeKind<'a>, data: NodeData<'a>) -> Self {
        Self { kind, data }
    }

    #[inline]
    pub fn start(&self) -> u32 {
        self.data.start
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.data.end
    }

    /// Whether this expression was wrapped in parentheses.
    #[inline]
    pub fn is_parenthesized(&self) -> bool {
        self.data.paren_start.is_some()
    }

    /// The identifier name, if this is an `Identifier`.
    #[inline]
    pub fn identifier_name(&self) -> Option<&'a str> {
        match self.kind {
            NodeKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }
}

// ============================================================================
// Comments and File
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    #[serde(rename = "CommentBlock")]
    Block,
    #[serde(rename = "CommentLine")]
    Line,
}

/// A comment. `value` excludes the delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Comment<'a> {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub value: &'a str,
    pub start: u32,
    pub end: u32,
    pub loc: SourceLocation,
}

/// The root of a parse result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "File")]
pub struct File<'a> {
    pub program: Node<'a>,
    pub comments: &'a [Comment<'a>],
    pub tokens: &'a [Token<'a>],
    pub start: u32,
    pub end: u32,
    pub loc: NodeLocation<'a>,
}

impl<'a> File<'a> {
    /// The top-level statements of the program.
    pub fn body(&self) -> NodeList<'a> {
        match self.program.kind {
            NodeKind::Program { body, .. } => body,
            _ => &[],
        }
    }
}

// ============================================================================
// Small enumerations
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Script,
    Module,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodKind {
    Constructor,
    ConstructorCall,
    Method,
    Get,
    Set,
}

/// Whether an import/export moves values or only types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    #[default]
    Value,
    Type,
    Typeof,
}

/// Raw and cooked text of a template chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateValue<'a> {
    pub raw: &'a str,
    pub cooked: &'a str,
}

// ============================================================================
// Shared production bodies
// ============================================================================

/// Fields shared by function declarations, expressions, arrows and methods.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Function<'a> {
    pub id: OptionalNode<'a>,
    pub generator: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    /// Arrow function with an expression body.
    pub expression: bool,
    pub params: NodeList<'a>,
    pub body: &'a Node<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: OptionalNode<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: OptionalNode<'a>,
}

/// An object or class method.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Method<'a> {
    pub kind: MethodKind,
    pub key: &'a Node<'a>,
    pub computed: bool,
    #[serde(rename = "static", skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(skip_serializing_if = "is_empty")]
    pub decorators: NodeList<'a>,
    #[serde(flatten)]
    pub function: Function<'a>,
}

/// Fields shared by class declarations and expressions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class<'a> {
    pub id: OptionalNode<'a>,
    pub super_class: OptionalNode<'a>,
    pub body: &'a Node<'a>,
    #[serde(skip_serializing_if = "is_empty")]
    pub decorators: NodeList<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: OptionalNode<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_type_parameters: OptionalNode<'a>,
    #[serde(skip_serializing_if = "is_empty")]
    pub implements: NodeList<'a>,
}

// ============================================================================
// Node kinds
// ============================================================================

/// One variant per grammar production.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum NodeKind<'a> {
    Program {
        source_type: SourceType,
        body: NodeList<'a>,
        directives: NodeList<'a>,
    },

    // -- Literals and identifiers --
    Identifier {
        name: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptionalNode<'a>,
        #[serde(skip_serializing_if = "is_false")]
        optional: bool,
    },
    RegExpLiteral {
        pattern: &'a str,
        flags: &'a str,
        raw: &'a str,
    },
    NullLiteral,
    StringLiteral {
        value: &'a str,
        raw: &'a str,
    },
    BooleanLiteral {
        value: bool,
    },
    NumericLiteral {
        value: f64,
        raw: &'a str,
    },
    Directive {
        value: &'a Node<'a>,
    },
    DirectiveLiteral {
        value: &'a str,
        raw: &'a str,
    },

    // -- Statements --
    ExpressionStatement {
        expression: &'a Node<'a>,
    },
    BlockStatement {
        body: NodeList<'a>,
        directives: NodeList<'a>,
    },
    EmptyStatement,
    DebuggerStatement,
    WithStatement {
        object: &'a Node<'a>,
        body: &'a Node<'a>,
    },
    ReturnStatement {
        argument: OptionalNode<'a>,
    },
    LabeledStatement {
        label: &'a Node<'a>,
        body: &'a Node<'a>,
    },
    BreakStatement {
        label: OptionalNode<'a>,
    },
    ContinueStatement {
        label: OptionalNode<'a>,
    },
    IfStatement {
        test: &'a Node<'a>,
        consequent: &'a Node<'a>,
        alternate: OptionalNode<'a>,
    },
    SwitchStatement {
        discriminant: &'a Node<'a>,
        cases: NodeList<'a>,
    },
    SwitchCase {
        test: OptionalNode<'a>,
        consequent: NodeList<'a>,
    },
    ThrowStatement {
        argument: &'a Node<'a>,
    },
    TryStatement {
        block: &'a Node<'a>,
        handler: OptionalNode<'a>,
        finalizer: OptionalNode<'a>,
    },
    CatchClause {
        param: &'a Node<'a>,
        body: &'a Node<'a>,
    },
    WhileStatement {
        test: &'a Node<'a>,
        body: &'a Node<'a>,
    },
    DoWhileStatement {
        body: &'a Node<'a>,
        test: &'a Node<'a>,
    },
    ForStatement {
        init: OptionalNode<'a>,
        test: OptionalNode<'a>,
        update: OptionalNode<'a>,
        body: &'a Node<'a>,
    },
    ForInStatement {
        left: &'a Node<'a>,
        right: &'a Node<'a>,
        body: &'a Node<'a>,
    },
    ForOfStatement {
        left: &'a Node<'a>,
        right: &'a Node<'a>,
        body: &'a Node<'a>,
    },
    ForAwaitStatement {
        left: &'a Node<'a>,
        right: &'a Node<'a>,
        body: &'a Node<'a>,
    },

    // -- Declarations --
    FunctionDeclaration(Function<'a>),
    VariableDeclaration {
        kind: VarKind,
        declarations: NodeList<'a>,
    },
    VariableDeclarator {
        id: &'a Node<'a>,
        init: OptionalNode<'a>,
    },
    ClassDeclaration(Class<'a>),
    ClassBody {
        body: NodeList<'a>,
    },
    ClassMethod(Method<'a>),
    ClassProperty {
        key: &'a Node<'a>,
        value: OptionalNode<'a>,
        computed: bool,
        #[serde(rename = "static")]
        is_static: bool,
        #[serde(skip_serializing_if = "is_empty")]
        decorators: NodeList<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptionalNode<'a>,
    },
    Decorator {
        expression: &'a Node<'a>,
    },

    // -- Modules --
    ImportDeclaration {
        specifiers: NodeList<'a>,
        source: &'a Node<'a>,
        import_kind: ImportKind,
    },
    ImportSpecifier {
        imported: &'a Node<'a>,
        local: &'a Node<'a>,
    },
    ImportDefaultSpecifier {
        local: &'a Node<'a>,
    },
    ImportNamespaceSpecifier {
        local: &'a Node<'a>,
    },
    ExportNamedDeclaration {
        declaration: OptionalNode<'a>,
        specifiers: NodeList<'a>,
        source: OptionalNode<'a>,
        export_kind: ImportKind,
    },
    ExportDefaultDeclaration {
        declaration: &'a Node<'a>,
    },
    ExportAllDeclaration {
        source: &'a Node<'a>,
    },
    ExportSpecifier {
        local: &'a Node<'a>,
        exported: &'a Node<'a>,
    },
    ExportDefaultSpecifier {
        exported: &'a Node<'a>,
    },
    ExportNamespaceSpecifier {
        exported: &'a Node<'a>,
    },

    // -- Expressions --
    ThisExpression,
    Super,
    ArrayExpression {
        elements: &'a [Option<Node<'a>>],
    },
    ObjectExpression {
        properties: NodeList<'a>,
    },
    ObjectProperty {
        key: &'a Node<'a>,
        value: &'a Node<'a>,
        computed: bool,
        shorthand: bool,
        #[serde(skip_serializing_if = "is_empty")]
        decorators: NodeList<'a>,
    },
    ObjectMethod(Method<'a>),
    SpreadElement {
        argument: &'a Node<'a>,
    },
    SpreadProperty {
        argument: &'a Node<'a>,
    },
    FunctionExpression(Function<'a>),
    ArrowFunctionExpression(Function<'a>),
    ClassExpression(Class<'a>),
    UnaryExpression {
        operator: &'a str,
        prefix: bool,
        argument: &'a Node<'a>,
    },
    UpdateExpression {
        operator: &'a str,
        prefix: bool,
        argument: &'a Node<'a>,
    },
    BinaryExpression {
        operator: &'a str,
        left: &'a Node<'a>,
        right: &'a Node<'a>,
    },
    LogicalExpression {
        operator: &'a str,
        left: &'a Node<'a>,
        right: &'a Node<'a>,
    },
    AssignmentExpression {
        operator: &'a str,
        left: &'a Node<'a>,
        right: &'a Node<'a>,
    },
    ConditionalExpression {
        test: &'a Node<'a>,
        consequent: &'a Node<'a>,
        alternate: &'a Node<'a>,
    },
    CallExpression {
        callee: &'a Node<'a>,
        arguments: NodeList<'a>,
    },
    NewExpression {
        callee: &'a Node<'a>,
        arguments: NodeList<'a>,
    },
    SequenceExpression {
        expressions: NodeList<'a>,
    },
    MemberExpression {
        object: &'a Node<'a>,
        property: &'a Node<'a>,
        computed: bool,
    },
    TemplateLiteral {
        quasis: NodeList<'a>,
        expressions: NodeList<'a>,
    },
    TemplateElement {
        value: TemplateValue<'a>,
        tail: bool,
    },
    TaggedTemplateExpression {
        tag: &'a Node<'a>,
        quasi: &'a Node<'a>,
    },
    MetaProperty {
        meta: &'a Node<'a>,
        property: &'a Node<'a>,
    },
    YieldExpression {
        argument: OptionalNode<'a>,
        delegate: bool,
    },
    AwaitExpression {
        argument: &'a Node<'a>,
    },
    BindExpression {
        object: OptionalNode<'a>,
        callee: &'a Node<'a>,
    },
    DoExpression {
        body: &'a Node<'a>,
    },

    // -- Patterns --
    ObjectPattern {
        properties: NodeList<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptionalNode<'a>,
    },
    ArrayPattern {
        elements: &'a [Option<Node<'a>>],
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptionalNode<'a>,
    },
    AssignmentPattern {
        left: &'a Node<'a>,
        right: &'a Node<'a>,
    },
    RestElement {
        argument: &'a Node<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        type_annotation: OptionalNode<'a>,
    },
    RestProperty {
        argument: &'a Node<'a>,
    },

    // -- JSX --
    #[serde(rename = "JSXIdentifier")]
    JsxIdentifier {
        name: &'a str,
    },
    #[serde(rename = "JSXNamespacedName")]
    JsxNamespacedName {
        namespace: &'a Node<'a>,
        name: &'a Node<'a>,
    },
    #[serde(rename = "JSXMemberExpression")]
    JsxMemberExpression {
        object: &'a Node<'a>,
        property: &'a Node<'a>,
    },
    #[serde(rename = "JSXEmptyExpression")]
    JsxEmptyExpression,
    #[serde(rename = "JSXExpressionContainer")]
    JsxExpressionContainer {
        expression: &'a Node<'a>,
    },
    #[serde(rename = "JSXSpreadAttribute")]
    JsxSpreadAttribute {
        argument: &'a Node<'a>,
    },
    #[serde(rename = "JSXAttribute")]
    JsxAttribute {
        name: &'a Node<'a>,
        value: OptionalNode<'a>,
    },
    #[serde(rename = "JSXOpeningElement")]
    JsxOpeningElement {
        name: &'a Node<'a>,
        attributes: NodeList<'a>,
        self_closing: bool,
    },
    #[serde(rename = "JSXClosingElement")]
    JsxClosingElement {
        name: &'a Node<'a>,
    },
    #[serde(rename = "JSXElement")]
    JsxElement {
        opening_element: &'a Node<'a>,
        closing_element: OptionalNode<'a>,
        children: NodeList<'a>,
    },
    #[serde(rename = "JSXText")]
    JsxText {
        value: &'a str,
        raw: &'a str,
    },

    // -- Type annotations --
    TypeAnnotation {
        type_annotation: &'a Node<'a>,
    },
    TypeCastExpression {
        expression: &'a Node<'a>,
        type_annotation: &'a Node<'a>,
    },
    AnyTypeAnnotation,
    MixedTypeAnnotation,
    EmptyTypeAnnotation,
    BooleanTypeAnnotation,
    NumberTypeAnnotation,
    StringTypeAnnotation,
    VoidTypeAnnotation,
    NullLiteralTypeAnnotation,
    ThisTypeAnnotation,
    StringLiteralTypeAnnotation {
        value: &'a str,
        raw: &'a str,
    },
    NumericLiteralTypeAnnotation {
        value: f64,
        raw: &'a str,
    },
    BooleanLiteralTypeAnnotation {
        value: bool,
    },
    NullableTypeAnnotation {
        type_annotation: &'a Node<'a>,
    },
    ArrayTypeAnnotation {
        element_type: &'a Node<'a>,
    },
    UnionTypeAnnotation {
        types: NodeList<'a>,
    },
    IntersectionTypeAnnotation {
        types: NodeList<'a>,
    },
    TupleTypeAnnotation {
        types: NodeList<'a>,
    },
    TypeofTypeAnnotation {
        argument: &'a Node<'a>,
    },
    GenericTypeAnnotation {
        id: &'a Node<'a>,
        type_parameters: OptionalNode<'a>,
    },
    QualifiedTypeIdentifier {
        qualification: &'a Node<'a>,
        id: &'a Node<'a>,
    },
    FunctionTypeAnnotation {
        type_parameters: OptionalNode<'a>,
        params: NodeList<'a>,
        rest: OptionalNode<'a>,
        return_type: &'a Node<'a>,
    },
    FunctionTypeParam {
        name: OptionalNode<'a>,
        type_annotation: &'a Node<'a>,
        optional: bool,
    },
    ObjectTypeAnnotation {
        properties: NodeList<'a>,
        indexers: NodeList<'a>,
        /// Written with `{|` and `|}`.
        exact: bool,
    },
    ObjectTypeProperty {
        key: &'a Node<'a>,
        value: &'a Node<'a>,
        optional: bool,
        method: bool,
        #[serde(rename = "static")]
        is_static: bool,
    },
    ObjectTypeIndexer {
        id: OptionalNode<'a>,
        key: &'a Node<'a>,
        value: &'a Node<'a>,
        #[serde(rename = "static")]
        is_static: bool,
    },
    TypeParameterDeclaration {
        params: NodeList<'a>,
    },
    TypeParameter {
        name: &'a str,
        bound: OptionalNode<'a>,
        default: OptionalNode<'a>,
    },
    TypeParameterInstantiation {
        params: NodeList<'a>,
    },
    TypeAlias {
        id: &'a Node<'a>,
        type_parameters: OptionalNode<'a>,
        right: &'a Node<'a>,
    },
    InterfaceDeclaration {
        id: &'a Node<'a>,
        type_parameters: OptionalNode<'a>,
        extends: NodeList<'a>,
        body: &'a Node<'a>,
    },
    InterfaceExtends {
        id: &'a Node<'a>,
        type_parameters: OptionalNode<'a>,
    },
    ClassImplements {
        id: &'a Node<'a>,
        type_parameters: OptionalNode<'a>,
    },
    DeclareClass {
        id: &'a Node<'a>,
        type_parameters: OptionalNode<'a>,
        extends: NodeList<'a>,
        body: &'a Node<'a>,
    },
    /// The function type hangs off `id` as its type annotation.
    DeclareFunction {
        id: &'a Node<'a>,
    },
    DeclareVariable {
        id: &'a Node<'a>,
    },
    /// `id` is an identifier or a string literal; `body` is a block of
    /// `declare` statements.
    DeclareModule {
        id: &'a Node<'a>,
        body: &'a Node<'a>,
    },
}

impl<'a> NodeKind<'a> {
    /// The production name, as used for the `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::RegExpLiteral { .. } => "RegExpLiteral",
            NodeKind::NullLiteral => "NullLiteral",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::BooleanLiteral { .. } => "BooleanLiteral",
            NodeKind::NumericLiteral { .. } => "NumericLiteral",
            NodeKind::Directive { .. } => "Directive",
            NodeKind::DirectiveLiteral { .. } => "DirectiveLiteral",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::DebuggerStatement => "DebuggerStatement",
            NodeKind::WithStatement { .. } => "WithStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::LabeledStatement { .. } => "LabeledStatement",
            NodeKind::BreakStatement { .. } => "BreakStatement",
            NodeKind::ContinueStatement { .. } => "ContinueStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::ThrowStatement { .. } => "ThrowStatement",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::ForOfStatement { .. } => "ForOfStatement",
            NodeKind::ForAwaitStatement { .. } => "ForAwaitStatement",
            NodeKind::FunctionDeclaration(_) => "FunctionDeclaration",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::ClassDeclaration(_) => "ClassDeclaration",
            NodeKind::ClassBody { .. } => "ClassBody",
            NodeKind::ClassMethod(_) => "ClassMethod",
            NodeKind::ClassProperty { .. } => "ClassProperty",
            NodeKind::Decorator { .. } => "Decorator",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::ImportSpecifier { .. } => "ImportSpecifier",
            NodeKind::ImportDefaultSpecifier { .. } => "ImportDefaultSpecifier",
            NodeKind::ImportNamespaceSpecifier { .. } => "ImportNamespaceSpecifier",
            NodeKind::ExportNamedDeclaration { .. } => "ExportNamedDeclaration",
            NodeKind::ExportDefaultDeclaration { .. } => "ExportDefaultDeclaration",
            NodeKind::ExportAllDeclaration { .. } => "ExportAllDeclaration",
            NodeKind::ExportSpecifier { .. } => "ExportSpecifier",
            NodeKind::ExportDefaultSpecifier { .. } => "ExportDefaultSpecifier",
            NodeKind::ExportNamespaceSpecifier { .. } => "ExportNamespaceSpecifier",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::Super => "Super",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::ObjectProperty { .. } => "ObjectProperty",
            NodeKind::ObjectMethod(_) => "ObjectMethod",
            NodeKind::SpreadElement { .. } => "SpreadElement",
            NodeKind::SpreadProperty { .. } => "SpreadProperty",
            NodeKind::FunctionExpression(_) => "FunctionExpression",
            NodeKind::ArrowFunctionExpression(_) => "ArrowFunctionExpression",
            NodeKind::ClassExpression(_) => "ClassExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::UpdateExpression { .. } => "UpdateExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::LogicalExpression { .. } => "LogicalExpression",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::SequenceExpression { .. } => "SequenceExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::TemplateLiteral { .. } => "TemplateLiteral",
            NodeKind::TemplateElement { .. } => "TemplateElement",
            NodeKind::TaggedTemplateExpression { .. } => "TaggedTemplateExpression",
            NodeKind::MetaProperty { .. } => "MetaProperty",
            NodeKind::YieldExpression { .. } => "YieldExpression",
            NodeKind::AwaitExpression { .. } => "AwaitExpression",
            NodeKind::BindExpression { .. } => "BindExpression",
            NodeKind::DoExpression { .. } => "DoExpression",
            NodeKind::ObjectPattern { .. } => "ObjectPattern",
            NodeKind::ArrayPattern { .. } => "ArrayPattern",
            NodeKind::AssignmentPattern { .. } => "AssignmentPattern",
            NodeKind::RestElement { .. } => "RestElement",
            NodeKind::RestProperty { .. } => "RestProperty",
            NodeKind::JsxIdentifier { .. } => "JSXIdentifier",
            NodeKind::JsxNamespacedName { .. } => "JSXNamespacedName",
            NodeKind::JsxMemberExpression { .. } => "JSXMemberExpression",
            NodeKind::JsxEmptyExpression => "JSXEmptyExpression",
            NodeKind::JsxExpressionContainer { .. } => "JSXExpressionContainer",
            NodeKind::JsxSpreadAttribute { .. } => "JSXSpreadAttribute",
            NodeKind::JsxAttribute { .. } => "JSXAttribute",
            NodeKind::JsxOpeningElement { .. } => "JSXOpeningElement",
            NodeKind::JsxClosingElement { .. } => "JSXClosingElement",
            NodeKind::JsxElement { .. } => "JSXElement",
            NodeKind::JsxText { .. } => "JSXText",
            NodeKind::TypeAnnotation { .. } => "TypeAnnotation",
            NodeKind::TypeCastExpression { .. } => "TypeCastExpression",
            NodeKind::AnyTypeAnnotation => "AnyTypeAnnotation",
            NodeKind::MixedTypeAnnotation => "MixedTypeAnnotation",
            NodeKind::EmptyTypeAnnotation => "EmptyTypeAnnotation",
            NodeKind::BooleanTypeAnnotation => "BooleanTypeAnnotation",
            NodeKind::NumberTypeAnnotation => "NumberTypeAnnotation",
            NodeKind::StringTypeAnnotation => "StringTypeAnnotation",
            NodeKind::VoidTypeAnnotation => "VoidTypeAnnotation",
            NodeKind::NullLiteralTypeAnnotation => "NullLiteralTypeAnnotation",
            NodeKind::ThisTypeAnnotation => "ThisTypeAnnotation",
            NodeKind::StringLiteralTypeAnnotation { .. } => "StringLiteralTypeAnnotation",
            NodeKind::NumericLiteralTypeAnnotation { .. } => "NumericLiteralTypeAnnotation",
            NodeKind::BooleanLiteralTypeAnnotation { .. } => "BooleanLiteralTypeAnnotation",
            NodeKind::NullableTypeAnnotation { .. } => "NullableTypeAnnotation",
            NodeKind::ArrayTypeAnnotation { .. } => "ArrayTypeAnnotation",
            NodeKind::UnionTypeAnnotation { .. } => "UnionTypeAnnotation",
            NodeKind::IntersectionTypeAnnotation { .. } => "IntersectionTypeAnnotation",
            NodeKind::TupleTypeAnnotation { .. } => "TupleTypeAnnotation",
            NodeKind::TypeofTypeAnnotation { .. } => "TypeofTypeAnnotation",
            NodeKind::GenericTypeAnnotation { .. } => "GenericTypeAnnotation",
            NodeKind::QualifiedTypeIdentifier { .. } => "QualifiedTypeIdentifier",
            NodeKind::FunctionTypeAnnotation { .. } => "FunctionTypeAnnotation",
            NodeKind::FunctionTypeParam { .. } => "FunctionTypeParam",
            NodeKind::ObjectTypeAnnotation { .. } => "ObjectTypeAnnotation",
            NodeKind::ObjectTypeProperty { .. } => "ObjectTypeProperty",
            NodeKind::ObjectTypeIndexer { .. } => "ObjectTypeIndexer",
            NodeKind::TypeParameterDeclaration { .. } => "TypeParameterDeclaration",
            NodeKind::TypeParameter { .. } => "TypeParameter",
            NodeKind::TypeParameterInstantiation { .. } => "TypeParameterInstantiation",
            NodeKind::TypeAlias { .. } => "TypeAlias",
            NodeKind::InterfaceDeclaration { .. } => "InterfaceDeclaration",
            NodeKind::InterfaceExtends { .. } => "InterfaceExtends",
            NodeKind::DeclareClass { .. } => "DeclareClass",
            NodeKind::DeclareFunction { .. } => "DeclareFunction",
            NodeKind::DeclareVariable { .. } => "DeclareVariable",
            NodeKind::DeclareModule { .. } => "DeclareModule",
            NodeKind::ClassImplements { .. } => "ClassImplements",
        }
    }

    /// Whether this node is a function of any kind.
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration(_)
                | NodeKind::FunctionExpression(_)
                | NodeKind::ArrowFunctionExpression(_)
                | NodeKind::ObjectMethod(_)
                | NodeKind::ClassMethod(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esparse_core::text::Position;

    fn loc(start: u32, end: u32) -> SourceLocation {
        SourceLocation::new(Position::new(1, start), Position::new(1, end))
    }

    #[test]
    fn test_node_serializes_with_type_tag() {
        let left = Node::new(NodeKind::NumericLiteral { value: 1.0, raw: "1" }, NodeData::new(0, 1, loc(0, 1)));
        let right = Node::new(NodeKind::NumericLiteral { value: 2.0, raw: "2" }, NodeData::new(2, 3, loc(2, 3)));
        let sum = Node::new(
            NodeKind::BinaryExpression { operator: "+", left: &left, right: &right },
            NodeData::new(0, 3, loc(0, 3)),
        );
        let json = serde_json::to_value(&sum).unwrap();
        assert_eq!(json["type"], "BinaryExpression");
        assert_eq!(json["operator"], "+");
        assert_eq!(json["left"]["type"], "NumericLiteral");
        assert_eq!(json["right"]["value"], 2.0);
        assert_eq!(json["end"], 3);
        assert!(json.get("leadingComments").is_none());
        assert!(json.get("parenStart").is_none());
        assert_eq!(sum.kind.type_name(), "BinaryExpression");
    }

    #[test]
    fn test_function_fields_flatten_into_method() {
        let key = Node::new(
            NodeKind::Identifier { name: "m", type_annotation: None, optional: false },
            NodeData::new(0, 1, loc(0, 1)),
        );
        let body = Node::new(NodeKind::BlockStatement { body: &[], directives: &[] }, NodeData::new(4, 6, loc(4, 6)));
        let method = Node::new(
            NodeKind::ObjectMethod(Method {
                kind: MethodKind::Method,
                key: &key,
                computed: false,
                is_static: false,
                decorators: &[],
                function: Function {
                    id: None,
                    generator: false,
                    is_async: true,
                    expression: false,
                    params: &[],
                    body: &body,
                    type_parameters: None,
                    return_type: None,
                },
            }),
            NodeData::new(0, 6, loc(0, 6)),
        );
        let json = serde_json::to_value(&method).unwrap();
        assert_eq!(json["type"], "ObjectMethod");
        assert_eq!(json["kind"], "method");
        assert_eq!(json["async"], true);
        assert_eq!(json["body"]["type"], "BlockStatement");
        assert!(json.get("static").is_none());
        assert!(json.get("returnType").is_none());
    }

    #[test]
    fn test_comments_serialize_when_attached() {
        let comments = [Comment {
            kind: CommentKind::Line,
            value: " note",
            start: 0,
            end: 7,
            loc: loc(0, 7),
        }];
        let node = Node::new(NodeKind::EmptyStatement, NodeData::new(8, 9, loc(8, 9)));
        node.data.leading_comments.set(&comments);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["leadingComments"][0]["type"], "CommentLine");
        assert_eq!(json["leadingComments"][0]["value"], " note");
    }
}
