//! The `flow` extension: type annotations, type aliases, interfaces and
//! `declare` statements.
//!
//! Types are parsed with the lexer in type mode, where `<` and `>` are
//! always single-character tokens so that `Array<Array<T>>` closes twice,
//! and `{|` and `|}` delimit exact object types.

use esparse_ast::{ImportKind, Node, NodeKind, NodeList, OptionalNode, TokenType};

use crate::extension::{Chain, SyntaxExtension};
use crate::parser::{Marked, NodeStart, PResult, Parser};

pub struct Flow;

pub static FLOW: Flow = Flow;

impl SyntaxExtension for Flow {
    fn name(&self) -> &'static str {
        "flow"
    }

    fn read_token(&self, p: &mut Parser<'_>, next: Chain, ch: char) -> PResult<()> {
        if p.lexer.state.in_type {
            let following = p.input().as_bytes().get(p.lexer.state.pos + 1).copied();
            match (ch, following) {
                ('<' | '>', _) => {
                    p.lexer.finish_op(TokenType::Relational, 1);
                    return Ok(());
                }
                ('{', Some(b'|')) => {
                    p.lexer.finish_op(TokenType::BraceBarL, 2);
                    return Ok(());
                }
                ('|', Some(b'}')) => {
                    p.lexer.finish_op(TokenType::BraceBarR, 2);
                    return Ok(());
                }
                _ => {}
            }
        }
        p.read_token_from(next, ch)
    }

    fn parse_expr_atom<'a>(&self, p: &mut Parser<'a>, next: Chain, track_defaults: bool) -> PResult<Marked<'a>> {
        if p.is_relational("<") {
            return p.flow_parse_generic_arrow(next).map(Marked::plain);
        }
        if p.is_contextual("async") && p.state.potential_arrow_at == Some(p.start_pos()) {
            let ahead = p.lookahead()?;
            if ahead.token_type == TokenType::Relational && ahead.value.as_str() == "<" {
                if let Some(arrow) = p.try_parse(|p| p.flow_parse_async_generic_arrow()) {
                    return Ok(Marked::plain(arrow));
                }
            }
        }
        // `interface` is reserved in strict code but still starts a
        // declaration.
        if p.strict() && p.is_contextual("interface") && p.lookahead()?.token_type == TokenType::Name {
            return p.parse_identifier(true).map(Marked::plain);
        }
        p.parse_expr_atom_from(next, track_defaults)
    }

    fn parse_expression_statement<'a>(
        &self,
        p: &mut Parser<'a>,
        next: Chain,
        start: NodeStart,
        expr: Node<'a>,
    ) -> PResult<Node<'a>> {
        if let NodeKind::Identifier { name, .. } = expr.kind {
            if !expr.is_parenthesized() && name == "declare" && p.flow_at_declaration() {
                return p.flow_parse_declare(start);
            }
            if !expr.is_parenthesized() && p.matches(TokenType::Name) {
                match name {
                    "type" => return p.flow_parse_type_alias(start),
                    "interface" => return p.flow_parse_interface(start),
                    _ => {}
                }
            }
        }
        p.parse_expression_statement_from(next, start, expr)
    }

    fn parse_binding_annotation<'a>(
        &self,
        p: &mut Parser<'a>,
        next: Chain,
        target: Node<'a>,
        is_param: bool,
    ) -> PResult<Node<'a>> {
        let mut target = target;
        if is_param && p.eat(TokenType::Question)? {
            target = p.flow_mark_optional(target)?;
        }
        if p.matches(TokenType::Colon) {
            let annotation = p.flow_parse_type_annotation()?;
            target = p.with_type_annotation(target, p.alloc(annotation));
        }
        p.parse_binding_annotation_from(next, target, is_param)
    }

    fn parse_return_type<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<OptionalNode<'a>> {
        if p.matches(TokenType::Colon) {
            let annotation = p.flow_parse_type_annotation()?;
            return Ok(Some(p.alloc(annotation)));
        }
        p.parse_return_type_from(next)
    }

    fn parse_type_parameters<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<OptionalNode<'a>> {
        if p.is_relational("<") {
            let declaration = p.flow_parse_type_parameter_declaration()?;
            return Ok(Some(p.alloc(declaration)));
        }
        p.parse_type_parameters_from(next)
    }

    fn parse_super_type_arguments<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<OptionalNode<'a>> {
        if p.is_relational("<") {
            let instantiation = p.flow_parse_type_parameter_instantiation()?;
            return Ok(Some(p.alloc(instantiation)));
        }
        p.parse_super_type_arguments_from(next)
    }

    fn parse_implements<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<NodeList<'a>> {
        if !p.is_contextual("implements") {
            return p.parse_implements_from(next);
        }
        p.next()?;
        let mut implements = Vec::new();
        loop {
            let start = p.start_node();
            let id = p.parse_identifier(false)?;
            let type_parameters = p.flow_parse_optional_instantiation()?;
            implements.push(p.finish_node(
                start,
                NodeKind::ClassImplements {
                    id: p.alloc(id),
                    type_parameters,
                },
            ));
            if !p.eat(TokenType::Comma)? {
                break;
            }
        }
        Ok(p.alloc_list(implements))
    }

    fn parse_paren_item<'a>(
        &self,
        p: &mut Parser<'a>,
        next: Chain,
        node: Node<'a>,
        start: NodeStart,
    ) -> PResult<Node<'a>> {
        let mut node = node;
        if p.eat(TokenType::Question)? {
            node = p.flow_mark_optional(node)?;
        }
        if p.matches(TokenType::Colon) {
            let annotation = p.flow_parse_type_annotation()?;
            node = p.finish_node(
                start,
                NodeKind::TypeCastExpression {
                    expression: p.alloc(node),
                    type_annotation: p.alloc(annotation),
                },
            );
        }
        p.parse_paren_item_from(next, node, start)
    }

    fn parse_arrow_return_type<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<OptionalNode<'a>> {
        if p.matches(TokenType::Colon) {
            let annotation = p.try_parse(|p| {
                let annotation = p.flow_parse_type_annotation()?;
                if p.can_insert_semicolon() || !p.matches(TokenType::Arrow) {
                    return p.unexpected();
                }
                Ok(annotation)
            });
            if let Some(annotation) = annotation {
                return Ok(Some(p.alloc(annotation)));
            }
        }
        p.parse_arrow_return_type_from(next)
    }

    fn parse_export_declaration<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<Option<Node<'a>>> {
        let is_type = p.is_contextual("type");
        if (is_type || p.is_contextual("interface")) && p.lookahead()?.token_type == TokenType::Name {
            let start = p.start_node();
            p.next()?;
            let declaration = if is_type {
                p.flow_parse_type_alias(start)?
            } else {
                p.flow_parse_interface(start)?
            };
            return Ok(Some(declaration));
        }
        p.parse_export_declaration_from(next)
    }

    fn parse_import_kind(&self, p: &mut Parser<'_>, next: Chain) -> PResult<ImportKind> {
        let kind = if p.matches(TokenType::Typeof) {
            ImportKind::Typeof
        } else if p.is_contextual("type") {
            ImportKind::Type
        } else {
            return p.parse_import_kind_from(next);
        };
        let ahead = p.lookahead()?;
        let applies = match ahead.token_type {
            TokenType::Name => ahead.value.as_str() != "from",
            TokenType::BraceL | TokenType::Star => true,
            _ => false,
        };
        if applies {
            p.next()?;
            return Ok(kind);
        }
        p.parse_import_kind_from(next)
    }

    fn is_class_property(&self, p: &Parser<'_>, next: Chain) -> bool {
        p.matches(TokenType::Colon) || p.is_class_property_from(next)
    }
}

/// The parts shared by `interface` and `declare class`.
struct Interfaceish<'a> {
    id: &'a Node<'a>,
    type_parameters: OptionalNode<'a>,
    extends: NodeList<'a>,
    body: &'a Node<'a>,
}

/// Types named by a plain identifier.
fn keyword_type<'a>(name: &str) -> Option<NodeKind<'a>> {
    Some(match name {
        "any" => NodeKind::AnyTypeAnnotation,
        "mixed" => NodeKind::MixedTypeAnnotation,
        "empty" => NodeKind::EmptyTypeAnnotation,
        "bool" | "boolean" => NodeKind::BooleanTypeAnnotation,
        "number" => NodeKind::NumberTypeAnnotation,
        "string" => NodeKind::StringTypeAnnotation,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    /// Run `f` with the lexer in type mode. Tokens read while `f` runs,
    /// including the one after the type, are read as type tokens.
    fn in_type_context<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let old = std::mem::replace(&mut self.lexer.state.in_type, true);
        let result = f(self);
        self.lexer.state.in_type = old;
        result
    }

    fn flow_mark_optional(&self, node: Node<'a>) -> PResult<Node<'a>> {
        match node.kind {
            NodeKind::Identifier {
                name, type_annotation, ..
            } => Ok(self.rewrap(
                &node,
                NodeKind::Identifier {
                    name,
                    type_annotation,
                    optional: true,
                },
            )),
            _ => self.unexpected_at(node.start()),
        }
    }

    /// `: Type`, starting at the colon.
    fn flow_parse_type_annotation(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let type_annotation = self.flow_parse_type_initialiser(TokenType::Colon)?;
        Ok(self.finish_node(
            start,
            NodeKind::TypeAnnotation {
                type_annotation: self.alloc(type_annotation),
            },
        ))
    }

    /// A type after the token `token`.
    fn flow_parse_type_initialiser(&mut self, token: TokenType) -> PResult<Node<'a>> {
        self.in_type_context(|p| {
            p.expect(token)?;
            p.flow_parse_type()
        })
    }

    /// `async <T>(params) => body`, with `async` as the current token.
    fn flow_parse_async_generic_arrow(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.next()?;
        let type_parameters = self.flow_parse_type_parameter_declaration()?;
        self.expect(TokenType::ParenL)?;
        let params = self.parse_binding_list(TokenType::ParenR, false)?;
        let params = params.into_iter().flatten().collect();
        let return_type = if self.matches(TokenType::Colon) {
            let annotation = self.flow_parse_type_annotation()?;
            Some(self.alloc(annotation))
        } else {
            None
        };
        if self.can_insert_semicolon() {
            return self.unexpected();
        }
        self.expect(TokenType::Arrow)?;
        let arrow = self.parse_arrow_expression_typed(start, params, true, return_type)?;
        let NodeKind::ArrowFunctionExpression(function) = &arrow.kind else {
            return self.unexpected_at(start.pos);
        };
        let mut function = function.clone();
        function.type_parameters = Some(self.alloc(type_parameters));
        Ok(self.rewrap(&arrow, NodeKind::ArrowFunctionExpression(function)))
    }

    /// `<T>(params) => body` in expression position.
    fn flow_parse_generic_arrow(&mut self, next: Chain) -> PResult<Node<'a>> {
        let start = self.start_node();
        let type_parameters = self.flow_parse_type_parameter_declaration()?;
        self.state.potential_arrow_at = Some(self.start_pos());
        let arrow = self.parse_expr_atom_from(next, false)?.node;
        let NodeKind::ArrowFunctionExpression(function) = &arrow.kind else {
            return self.unexpected_at(start.pos);
        };
        let mut function = function.clone();
        function.type_parameters = Some(self.alloc(type_parameters));
        Ok(self.finish_node_at(
            start,
            NodeKind::ArrowFunctionExpression(function),
            arrow.end(),
            arrow.data.loc.end,
        ))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// `type Name<T> = Type;` with the `type` keyword consumed.
    fn flow_parse_type_alias(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        let id = self.parse_identifier(false)?;
        let type_parameters = self.flow_parse_optional_declaration()?;
        let right = self.flow_parse_type_initialiser(TokenType::Eq)?;
        self.semicolon()?;
        Ok(self.finish_node(
            start,
            NodeKind::TypeAlias {
                id: self.alloc(id),
                type_parameters,
                right: self.alloc(right),
            },
        ))
    }

    /// `interface Name<T> extends A, B { ... }` with the `interface`
    /// keyword consumed.
    fn flow_parse_interface(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        let Interfaceish {
            id,
            type_parameters,
            extends,
            body,
        } = self.flow_parse_interfaceish(false)?;
        Ok(self.finish_node(
            start,
            NodeKind::InterfaceDeclaration {
                id,
                type_parameters,
                extends,
                body,
            },
        ))
    }

    /// The name, type parameters, `extends` list and body shared by
    /// interfaces and declared classes.
    fn flow_parse_interfaceish(&mut self, allow_static: bool) -> PResult<Interfaceish<'a>> {
        let id = self.parse_identifier(false)?;
        let type_parameters = self.flow_parse_optional_declaration()?;
        let mut extends = Vec::new();
        if self.eat(TokenType::Extends)? {
            loop {
                let extends_start = self.start_node();
                let id = self.flow_parse_qualified_type_identifier()?;
                let type_parameters = self.flow_parse_optional_instantiation()?;
                extends.push(self.finish_node(
                    extends_start,
                    NodeKind::InterfaceExtends {
                        id: self.alloc(id),
                        type_parameters,
                    },
                ));
                if !self.eat(TokenType::Comma)? {
                    break;
                }
            }
        }
        let body = self.flow_parse_object_type(allow_static, false)?;
        Ok(Interfaceish {
            id: self.alloc(id),
            type_parameters,
            extends: self.alloc_list(extends),
            body: self.alloc(body),
        })
    }

    /// Whether `declare` is followed, on the same line, by something it
    /// can declare.
    fn flow_at_declaration(&self) -> bool {
        !self.has_preceding_line_break()
            && (matches!(self.cur(), TokenType::Class | TokenType::Function | TokenType::Var)
                || self.is_contextual("module"))
    }

    /// A `declare` statement with the `declare` word consumed.
    fn flow_parse_declare(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        match self.cur() {
            TokenType::Class => {
                self.next()?;
                let Interfaceish {
                    id,
                    type_parameters,
                    extends,
                    body,
                } = self.flow_parse_interfaceish(true)?;
                Ok(self.finish_node(
                    start,
                    NodeKind::DeclareClass {
                        id,
                        type_parameters,
                        extends,
                        body,
                    },
                ))
            }
            TokenType::Function => self.flow_parse_declare_function(start),
            TokenType::Var => {
                self.next()?;
                let id = self.parse_identifier(false)?;
                let id = if self.matches(TokenType::Colon) {
                    let annotation = self.flow_parse_type_annotation()?;
                    self.with_type_annotation(id, self.alloc(annotation))
                } else {
                    id
                };
                self.semicolon()?;
                Ok(self.finish_node(start, NodeKind::DeclareVariable { id: self.alloc(id) }))
            }
            TokenType::Name if self.text() == "module" => self.flow_parse_declare_module(start),
            _ => self.unexpected(),
        }
    }

    /// `declare function name<T>(params): R;`. The signature becomes the
    /// type annotation of the name.
    fn flow_parse_declare_function(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;
        let name = self.parse_identifier(false)?;
        let type_start = self.start_node();
        let function_type = self.in_type_context(|p| {
            let type_parameters = p.flow_parse_optional_declaration()?;
            p.expect(TokenType::ParenL)?;
            let (params, rest) = p.flow_parse_function_type_params(Vec::new())?;
            p.expect(TokenType::ParenR)?;
            let return_type = p.flow_parse_type_initialiser(TokenType::Colon)?;
            Ok(p.finish_node(
                type_start,
                NodeKind::FunctionTypeAnnotation {
                    type_parameters,
                    params: p.alloc_list(params),
                    rest,
                    return_type: p.alloc(return_type),
                },
            ))
        })?;
        let annotation = self.finish_node(
            type_start,
            NodeKind::TypeAnnotation {
                type_annotation: self.alloc(function_type),
            },
        );
        let id = self.with_type_annotation(name, self.alloc(annotation));
        self.semicolon()?;
        Ok(self.finish_node(start, NodeKind::DeclareFunction { id: self.alloc(id) }))
    }

    /// `declare module "name" { declare ... }`. The name may also be an
    /// identifier.
    fn flow_parse_declare_module(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;
        let id = if self.matches(TokenType::String) {
            self.parse_literal()?
        } else {
            self.parse_identifier(false)?
        };
        let body_start = self.start_node();
        self.expect(TokenType::BraceL)?;
        let mut body = Vec::new();
        while !self.matches(TokenType::BraceR) {
            let statement_start = self.start_node();
            self.expect_contextual("declare")?;
            if !self.flow_at_declaration() {
                return self.unexpected();
            }
            body.push(self.flow_parse_declare(statement_start)?);
        }
        self.expect(TokenType::BraceR)?;
        let body = self.finish_node(
            body_start,
            NodeKind::BlockStatement {
                body: self.alloc_list(body),
                directives: &[],
            },
        );
        Ok(self.finish_node(
            start,
            NodeKind::DeclareModule {
                id: self.alloc(id),
                body: self.alloc(body),
            },
        ))
    }

    // ========================================================================
    // Type parameters
    // ========================================================================

    fn flow_parse_optional_declaration(&mut self) -> PResult<OptionalNode<'a>> {
        if !self.is_relational("<") {
            return Ok(None);
        }
        let declaration = self.flow_parse_type_parameter_declaration()?;
        Ok(Some(self.alloc(declaration)))
    }

    fn flow_parse_optional_instantiation(&mut self) -> PResult<OptionalNode<'a>> {
        if !self.is_relational("<") {
            return Ok(None);
        }
        let instantiation = self.flow_parse_type_parameter_instantiation()?;
        Ok(Some(self.alloc(instantiation)))
    }

    /// `<T, U: Bound = Default>`.
    fn flow_parse_type_parameter_declaration(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.in_type_context(|p| {
            p.expect_relational("<")?;
            let mut params = Vec::new();
            while !p.is_relational(">") {
                params.push(p.flow_parse_type_parameter()?);
                if !p.is_relational(">") {
                    p.expect(TokenType::Comma)?;
                }
            }
            p.expect_relational(">")?;
            Ok(p.finish_node(
                start,
                NodeKind::TypeParameterDeclaration {
                    params: p.alloc_list(params),
                },
            ))
        })
    }

    fn flow_parse_type_parameter(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let id = self.parse_identifier(false)?;
        let name = id.identifier_name().unwrap_or_default();
        let bound = if self.matches(TokenType::Colon) {
            let bound = self.flow_parse_type_annotation()?;
            Some(self.alloc(bound))
        } else {
            None
        };
        let default = if self.eat(TokenType::Eq)? {
            let default = self.flow_parse_type()?;
            Some(self.alloc(default))
        } else {
            None
        };
        Ok(self.finish_node(start, NodeKind::TypeParameter { name, bound, default }))
    }

    /// `<A, B>` after a generic name.
    fn flow_parse_type_parameter_instantiation(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.in_type_context(|p| {
            p.expect_relational("<")?;
            let mut params = Vec::new();
            while !p.is_relational(">") {
                params.push(p.flow_parse_type()?);
                if !p.is_relational(">") {
                    p.expect(TokenType::Comma)?;
                }
            }
            p.expect_relational(">")?;
            Ok(p.finish_node(
                start,
                NodeKind::TypeParameterInstantiation {
                    params: p.alloc_list(params),
                },
            ))
        })
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn flow_parse_type(&mut self) -> PResult<Node<'a>> {
        self.enter()?;
        let result = self.flow_parse_union_type();
        self.leave();
        result
    }

    fn flow_parse_union_type(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.eat(TokenType::BitwiseOr)?;
        let first = self.flow_parse_intersection_type()?;
        if !self.matches(TokenType::BitwiseOr) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat(TokenType::BitwiseOr)? {
            types.push(self.flow_parse_intersection_type()?);
        }
        Ok(self.finish_node(
            start,
            NodeKind::UnionTypeAnnotation {
                types: self.alloc_list(types),
            },
        ))
    }

    fn flow_parse_intersection_type(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.eat(TokenType::BitwiseAnd)?;
        let first = self.flow_parse_prefix_type()?;
        if !self.matches(TokenType::BitwiseAnd) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat(TokenType::BitwiseAnd)? {
            types.push(self.flow_parse_prefix_type()?);
        }
        Ok(self.finish_node(
            start,
            NodeKind::IntersectionTypeAnnotation {
                types: self.alloc_list(types),
            },
        ))
    }

    fn flow_parse_prefix_type(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        if !self.eat(TokenType::Question)? {
            return self.flow_parse_postfix_type();
        }
        let type_annotation = self.flow_parse_prefix_type()?;
        Ok(self.finish_node(
            start,
            NodeKind::NullableTypeAnnotation {
                type_annotation: self.alloc(type_annotation),
            },
        ))
    }

    /// A primary type followed by any number of `[]` on the same line.
    fn flow_parse_postfix_type(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let mut element_type = self.flow_parse_primary_type()?;
        while !self.can_insert_semicolon() && self.matches(TokenType::BracketL) {
            self.next()?;
            self.expect(TokenType::BracketR)?;
            element_type = self.finish_node(
                start,
                NodeKind::ArrayTypeAnnotation {
                    element_type: self.alloc(element_type),
                },
            );
        }
        Ok(element_type)
    }

    fn flow_parse_primary_type(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let kind = match self.cur() {
            TokenType::Name => {
                if let Some(kind) = keyword_type(self.text()) {
                    self.next()?;
                    kind
                } else {
                    let id = self.flow_parse_qualified_type_identifier()?;
                    let type_parameters = self.flow_parse_optional_instantiation()?;
                    NodeKind::GenericTypeAnnotation {
                        id: self.alloc(id),
                        type_parameters,
                    }
                }
            }
            TokenType::BraceL | TokenType::BraceBarL => return self.flow_parse_object_type(false, true),
            TokenType::BracketL => return self.flow_parse_tuple_type(),
            TokenType::ParenL => return self.flow_parse_paren_or_function_type(),
            TokenType::Relational if self.text() == "<" => {
                let type_parameters = self.flow_parse_type_parameter_declaration()?;
                self.expect(TokenType::ParenL)?;
                let (params, rest) = self.flow_parse_function_type_params(Vec::new())?;
                self.expect(TokenType::ParenR)?;
                self.expect(TokenType::Arrow)?;
                let return_type = self.flow_parse_type()?;
                NodeKind::FunctionTypeAnnotation {
                    type_parameters: Some(self.alloc(type_parameters)),
                    params: self.alloc_list(params),
                    rest,
                    return_type: self.alloc(return_type),
                }
            }
            TokenType::String => {
                let value = self.text();
                let raw = self.source_of(start.pos, self.lexer.state.end as u32);
                self.next()?;
                NodeKind::StringLiteralTypeAnnotation { value, raw }
            }
            TokenType::True | TokenType::False => {
                let value = self.matches(TokenType::True);
                self.next()?;
                NodeKind::BooleanLiteralTypeAnnotation { value }
            }
            TokenType::PlusMin if self.text() == "-" => {
                self.next()?;
                if !self.matches(TokenType::Num) {
                    return self.unexpected();
                }
                let value = -self.value().as_num().unwrap_or_default();
                let raw = self.source_of(start.pos, self.lexer.state.end as u32);
                self.next()?;
                NodeKind::NumericLiteralTypeAnnotation { value, raw }
            }
            TokenType::Num => {
                let value = self.value().as_num().unwrap_or_default();
                let raw = self.source_of(start.pos, self.lexer.state.end as u32);
                self.next()?;
                NodeKind::NumericLiteralTypeAnnotation { value, raw }
            }
            TokenType::Void => {
                self.next()?;
                NodeKind::VoidTypeAnnotation
            }
            TokenType::Null => {
                self.next()?;
                NodeKind::NullLiteralTypeAnnotation
            }
            TokenType::This => {
                self.next()?;
                NodeKind::ThisTypeAnnotation
            }
            TokenType::Typeof => {
                self.next()?;
                let argument = self.flow_parse_primary_type()?;
                NodeKind::TypeofTypeAnnotation {
                    argument: self.alloc(argument),
                }
            }
            _ => return self.unexpected(),
        };
        Ok(self.finish_node(start, kind))
    }

    /// `A` or `A.B.C`.
    fn flow_parse_qualified_type_identifier(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let mut node = self.parse_identifier(true)?;
        while self.eat(TokenType::Dot)? {
            let id = self.parse_identifier(true)?;
            node = self.finish_node(
                start,
                NodeKind::QualifiedTypeIdentifier {
                    qualification: self.alloc(node),
                    id: self.alloc(id),
                },
            );
        }
        Ok(node)
    }

    fn flow_parse_tuple_type(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.expect(TokenType::BracketL)?;
        let mut types = Vec::new();
        while !self.matches(TokenType::BracketR) {
            types.push(self.flow_parse_type()?);
            if self.matches(TokenType::BracketR) {
                break;
            }
            self.expect(TokenType::Comma)?;
        }
        self.expect(TokenType::BracketR)?;
        Ok(self.finish_node(
            start,
            NodeKind::TupleTypeAnnotation {
                types: self.alloc_list(types),
            },
        ))
    }

    /// A parenthesized type or a function type. `(A)` is a group unless a
    /// comma or `) =>` follows it, in which case `A` is the type of the
    /// first unnamed parameter.
    fn flow_parse_paren_or_function_type(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.expect(TokenType::ParenL)?;
        let is_grouped = match self.cur() {
            TokenType::ParenR | TokenType::Ellipsis => false,
            TokenType::Name => !matches!(self.lookahead()?.token_type, TokenType::Question | TokenType::Colon),
            _ => true,
        };

        let mut params = Vec::new();
        if is_grouped {
            let inner = self.flow_parse_type()?;
            let is_function = self.matches(TokenType::Comma)
                || (self.matches(TokenType::ParenR) && self.lookahead()?.token_type == TokenType::Arrow);
            if !is_function {
                self.expect(TokenType::ParenR)?;
                return Ok(inner);
            }
            self.eat(TokenType::Comma)?;
            let param_start = self.start_of(&inner);
            params.push(self.finish_node_at(
                param_start,
                NodeKind::FunctionTypeParam {
                    name: None,
                    type_annotation: self.alloc(inner.clone()),
                    optional: false,
                },
                inner.end(),
                inner.data.loc.end,
            ));
        }

        let (params, rest) = self.flow_parse_function_type_params(params)?;
        self.expect(TokenType::ParenR)?;
        self.expect(TokenType::Arrow)?;
        let return_type = self.flow_parse_type()?;
        Ok(self.finish_node(
            start,
            NodeKind::FunctionTypeAnnotation {
                type_parameters: None,
                params: self.alloc_list(params),
                rest,
                return_type: self.alloc(return_type),
            },
        ))
    }

    /// Parameters of a function type up to the closing parenthesis,
    /// appended to `params`.
    fn flow_parse_function_type_params(
        &mut self,
        mut params: Vec<Node<'a>>,
    ) -> PResult<(Vec<Node<'a>>, OptionalNode<'a>)> {
        while !self.matches(TokenType::ParenR) && !self.matches(TokenType::Ellipsis) {
            params.push(self.flow_parse_function_type_param()?);
            if !self.matches(TokenType::ParenR) {
                self.expect(TokenType::Comma)?;
            }
        }
        let rest = if self.eat(TokenType::Ellipsis)? {
            let rest = self.flow_parse_function_type_param()?;
            Some(self.alloc(rest))
        } else {
            None
        };
        Ok((params, rest))
    }

    /// `name?: Type` or a bare `Type`.
    fn flow_parse_function_type_param(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let named = self.matches(TokenType::Name)
            && matches!(self.lookahead()?.token_type, TokenType::Colon | TokenType::Question);
        let kind = if named {
            let name = self.parse_identifier(true)?;
            let optional = self.eat(TokenType::Question)?;
            let type_annotation = self.flow_parse_type_initialiser(TokenType::Colon)?;
            NodeKind::FunctionTypeParam {
                name: Some(self.alloc(name)),
                type_annotation: self.alloc(type_annotation),
                optional,
            }
        } else {
            let type_annotation = self.flow_parse_type()?;
            NodeKind::FunctionTypeParam {
                name: None,
                type_annotation: self.alloc(type_annotation),
                optional: false,
            }
        };
        Ok(self.finish_node(start, kind))
    }

    // ========================================================================
    // Object types
    // ========================================================================

    /// `{ ... }`, or `{| ... |}` when `allow_exact` is set. Members may be
    /// marked `static` when `allow_static` is set.
    fn flow_parse_object_type(&mut self, allow_static: bool, allow_exact: bool) -> PResult<Node<'a>> {
        self.in_type_context(|p| {
            let start = p.start_node();
            let exact = allow_exact && p.matches(TokenType::BraceBarL);
            let close = if exact {
                p.next()?;
                TokenType::BraceBarR
            } else {
                p.expect(TokenType::BraceL)?;
                TokenType::BraceR
            };
            let mut properties = Vec::new();
            let mut indexers = Vec::new();
            while !p.matches(close) {
                let member_start = p.start_node();
                let is_static = allow_static
                    && p.is_contextual("static")
                    && !matches!(p.lookahead()?.token_type, TokenType::Colon | TokenType::Question);
                if is_static {
                    p.next()?;
                }
                if p.matches(TokenType::BracketL) {
                    indexers.push(p.flow_parse_object_type_indexer(member_start, is_static)?);
                } else {
                    properties.push(p.flow_parse_object_type_property(member_start, is_static)?);
                }
                if !p.eat(TokenType::Semi)? && !p.eat(TokenType::Comma)? && !p.matches(close) {
                    return p.unexpected();
                }
            }
            p.expect(close)?;
            Ok(p.finish_node(
                start,
                NodeKind::ObjectTypeAnnotation {
                    properties: p.alloc_list(properties),
                    indexers: p.alloc_list(indexers),
                    exact,
                },
            ))
        })
    }

    /// `key: T`, `key?: T` or `key<T>(params): R`.
    fn flow_parse_object_type_property(&mut self, start: NodeStart, is_static: bool) -> PResult<Node<'a>> {
        let key = match self.cur() {
            TokenType::String | TokenType::Num => self.parse_literal()?,
            _ => self.parse_identifier(true)?,
        };
        let (value, optional, method) = if self.is_relational("<") || self.matches(TokenType::ParenL) {
            (self.flow_parse_object_type_method(start)?, false, true)
        } else {
            let optional = self.eat(TokenType::Question)?;
            (self.flow_parse_type_initialiser(TokenType::Colon)?, optional, false)
        };
        Ok(self.finish_node(
            start,
            NodeKind::ObjectTypeProperty {
                key: self.alloc(key),
                value: self.alloc(value),
                optional,
                method,
                is_static,
            },
        ))
    }

    /// The function type of an object type method, spanning from its key.
    fn flow_parse_object_type_method(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        let type_parameters = self.flow_parse_optional_declaration()?;
        self.expect(TokenType::ParenL)?;
        let (params, rest) = self.flow_parse_function_type_params(Vec::new())?;
        self.expect(TokenType::ParenR)?;
        let return_type = self.flow_parse_type_initialiser(TokenType::Colon)?;
        Ok(self.finish_node(
            start,
            NodeKind::FunctionTypeAnnotation {
                type_parameters,
                params: self.alloc_list(params),
                rest,
                return_type: self.alloc(return_type),
            },
        ))
    }

    /// `[name: Key]: Value`. The name is optional.
    fn flow_parse_object_type_indexer(&mut self, start: NodeStart, is_static: bool) -> PResult<Node<'a>> {
        self.expect(TokenType::BracketL)?;
        let id = if self.matches(TokenType::Name) && self.lookahead()?.token_type == TokenType::Colon {
            let id = self.parse_identifier(true)?;
            Some(self.alloc(id))
        } else {
            None
        };
        let key = match id {
            Some(_) => self.flow_parse_type_initialiser(TokenType::Colon)?,
            None => self.flow_parse_type()?,
        };
        self.expect(TokenType::BracketR)?;
        let value = self.flow_parse_type_initialiser(TokenType::Colon)?;
        Ok(self.finish_node(
            start,
            NodeKind::ObjectTypeIndexer {
                id,
                key: self.alloc(key),
                value: self.alloc(value),
                is_static,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use bumpalo::Bump;
    use serde_json::Value;

    fn parse_flow(source: &str) -> Value {
        let arena = Bump::new();
        let options = ParserOptions::module().with_plugin("flow");
        let file = crate::parse(&arena, source, &options).unwrap();
        serde_json::to_value(&file.program).unwrap()
    }

    fn first_type(source: &str) -> Value {
        let program = parse_flow(source);
        program["body"][0]["declarations"][0]["id"]["typeAnnotation"]["typeAnnotation"].clone()
    }

    #[test]
    fn test_variable_annotation() {
        let ty = first_type("var a: number = 1;");
        assert_eq!(ty["type"], "NumberTypeAnnotation");
    }

    #[test]
    fn test_union_of_nullable_and_arrays() {
        let ty = first_type("var a: ?A | B & C[];");
        assert_eq!(ty["type"], "UnionTypeAnnotation");
        assert_eq!(ty["types"][0]["type"], "NullableTypeAnnotation");
        assert_eq!(ty["types"][1]["type"], "IntersectionTypeAnnotation");
        assert_eq!(ty["types"][1]["types"][1]["type"], "ArrayTypeAnnotation");
    }

    #[test]
    fn test_nested_generics_close_separately() {
        let ty = first_type("var a: Array<Array<T>> = [];");
        assert_eq!(ty["type"], "GenericTypeAnnotation");
        let inner = &ty["typeParameters"]["params"][0];
        assert_eq!(inner["id"]["name"], "Array");
        assert_eq!(inner["typeParameters"]["params"][0]["id"]["name"], "T");
    }

    #[test]
    fn test_function_params_and_return_type() {
        let program = parse_flow("function f(x?: string, ...rest: Array<number>): void {}");
        let function = &program["body"][0];
        assert_eq!(function["params"][0]["optional"], true);
        assert_eq!(function["params"][1]["type"], "RestElement");
        assert_eq!(function["returnType"]["typeAnnotation"]["type"], "VoidTypeAnnotation");
    }

    #[test]
    fn test_unnamed_function_type_params() {
        let ty = first_type("var f: (string, number) => void;");
        assert_eq!(ty["type"], "FunctionTypeAnnotation");
        assert_eq!(ty["params"].as_array().map(Vec::len), Some(2));
        assert_eq!(ty["params"][0]["name"], Value::Null);
        assert_eq!(ty["params"][1]["typeAnnotation"]["type"], "NumberTypeAnnotation");
    }

    #[test]
    fn test_grouped_type() {
        let ty = first_type("var a: (number | string)[];");
        assert_eq!(ty["type"], "ArrayTypeAnnotation");
        assert_eq!(ty["elementType"]["type"], "UnionTypeAnnotation");
    }

    #[test]
    fn test_literal_and_tuple_types() {
        let ty = first_type("var t: [\"s\", -1, true, typeof x, null, this];");
        assert_eq!(ty["types"][0]["type"], "StringLiteralTypeAnnotation");
        assert_eq!(ty["types"][1]["value"], -1.0);
        assert_eq!(ty["types"][1]["raw"], "-1");
        assert_eq!(ty["types"][2]["type"], "BooleanLiteralTypeAnnotation");
        assert_eq!(ty["types"][3]["type"], "TypeofTypeAnnotation");
        assert_eq!(ty["types"][4]["type"], "NullLiteralTypeAnnotation");
        assert_eq!(ty["types"][5]["type"], "ThisTypeAnnotation");
    }

    #[test]
    fn test_type_alias_with_object_type() {
        let program = parse_flow("type A<T> = { a: T, b?: string; [k: string]: number, m(x: T): void };");
        let alias = &program["body"][0];
        assert_eq!(alias["type"], "TypeAlias");
        assert_eq!(alias["typeParameters"]["params"][0]["name"], "T");
        let object = &alias["right"];
        assert_eq!(object["properties"][1]["optional"], true);
        assert_eq!(object["properties"][2]["method"], true);
        assert_eq!(object["properties"][2]["value"]["type"], "FunctionTypeAnnotation");
        assert_eq!(object["indexers"][0]["id"]["name"], "k");
    }

    #[test]
    fn test_interface_declaration() {
        let program = parse_flow("interface I<T> extends A.B<T>, C { x: T }");
        let interface = &program["body"][0];
        assert_eq!(interface["type"], "InterfaceDeclaration");
        assert_eq!(interface["extends"][0]["id"]["type"], "QualifiedTypeIdentifier");
        assert_eq!(interface["body"]["properties"][0]["key"]["name"], "x");
    }

    #[test]
    fn test_class_annotations() {
        let arena = Bump::new();
        let options = ParserOptions::default().with_plugin("flow");
        let file = crate::parse(&arena, "class A<T> extends B<T> implements I, J<T> { p: T; m<U>(u: U): T {} }", &options).unwrap();
        let class = serde_json::to_value(&file.program).unwrap()["body"][0].clone();
        assert_eq!(class["typeParameters"]["type"], "TypeParameterDeclaration");
        assert_eq!(class["superTypeParameters"]["type"], "TypeParameterInstantiation");
        assert_eq!(class["implements"][1]["type"], "ClassImplements");
        assert_eq!(class["body"]["body"][0]["type"], "ClassProperty");
        assert_eq!(class["body"]["body"][1]["typeParameters"]["params"][0]["name"], "U");
    }

    #[test]
    fn test_arrow_functions() {
        let program = parse_flow("const f = (x?: number, y: string): string => y;");
        let arrow = &program["body"][0]["declarations"][0]["init"];
        assert_eq!(arrow["type"], "ArrowFunctionExpression");
        assert_eq!(arrow["params"][0]["optional"], true);
        assert_eq!(arrow["params"][1]["typeAnnotation"]["typeAnnotation"]["type"], "StringTypeAnnotation");
        assert_eq!(arrow["returnType"]["type"], "TypeAnnotation");

        let program = parse_flow("<T>(x: T): T => x;");
        let arrow = &program["body"][0]["expression"];
        assert_eq!(arrow["typeParameters"]["params"][0]["name"], "T");
    }

    #[test]
    fn test_type_cast_and_conditional_in_parens() {
        let program = parse_flow("(x: any); (a ? b : c);");
        assert_eq!(program["body"][0]["expression"]["type"], "TypeCastExpression");
        assert_eq!(program["body"][1]["expression"]["type"], "ConditionalExpression");
    }

    #[test]
    fn test_type_imports_and_exports() {
        let program = parse_flow("import type { A } from \"a\"; import typeof B from \"b\"; export type C = A; export type { A };");
        assert_eq!(program["body"][0]["importKind"], "type");
        assert_eq!(program["body"][1]["importKind"], "typeof");
        assert_eq!(program["body"][2]["declaration"]["type"], "TypeAlias");
        assert_eq!(program["body"][3]["exportKind"], "type");
    }

    #[test]
    fn test_type_is_still_an_identifier() {
        let program = parse_flow("type = 1; import type from \"t\";");
        assert_eq!(program["body"][0]["expression"]["left"]["name"], "type");
        assert_eq!(program["body"][1]["importKind"], "value");
    }

    #[test]
    fn test_declare_statements() {
        let program = parse_flow(
            "declare var v: number;\n\
             declare function f<T>(x: T, ...rest: Array<T>): string;\n\
             declare class C<T> extends B<T> { static create(): C<T>; x: T; static [k: string]: T }",
        );
        let var = &program["body"][0];
        assert_eq!(var["type"], "DeclareVariable");
        assert_eq!(var["id"]["typeAnnotation"]["typeAnnotation"]["type"], "NumberTypeAnnotation");

        let function = &program["body"][1];
        assert_eq!(function["type"], "DeclareFunction");
        let signature = &function["id"]["typeAnnotation"]["typeAnnotation"];
        assert_eq!(signature["type"], "FunctionTypeAnnotation");
        assert_eq!(signature["typeParameters"]["params"][0]["name"], "T");
        assert_eq!(signature["params"][0]["name"]["name"], "x");
        assert_eq!(signature["rest"]["name"]["name"], "rest");
        assert_eq!(signature["returnType"]["type"], "StringTypeAnnotation");
        assert_eq!(function["id"]["end"].as_u64(), function["end"].as_u64().map(|end| end - 1));

        let class = &program["body"][2];
        assert_eq!(class["type"], "DeclareClass");
        assert_eq!(class["extends"][0]["type"], "InterfaceExtends");
        let properties = &class["body"]["properties"];
        assert_eq!(properties[0]["static"], true);
        assert_eq!(properties[0]["method"], true);
        assert_eq!(properties[1]["static"], false);
        assert_eq!(class["body"]["indexers"][0]["static"], true);
    }

    #[test]
    fn test_declare_module() {
        let program = parse_flow("declare module \"m\" { declare var a: A; declare function f(): void; }\ndeclare module N {}");
        let module = &program["body"][0];
        assert_eq!(module["type"], "DeclareModule");
        assert_eq!(module["id"]["type"], "StringLiteral");
        assert_eq!(module["body"]["type"], "BlockStatement");
        assert_eq!(module["body"]["body"][0]["type"], "DeclareVariable");
        assert_eq!(module["body"]["body"][1]["type"], "DeclareFunction");
        assert_eq!(program["body"][1]["id"]["name"], "N");

        let arena = Bump::new();
        let options = ParserOptions::module().with_plugin("flow");
        let err = crate::parse(&arena, "declare module m { var a; }", &options).unwrap_err();
        assert_eq!(err.pos, 19);
    }

    #[test]
    fn test_declare_is_still_an_identifier() {
        let program = parse_flow("declare;\ndeclare\nclass A {}\ndeclare = 1;");
        assert_eq!(program["body"][0]["expression"]["name"], "declare");
        assert_eq!(program["body"][1]["expression"]["name"], "declare");
        assert_eq!(program["body"][2]["type"], "ClassDeclaration");
        assert_eq!(program["body"][3]["expression"]["type"], "AssignmentExpression");
    }

    #[test]
    fn test_exact_object_types() {
        let ty = first_type("var o: {| a: number, b?: {||} |} = x;");
        assert_eq!(ty["type"], "ObjectTypeAnnotation");
        assert_eq!(ty["exact"], true);
        assert_eq!(ty["properties"][1]["optional"], true);
        assert_eq!(ty["properties"][1]["value"]["exact"], true);

        let ty = first_type("var o: { a: A | B } | {| c: C |};");
        assert_eq!(ty["types"][0]["exact"], false);
        assert_eq!(ty["types"][0]["properties"][0]["value"]["type"], "UnionTypeAnnotation");
        assert_eq!(ty["types"][1]["exact"], true);
    }

    #[test]
    fn test_exact_object_not_allowed_in_interfaces() {
        let arena = Bump::new();
        let options = ParserOptions::module().with_plugin("flow");
        assert!(crate::parse(&arena, "interface I {| a: A |}", &options).is_err());
    }

    #[test]
    fn test_exact_object_tokens() {
        let arena = Bump::new();
        let options = ParserOptions::module().with_plugin("flow");
        let file = crate::parse(&arena, "var o: {||} = a || {};", &options).unwrap();
        let labels: Vec<&str> = file.tokens.iter().map(|token| token.token_type.label()).collect();
        assert_eq!(labels, ["var", "name", ":", "{|", "|}", "=", "name", "||", "{", "}", ";", "eof"]);
    }

    #[test]
    fn test_async_generic_arrow() {
        let program = parse_flow("const f = async <T>(x: T): T => x;");
        let arrow = &program["body"][0]["declarations"][0]["init"];
        assert_eq!(arrow["type"], "ArrowFunctionExpression");
        assert_eq!(arrow["async"], true);
        assert_eq!(arrow["start"], 10);
        assert_eq!(arrow["typeParameters"]["params"][0]["name"], "T");
        assert_eq!(arrow["params"][0]["name"], "x");
        assert_eq!(arrow["returnType"]["typeAnnotation"]["type"], "GenericTypeAnnotation");

        let program = parse_flow("async < b;");
        assert_eq!(program["body"][0]["expression"]["type"], "BinaryExpression");
        assert_eq!(program["body"][0]["expression"]["left"]["name"], "async");
    }

    #[test]
    fn test_annotations_need_the_extension() {
        let arena = Bump::new();
        assert!(crate::parse(&arena, "var a: number;", &ParserOptions::default()).is_err());
    }
}
