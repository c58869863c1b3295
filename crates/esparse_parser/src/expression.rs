//! Expressions.
//!
//! Operator precedence is resolved by precedence climbing over the binary
//! operator table of [`TokenType`]. Everything above the operators is plain
//! recursive descent.
//!
//! Object and array literals may turn out to be patterns (`({a = 1} = b)`).
//! While such a literal is parsed as an expression, the offset of the first
//! shorthand default is carried upward in a [`Marked`] result. The caller
//! that decides the literal is a pattern drops the marker; every other
//! caller turns it into an error.

use esparse_ast::token_type::{is_reserved_word, is_strict_bind_reserved_word, is_strict_reserved_word};
use esparse_ast::{
    Function, Method, MethodKind, Node, NodeKind, OptionalNode, TemplateValue, TokenType, TokenValue,
};
use esparse_core::collections::name_set;
use esparse_diagnostics::messages;

use crate::parser::{Marked, NodeStart, PResult, Parser};

/// Normalise line terminators of raw template text.
fn normalize_raw(raw: &str) -> Option<String> {
    if !raw.contains('\r') {
        return None;
    }
    Some(raw.replace("\r\n", "\n").replace('\r', "\n"))
}

impl<'a> Parser<'a> {
    // ========================================================================
    // Entry points
    // ========================================================================

    /// An expression, including the comma operator.
    pub fn parse_expression(&mut self, no_in: bool) -> PResult<Node<'a>> {
        let start = self.start_node();
        let first = self.parse_maybe_assign(no_in)?;
        if !self.matches(TokenType::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(TokenType::Comma)? {
            expressions.push(self.parse_maybe_assign(no_in)?);
        }
        Ok(self.finish_node(
            start,
            NodeKind::SequenceExpression {
                expressions: self.alloc_list(expressions),
            },
        ))
    }

    /// Like [`Parser::parse_expression`], but shorthand defaults are passed
    /// to the caller instead of being rejected.
    pub fn parse_expression_marked(&mut self, no_in: bool) -> PResult<Marked<'a>> {
        let start = self.start_node();
        let first = self.parse_maybe_assign_marked(no_in, false)?;
        if !self.matches(TokenType::Comma) {
            return Ok(first);
        }
        let mut marker = first.shorthand_default;
        let mut expressions = vec![first.node];
        while self.eat(TokenType::Comma)? {
            let item = self.parse_maybe_assign_marked(no_in, false)?;
            marker = marker.or(item.shorthand_default);
            expressions.push(item.node);
        }
        let node = self.finish_node(
            start,
            NodeKind::SequenceExpression {
                expressions: self.alloc_list(expressions),
            },
        );
        Ok(Marked {
            node,
            shorthand_default: marker,
        })
    }

    /// An assignment expression. Shorthand defaults are an error here.
    pub fn parse_maybe_assign(&mut self, no_in: bool) -> PResult<Node<'a>> {
        let marked = self.parse_maybe_assign_marked(no_in, false)?;
        self.reject_marker(marked)
    }

    pub(crate) fn reject_marker(&self, marked: Marked<'a>) -> PResult<Node<'a>> {
        match marked.shorthand_default {
            Some(pos) => self.unexpected_at(pos),
            None => Ok(marked.node),
        }
    }

    /// An assignment expression. With `paren_item`, the left-hand side is an
    /// item of a parenthesized list and passes through the paren-item hook.
    pub fn parse_maybe_assign_marked(&mut self, no_in: bool, paren_item: bool) -> PResult<Marked<'a>> {
        self.enter()?;
        let result = self.parse_maybe_assign_inner(no_in, paren_item);
        self.leave();
        result
    }

    fn parse_maybe_assign_inner(&mut self, no_in: bool, paren_item: bool) -> PResult<Marked<'a>> {
        if self.matches(TokenType::Yield) && self.state.in_generator {
            return Ok(Marked::plain(self.parse_yield()?));
        }

        let start = self.start_node();
        if matches!(self.cur(), TokenType::ParenL | TokenType::Name) {
            self.state.potential_arrow_at = Some(self.start_pos());
        }
        let mut left = self.parse_maybe_conditional(no_in, paren_item)?;
        if paren_item {
            left.node = self.parse_paren_item(left.node, start)?;
        }

        if !self.cur().is_assign() {
            return Ok(left);
        }
        let operator = self.text();
        let target = if self.matches(TokenType::Eq) {
            self.to_assignable(left.node, false)?
        } else {
            left.node
        };
        self.check_lval(&target, false, None, "assignment expression")?;
        self.check_parenthesized_pattern(&target)?;
        self.next()?;
        let right = self.parse_maybe_assign(no_in)?;
        Ok(Marked::plain(self.finish_node(
            start,
            NodeKind::AssignmentExpression {
                operator,
                left: self.alloc(target),
                right: self.alloc(right),
            },
        )))
    }

    // ========================================================================
    // Conditional and binary operators
    // ========================================================================

    fn parse_maybe_conditional(&mut self, no_in: bool, paren_item: bool) -> PResult<Marked<'a>> {
        let start = self.start_node();
        let expr = self.parse_expr_ops(no_in)?;
        if expr.shorthand_default.is_some() || !self.matches(TokenType::Question) {
            return Ok(expr);
        }
        // In a parenthesized list with type annotations, `?` may instead mark
        // an optional arrow parameter: `(x?: T) => x`.
        if paren_item && self.has_plugin("flow") {
            let test = expr.node.clone();
            return Ok(match self.try_parse(|p| p.parse_conditional(start, test, no_in)) {
                Some(node) => Marked::plain(node),
                None => expr,
            });
        }
        self.parse_conditional(start, expr.node, no_in).map(Marked::plain)
    }

    /// `? consequent : alternate` after `test`.
    fn parse_conditional(&mut self, start: NodeStart, test: Node<'a>, no_in: bool) -> PResult<Node<'a>> {
        self.expect(TokenType::Question)?;
        let consequent = self.parse_maybe_assign(false)?;
        self.expect(TokenType::Colon)?;
        let alternate = self.parse_maybe_assign(no_in)?;
        Ok(self.finish_node(
            start,
            NodeKind::ConditionalExpression {
                test: self.alloc(test),
                consequent: self.alloc(consequent),
                alternate: self.alloc(alternate),
            },
        ))
    }

    fn parse_expr_ops(&mut self, no_in: bool) -> PResult<Marked<'a>> {
        let start = self.start_node();
        let expr = self.parse_maybe_unary_marked(true)?;
        if expr.shorthand_default.is_some() {
            return Ok(expr);
        }
        Ok(Marked::plain(self.parse_expr_op(expr.node, start, -1, no_in)?))
    }

    /// Fold binary operators binding tighter than `min_prec` onto `left`.
    fn parse_expr_op(&mut self, mut left: Node<'a>, left_start: NodeStart, min_prec: i32, no_in: bool) -> PResult<Node<'a>> {
        loop {
            let token = self.cur();
            let Some(prec) = token.binop() else {
                return Ok(left);
            };
            let prec = i32::from(prec);
            if (no_in && token == TokenType::In) || prec <= min_prec {
                return Ok(left);
            }
            let operator = self.operator_text();
            if token == TokenType::Exponent && !left.is_parenthesized() {
                if let NodeKind::UnaryExpression { argument, .. } = left.kind {
                    return Err(self.raise(argument.start(), &messages::ILLEGAL_EXPONENT_LHS, &[]));
                }
            }
            self.next()?;

            let right_start = self.start_node();
            let operand = self.parse_maybe_unary()?;
            let next_min = if token.right_associative() { prec - 1 } else { prec };
            let right = self.parse_expr_op(operand, right_start, next_min, no_in)?;

            let left_ref = self.alloc(left);
            let right = self.alloc(right);
            let kind = if matches!(token, TokenType::LogicalOr | TokenType::LogicalAnd) {
                NodeKind::LogicalExpression {
                    operator,
                    left: left_ref,
                    right,
                }
            } else {
                NodeKind::BinaryExpression {
                    operator,
                    left: left_ref,
                    right,
                }
            };
            left = self.finish_node(left_start, kind);
        }
    }

    /// The source text of an operator token. Keyword operators carry their
    /// word as the value.
    fn operator_text(&self) -> &'a str {
        match self.value() {
            TokenValue::Str(text) => text,
            _ => self.cur().label(),
        }
    }

    // ========================================================================
    // Unary operators
    // ========================================================================

    pub fn parse_maybe_unary(&mut self) -> PResult<Node<'a>> {
        let marked = self.parse_maybe_unary_marked(false)?;
        self.reject_marker(marked)
    }

    fn parse_maybe_unary_marked(&mut self, track: bool) -> PResult<Marked<'a>> {
        if self.cur().prefix() {
            self.enter()?;
            let result = self.parse_prefix_unary();
            self.leave();
            return result.map(Marked::plain);
        }

        let start = self.start_node();
        let expr = self.parse_expr_subscripts(track)?;
        if expr.shorthand_default.is_some() {
            return Ok(expr);
        }
        let mut node = expr.node;
        while self.cur().postfix() && !self.can_insert_semicolon() {
            self.check_lval(&node, false, None, "postfix operation")?;
            let operator = self.operator_text();
            self.next()?;
            node = self.finish_node(
                start,
                NodeKind::UpdateExpression {
                    operator,
                    prefix: false,
                    argument: self.alloc(node),
                },
            );
        }
        Ok(Marked::plain(node))
    }

    fn parse_prefix_unary(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let update = self.matches(TokenType::IncDec);
        let operator = self.operator_text();
        self.next()?;
        let argument = self.parse_maybe_unary()?;

        if update {
            self.check_lval(&argument, false, None, "prefix operation")?;
        } else if self.strict() && operator == "delete" && matches!(argument.kind, NodeKind::Identifier { .. }) {
            return Err(self.raise(start.pos, &messages::DELETE_LOCAL_IN_STRICT, &[]));
        }

        let argument = self.alloc(argument);
        let kind = if update {
            NodeKind::UpdateExpression {
                operator,
                prefix: true,
                argument,
            }
        } else {
            NodeKind::UnaryExpression {
                operator,
                prefix: true,
                argument,
            }
        };
        Ok(self.finish_node(start, kind))
    }

    // ========================================================================
    // Calls and member access
    // ========================================================================

    pub(crate) fn parse_expr_subscripts(&mut self, track: bool) -> PResult<Marked<'a>> {
        let start = self.start_node();
        let potential_arrow_at = self.state.potential_arrow_at;
        let expr = self.parse_expr_atom(track)?;

        if matches!(expr.node.kind, NodeKind::ArrowFunctionExpression(_))
            && potential_arrow_at == Some(expr.node.start())
        {
            return Ok(expr);
        }
        if expr.shorthand_default.is_some() {
            return Ok(expr);
        }
        Ok(Marked::plain(self.parse_subscripts(expr.node, start, false)?))
    }

    /// Member accesses, calls, bind operators and tagged templates applied
    /// to `base`. With `no_calls`, stop before an argument list.
    pub fn parse_subscripts(&mut self, mut base: Node<'a>, start: NodeStart, no_calls: bool) -> PResult<Node<'a>> {
        loop {
            if !no_calls && self.eat(TokenType::DoubleColon)? {
                let callee = self.parse_no_call_expr()?;
                base = self.finish_node(
                    start,
                    NodeKind::BindExpression {
                        object: Some(self.alloc(base)),
                        callee: self.alloc(callee),
                    },
                );
            } else if self.eat(TokenType::Dot)? {
                let property = self.parse_identifier(true)?;
                base = self.finish_node(
                    start,
                    NodeKind::MemberExpression {
                        object: self.alloc(base),
                        property: self.alloc(property),
                        computed: false,
                    },
                );
            } else if self.eat(TokenType::BracketL)? {
                let property = self.parse_expression(false)?;
                self.expect(TokenType::BracketR)?;
                base = self.finish_node(
                    start,
                    NodeKind::MemberExpression {
                        object: self.alloc(base),
                        property: self.alloc(property),
                        computed: true,
                    },
                );
            } else if !no_calls && self.matches(TokenType::ParenL) {
                let possible_async = self.state.potential_arrow_at == Some(base.start())
                    && base.identifier_name() == Some("async")
                    && !self.can_insert_semicolon();
                self.next()?;
                let (arguments, marker, inner_paren) = self.parse_call_arguments(possible_async)?;

                if possible_async && self.matches(TokenType::Arrow) {
                    if inner_paren.is_some() {
                        return self.unexpected();
                    }
                    self.next()?;
                    return self.parse_arrow_expression(start, arguments, true);
                }
                if let Some(pos) = marker {
                    return self.unexpected_at(pos);
                }
                base = self.finish_node(
                    start,
                    NodeKind::CallExpression {
                        callee: self.alloc(base),
                        arguments: self.alloc_list(arguments),
                    },
                );
            } else if self.matches(TokenType::BackQuote) {
                let quasi = self.parse_template()?;
                base = self.finish_node(
                    start,
                    NodeKind::TaggedTemplateExpression {
                        tag: self.alloc(base),
                        quasi: self.alloc(quasi),
                    },
                );
            } else {
                return Ok(base);
            }
        }
    }

    /// Arguments after `(`, up to and including `)`. When the call may be
    /// the head of an async arrow, shorthand defaults are collected instead
    /// of rejected, and the start of the first parenthesized argument is
    /// returned as well.
    fn parse_call_arguments(&mut self, possible_async: bool) -> PResult<(Vec<Node<'a>>, Option<u32>, Option<u32>)> {
        let mut arguments = Vec::new();
        let mut marker = None;
        let mut inner_paren = None;
        let mut first = true;
        while !self.eat(TokenType::ParenR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.eat(TokenType::ParenR)? {
                    break;
                }
            }
            if self.matches(TokenType::ParenL) && inner_paren.is_none() {
                inner_paren = Some(self.start_pos());
            }
            if let Some(item) = self.parse_expr_list_item(false, possible_async)? {
                marker = marker.or(item.shorthand_default);
                arguments.push(item.node);
            }
        }
        Ok((arguments, marker, inner_paren))
    }

    /// A callee of `new` or `::`: an atom with member accesses only.
    fn parse_no_call_expr(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let atom = self.parse_expr_atom(false)?;
        let atom = self.reject_marker(atom)?;
        self.parse_subscripts(atom, start, true)
    }

    // ========================================================================
    // Atoms
    // ========================================================================

    /// Primary expressions of the base grammar.
    pub fn base_parse_expr_atom(&mut self, track: bool) -> PResult<Marked<'a>> {
        let can_be_arrow = self.state.potential_arrow_at == Some(self.start_pos());
        let start = self.start_node();
        let node = match self.cur() {
            TokenType::Super => {
                let allowed = self.options.allow_super_outside_method;
                if self.state.in_method.is_none() && !self.state.in_class_property && !allowed {
                    return Err(self.raise(start.pos, &messages::SUPER_OUTSIDE_METHOD, &[]));
                }
                self.next()?;
                if self.matches(TokenType::ParenL) && self.state.in_method != Some(MethodKind::Constructor) && !allowed
                {
                    return Err(self.raise(start.pos, &messages::SUPER_CALL_OUTSIDE_CONSTRUCTOR, &[]));
                }
                if !matches!(self.cur(), TokenType::ParenL | TokenType::BracketL | TokenType::Dot) {
                    return Err(self.raise(start.pos, &messages::UNEXPECTED_SUPER, &[]));
                }
                self.finish_node(start, NodeKind::Super)
            }

            TokenType::This => {
                self.next()?;
                self.finish_node(start, NodeKind::ThisExpression)
            }

            TokenType::Yield if self.state.in_generator => return self.unexpected(),

            TokenType::Yield | TokenType::Name => return self.parse_name_atom(start, can_be_arrow).map(Marked::plain),

            TokenType::Do => {
                self.expect_plugin("doExpressions", None)?;
                self.next()?;
                let body = self.parse_block(false)?;
                self.finish_node(start, NodeKind::DoExpression { body: self.alloc(body) })
            }

            TokenType::Regexp | TokenType::Num | TokenType::String => self.parse_literal()?,

            TokenType::Null => {
                self.next()?;
                self.finish_node(start, NodeKind::NullLiteral)
            }

            TokenType::True | TokenType::False => {
                let value = self.matches(TokenType::True);
                self.next()?;
                self.finish_node(start, NodeKind::BooleanLiteral { value })
            }

            TokenType::ParenL => self.parse_paren_and_distinguish(can_be_arrow)?,

            TokenType::BracketL => {
                self.next()?;
                let (elements, marker) = self.parse_expr_list(TokenType::BracketR, true, track)?;
                let node = self.finish_node(
                    start,
                    NodeKind::ArrayExpression {
                        elements: self.arena().alloc_slice_fill_iter(elements),
                    },
                );
                return Ok(Marked {
                    node,
                    shorthand_default: marker,
                });
            }

            TokenType::BraceL => return self.parse_obj(false, track),

            TokenType::Function => self.parse_function_expression()?,

            TokenType::At => {
                self.parse_decorators(false)?;
                let start = self.start_node();
                self.parse_class(start, false, false)?
            }

            TokenType::Class => self.parse_class(start, false, false)?,

            TokenType::New => self.parse_new()?,

            TokenType::BackQuote => self.parse_template()?,

            TokenType::DoubleColon => {
                self.next()?;
                let callee = self.parse_no_call_expr()?;
                if !matches!(callee.kind, NodeKind::MemberExpression { .. }) {
                    return Err(self.raise(callee.start(), &messages::BIND_ON_PROPERTY, &[]));
                }
                self.finish_node(
                    start,
                    NodeKind::BindExpression {
                        object: None,
                        callee: self.alloc(callee),
                    },
                )
            }

            _ => return self.unexpected(),
        };
        Ok(Marked::plain(node))
    }

    /// An identifier, possibly the start of an arrow function, an async
    /// function or an `await` expression.
    fn parse_name_atom(&mut self, start: NodeStart, can_be_arrow: bool) -> PResult<Node<'a>> {
        let allow_await = self.state.in_async && self.text() == "await";
        let allow_yield = self.matches(TokenType::Yield) && !self.strict() && !self.state.in_generator;
        let id = self.parse_identifier(allow_await || allow_yield)?;
        let name = id.identifier_name().unwrap_or_default();

        if name == "await" && self.state.in_async {
            return self.parse_await(start);
        }
        if name == "async" && self.matches(TokenType::Function) && !self.can_insert_semicolon() {
            self.next()?;
            return self.parse_function(start, false, true, false);
        }
        if can_be_arrow && name == "async" && self.matches(TokenType::Name) && !self.can_insert_semicolon() {
            let param = self.parse_identifier(false)?;
            self.expect(TokenType::Arrow)?;
            return self.parse_arrow_expression(start, vec![param], true);
        }
        if can_be_arrow && !self.can_insert_semicolon() && self.eat(TokenType::Arrow)? {
            return self.parse_arrow_expression(start, vec![id], false);
        }
        Ok(id)
    }

    /// A numeric, string or regular expression literal.
    pub fn parse_literal(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let raw = self.source_of(self.start_pos(), self.lexer.state.end as u32);
        let kind = match (self.cur(), self.value()) {
            (TokenType::Num, TokenValue::Num(value)) => NodeKind::NumericLiteral { value, raw },
            (TokenType::String, TokenValue::Str(value)) => NodeKind::StringLiteral { value, raw },
            (TokenType::Regexp, TokenValue::Regex { pattern, flags }) => NodeKind::RegExpLiteral { pattern, flags, raw },
            _ => return self.unexpected(),
        };
        self.next()?;
        Ok(self.finish_node(start, kind))
    }

    /// An identifier. With `liberal`, keywords are accepted as names, as in
    /// property names.
    pub fn parse_identifier(&mut self, liberal: bool) -> PResult<Node<'a>> {
        let start = self.start_node();
        let name = match self.cur() {
            TokenType::Name => {
                let name = self.text();
                if !liberal {
                    if self.strict() && is_strict_reserved_word(name) {
                        return Err(self.raise(start.pos, &messages::RESERVED_WORD, &[name]));
                    }
                    let await_allowed = name == "await" && (!self.in_module() || self.state.in_async);
                    if is_reserved_word(name) && !await_allowed {
                        return Err(self.raise(start.pos, &messages::RESERVED_WORD, &[name]));
                    }
                    if name == "await" && self.state.in_async {
                        return Err(self.raise(start.pos, &messages::AWAIT_IN_ASYNC, &[]));
                    }
                }
                name
            }
            token if liberal => match token.keyword() {
                Some(keyword) => keyword,
                None => return self.unexpected(),
            },
            _ => return self.unexpected(),
        };
        self.next()?;
        Ok(self.identifier(start, name))
    }

    /// A binding name of a function or class.
    pub fn parse_binding_identifier(&mut self) -> PResult<Node<'a>> {
        let liberal = self.matches(TokenType::Yield) && !self.strict() && !self.state.in_generator;
        self.parse_identifier(liberal)
    }

    fn parse_await(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        if self.matches(TokenType::Star) {
            return Err(self.raise(start.pos, &messages::AWAIT_STAR_REMOVED, &[]));
        }
        let argument = self.parse_maybe_unary()?;
        Ok(self.finish_node(
            start,
            NodeKind::AwaitExpression {
                argument: self.alloc(argument),
            },
        ))
    }

    fn parse_yield(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.next()?;
        let bare = self.matches(TokenType::Semi)
            || self.can_insert_semicolon()
            || (!self.matches(TokenType::Star) && !self.cur().starts_expr());
        let (delegate, argument) = if bare {
            (false, None)
        } else {
            let delegate = self.eat(TokenType::Star)?;
            let argument = self.parse_maybe_assign(false)?;
            (delegate, Some(self.alloc(argument)))
        };
        Ok(self.finish_node(start, NodeKind::YieldExpression { argument, delegate }))
    }

    fn parse_new(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let meta = self.parse_identifier(true)?;
        if self.eat(TokenType::Dot)? {
            return self.parse_meta_property(start, meta, "target");
        }

        let callee = self.parse_no_call_expr()?;
        let arguments = if self.eat(TokenType::ParenL)? {
            let (arguments, _) = self.parse_expr_list(TokenType::ParenR, false, false)?;
            arguments.into_iter().flatten().collect()
        } else {
            Vec::new()
        };
        Ok(self.finish_node(
            start,
            NodeKind::NewExpression {
                callee: self.alloc(callee),
                arguments: self.alloc_list(arguments),
            },
        ))
    }

    /// `meta.property`, with the dot already consumed.
    fn parse_meta_property(&mut self, start: NodeStart, meta: Node<'a>, expected: &str) -> PResult<Node<'a>> {
        let property = self.parse_identifier(true)?;
        if property.identifier_name() != Some(expected) {
            let meta_name = meta.identifier_name().unwrap_or_default();
            return Err(self.raise(property.start(), &messages::INVALID_META_PROPERTY, &[meta_name, expected]));
        }
        Ok(self.finish_node(
            start,
            NodeKind::MetaProperty {
                meta: self.alloc(meta),
                property: self.alloc(property),
            },
        ))
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// Comma separated items up to and including `close`, with an optional
    /// trailing comma. Holes are allowed only with `allow_empty`.
    pub fn parse_expr_list(
        &mut self,
        close: TokenType,
        allow_empty: bool,
        track: bool,
    ) -> PResult<(Vec<Option<Node<'a>>>, Option<u32>)> {
        let mut elements = Vec::new();
        let mut marker = None;
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.eat(close)? {
                    break;
                }
            }
            match self.parse_expr_list_item(allow_empty, track)? {
                Some(item) => {
                    marker = marker.or(item.shorthand_default);
                    elements.push(Some(item.node));
                }
                None => elements.push(None),
            }
        }
        Ok((elements, marker))
    }

    fn parse_expr_list_item(&mut self, allow_empty: bool, track: bool) -> PResult<Option<Marked<'a>>> {
        if allow_empty && self.matches(TokenType::Comma) {
            return Ok(None);
        }
        let item = if self.matches(TokenType::Ellipsis) {
            self.parse_spread(track)?
        } else if track {
            self.parse_maybe_assign_marked(false, false)?
        } else {
            Marked::plain(self.parse_maybe_assign(false)?)
        };
        Ok(Some(item))
    }

    // ========================================================================
    // Parentheses and arrows
    // ========================================================================

    /// A parenthesized expression or the parameter list of an arrow
    /// function.
    fn parse_paren_and_distinguish(&mut self, can_be_arrow: bool) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.expect(TokenType::ParenL)?;
        let inner_start = self.start_node();

        let mut items = Vec::new();
        let mut marker = None;
        let mut spread_start = None;
        let mut trailing_comma = None;
        let mut first = true;
        while !self.matches(TokenType::ParenR) {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.matches(TokenType::ParenR) {
                    trailing_comma = Some(self.start_pos());
                    break;
                }
            }
            if self.matches(TokenType::Ellipsis) {
                let rest_start = self.start_node();
                spread_start = Some(rest_start.pos);
                let rest = self.parse_rest()?;
                items.push(self.parse_paren_item(rest, rest_start)?);
                break;
            }
            let item = self.parse_maybe_assign_marked(false, true)?;
            marker = marker.or(item.shorthand_default);
            items.push(item.node);
        }
        let inner_end = self.start_pos();
        let inner_end_loc = self.lexer.state.start_loc;
        self.expect(TokenType::ParenR)?;

        if can_be_arrow {
            let return_type = self.parse_arrow_return_type()?;
            if self.matches(TokenType::Arrow) && !self.has_preceding_line_break() {
                self.next()?;
                for item in &items {
                    if let Some(paren_start) = item.data.paren_start {
                        return self.unexpected_at(paren_start);
                    }
                }
                return self.parse_arrow_expression_typed(start, items, false, return_type);
            }
        }

        if items.is_empty() {
            return self.unexpected_at(self.last_tok_start());
        }
        if let Some(pos) = trailing_comma.or(spread_start).or(marker) {
            return self.unexpected_at(pos);
        }

        let mut value = if items.len() > 1 {
            self.finish_node_at(
                inner_start,
                NodeKind::SequenceExpression {
                    expressions: self.alloc_list(items),
                },
                inner_end,
                inner_end_loc,
            )
        } else {
            match items.pop() {
                Some(item) => item,
                None => return self.unexpected(),
            }
        };
        value.data.paren_start = Some(start.pos);
        Ok(value)
    }

    pub fn parse_arrow_expression(&mut self, start: NodeStart, params: Vec<Node<'a>>, is_async: bool) -> PResult<Node<'a>> {
        self.parse_arrow_expression_typed(start, params, is_async, None)
    }

    pub(crate) fn parse_arrow_expression_typed(
        &mut self,
        start: NodeStart,
        params: Vec<Node<'a>>,
        is_async: bool,
        return_type: OptionalNode<'a>,
    ) -> PResult<Node<'a>> {
        let params = self.to_assignable_list(params.into_iter().map(Some).collect(), true)?;
        let params = self.alloc_list(params.into_iter().flatten().collect());
        let (body, expression) = self.parse_function_body(None, params, is_async, false, true)?;
        Ok(self.finish_node(
            start,
            NodeKind::ArrowFunctionExpression(Function {
                id: None,
                generator: false,
                is_async,
                expression,
                params,
                body,
                type_parameters: None,
                return_type,
            }),
        ))
    }

    // ========================================================================
    // Functions
    // ========================================================================

    fn parse_function_expression(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let meta = self.parse_identifier(true)?;
        if self.state.in_generator && self.matches(TokenType::Dot) {
            self.expect_plugin("functionSent", None)?;
            self.next()?;
            return self.parse_meta_property(start, meta, "sent");
        }
        self.parse_function(start, false, false, false)
    }

    /// A function after the `function` keyword. `optional_id` lets a
    /// declaration omit its name, as in `export default function () {}`.
    pub fn parse_function(
        &mut self,
        start: NodeStart,
        is_statement: bool,
        is_async: bool,
        optional_id: bool,
    ) -> PResult<Node<'a>> {
        let old_in_method = self.state.in_method.take();
        let old_in_class_property = std::mem::replace(&mut self.state.in_class_property, false);

        let mut generator = false;
        if self.matches(TokenType::Star) {
            if is_async {
                self.expect_plugin("asyncGenerators", None)?;
            }
            generator = true;
            self.next()?;
        }

        let has_name = matches!(self.cur(), TokenType::Name | TokenType::Yield);
        if is_statement && !optional_id && !has_name {
            return self.unexpected();
        }
        let id = if has_name {
            let id = self.parse_binding_identifier()?;
            Some(self.alloc(id))
        } else {
            None
        };

        let type_parameters = self.parse_type_parameters()?;
        let params = self.parse_function_params()?;
        let return_type = self.parse_return_type()?;
        let (body, expression) = self.parse_function_body(id, params, is_async, generator, false)?;

        self.state.in_method = old_in_method;
        self.state.in_class_property = old_in_class_property;

        let function = Function {
            id,
            generator,
            is_async,
            expression,
            params,
            body,
            type_parameters,
            return_type,
        };
        Ok(self.finish_node(
            start,
            if is_statement {
                NodeKind::FunctionDeclaration(function)
            } else {
                NodeKind::FunctionExpression(function)
            },
        ))
    }

    /// `( params )` of a function or method.
    pub fn parse_function_params(&mut self) -> PResult<&'a [Node<'a>]> {
        self.expect(TokenType::ParenL)?;
        let params = self.parse_binding_list(TokenType::ParenR, false)?;
        Ok(self.alloc_list(params.into_iter().flatten().collect()))
    }

    /// The parameters and body of an object or class method, after its key.
    pub fn parse_method(
        &mut self,
        kind: MethodKind,
        generator: bool,
        is_async: bool,
        type_parameters: OptionalNode<'a>,
    ) -> PResult<Function<'a>> {
        let old_in_method = self.state.in_method.replace(kind);
        let params = self.parse_function_params()?;
        let return_type = self.parse_return_type()?;
        let (body, expression) = self.parse_function_body(None, params, is_async, generator, false)?;
        self.state.in_method = old_in_method;
        Ok(Function {
            id: None,
            generator,
            is_async,
            expression,
            params,
            body,
            type_parameters,
            return_type,
        })
    }

    /// A function body. With `allow_expression`, a body not starting with
    /// `{` is a single expression, as for arrows. Returns the body and
    /// whether it is an expression.
    ///
    /// Parameters are checked for duplicates when the function is strict or
    /// an arrow. A `"use strict"` directive in the body makes the function
    /// strict, which also forbids destructuring and default parameters.
    pub(crate) fn parse_function_body(
        &mut self,
        id: OptionalNode<'a>,
        params: &'a [Node<'a>],
        is_async: bool,
        generator: bool,
        allow_expression: bool,
    ) -> PResult<(&'a Node<'a>, bool)> {
        let is_expression = allow_expression && !self.matches(TokenType::BraceL);
        let old_in_async = std::mem::replace(&mut self.state.in_async, is_async);

        let body = if is_expression {
            self.parse_maybe_assign(false)?
        } else {
            let old_in_function = std::mem::replace(&mut self.state.in_function, true);
            let old_in_generator = std::mem::replace(&mut self.state.in_generator, generator);
            let old_labels = std::mem::take(&mut self.state.labels);
            let body = self.parse_block(true)?;
            self.state.in_function = old_in_function;
            self.state.in_generator = old_in_generator;
            self.state.labels = old_labels;
            body
        };
        self.state.in_async = old_in_async;

        let is_strict = !is_expression && has_use_strict(&body);
        if is_strict {
            if let Some(id) = id {
                if id.identifier_name() == Some("yield") {
                    return Err(self.raise(id.start(), &messages::BINDING_IN_STRICT, &["yield"]));
                }
            }
        }

        if self.strict() || allow_expression || is_strict {
            let old_strict = self.lexer.state.strict;
            if is_strict {
                self.lexer.state.strict = true;
            }
            if let Some(id) = id {
                self.check_lval(id, true, None, "function name")?;
            }
            let mut names = name_set();
            for param in params {
                if is_strict && !matches!(param.kind, NodeKind::Identifier { .. }) {
                    return Err(self.raise(param.start(), &messages::NON_SIMPLE_PARAMETER, &[]));
                }
                self.check_lval(param, true, Some(&mut names), "function parameter list")?;
            }
            self.lexer.state.strict = old_strict;
        }

        Ok((self.alloc(body), is_expression))
    }

    // ========================================================================
    // Templates
    // ========================================================================

    /// A template literal, starting at the opening backquote.
    pub fn parse_template(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.next()?;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let element = self.parse_template_element()?;
            let tail = matches!(element.kind, NodeKind::TemplateElement { tail: true, .. });
            quasis.push(element);
            if tail {
                break;
            }
            self.expect(TokenType::DollarBraceL)?;
            expressions.push(self.parse_expression(false)?);
            self.expect(TokenType::BraceR)?;
        }
        self.next()?;
        Ok(self.finish_node(
            start,
            NodeKind::TemplateLiteral {
                quasis: self.alloc_list(quasis),
                expressions: self.alloc_list(expressions),
            },
        ))
    }

    fn parse_template_element(&mut self) -> PResult<Node<'a>> {
        if !self.matches(TokenType::Template) {
            return self.unexpected();
        }
        let start = self.start_node();
        let raw = self.source_of(self.start_pos(), self.lexer.state.end as u32);
        let raw = match normalize_raw(raw) {
            Some(normalized) => self.alloc_str(&normalized),
            None => raw,
        };
        let cooked = self.text();
        self.next()?;
        let tail = self.matches(TokenType::BackQuote);
        Ok(self.finish_node(
            start,
            NodeKind::TemplateElement {
                value: TemplateValue { raw, cooked },
                tail,
            },
        ))
    }

    // ========================================================================
    // Object literals
    // ========================================================================

    /// An object literal, or an object pattern with `is_pattern`. Shorthand
    /// defaults are recorded when `track` is set and rejected otherwise.
    pub fn parse_obj(&mut self, is_pattern: bool, track: bool) -> PResult<Marked<'a>> {
        let start = self.start_node();
        self.next()?;

        let mut properties = Vec::new();
        let mut decorators = Vec::new();
        let mut marker = None;
        let mut has_proto = false;
        let mut first = true;
        while !self.eat(TokenType::BraceR)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
                if self.eat(TokenType::BraceR)? {
                    break;
                }
            }

            while self.matches(TokenType::At) {
                decorators.push(self.parse_decorator()?);
            }

            if self.matches(TokenType::Ellipsis) && self.has_plugin("objectRestSpread") {
                let spread = self.parse_spread(track && !is_pattern)?;
                marker = marker.or(spread.shorthand_default);
                let argument = match spread.node.kind {
                    NodeKind::SpreadElement { argument } => argument,
                    _ => return self.unexpected_at(spread.node.start()),
                };
                let kind = if is_pattern {
                    NodeKind::RestProperty { argument }
                } else {
                    NodeKind::SpreadProperty { argument }
                };
                properties.push(self.rewrap(&spread.node, kind));
                continue;
            }

            let prop_start = self.start_node();
            let prop_decorators = self.alloc_list(std::mem::take(&mut decorators));
            let mut generator = !is_pattern && self.eat(TokenType::Star)?;
            let mut is_async = false;
            let (key, computed) = if !is_pattern && self.is_contextual("async") {
                if generator {
                    return self.unexpected();
                }
                let async_id = self.parse_identifier(false)?;
                if matches!(
                    self.cur(),
                    TokenType::Colon | TokenType::ParenL | TokenType::BraceR | TokenType::Eq | TokenType::Comma
                ) {
                    (async_id, false)
                } else {
                    is_async = true;
                    if self.has_plugin("asyncGenerators") {
                        generator = self.eat(TokenType::Star)?;
                    }
                    self.parse_property_name()?
                }
            } else {
                self.parse_property_name()?
            };

            let prop = self.parse_obj_prop_value(
                prop_start,
                key,
                computed,
                prop_decorators,
                generator,
                is_async,
                is_pattern,
                track,
                &mut marker,
            )?;

            if !is_pattern && is_proto_property(&prop) {
                if has_proto {
                    if let NodeKind::ObjectProperty { key, .. } = prop.kind {
                        return Err(self.raise(key.start(), &messages::PROTO_REDEFINITION, &[]));
                    }
                }
                has_proto = true;
            }
            properties.push(prop);
        }

        if !decorators.is_empty() {
            return Err(self.raise(self.start_pos(), &messages::TRAILING_PROPERTY_DECORATORS, &[]));
        }

        let properties = self.alloc_list(properties);
        let kind = if is_pattern {
            NodeKind::ObjectPattern {
                properties,
                type_annotation: None,
            }
        } else {
            NodeKind::ObjectExpression { properties }
        };
        Ok(Marked {
            node: self.finish_node(start, kind),
            shorthand_default: marker,
        })
    }

    /// A property key. Returns the key and whether it is computed.
    pub fn parse_property_name(&mut self) -> PResult<(Node<'a>, bool)> {
        if self.eat(TokenType::BracketL)? {
            let key = self.parse_maybe_assign(false)?;
            self.expect(TokenType::BracketR)?;
            return Ok((key, true));
        }
        let key = if matches!(self.cur(), TokenType::Num | TokenType::String) {
            self.parse_literal()?
        } else {
            self.parse_identifier(true)?
        };
        Ok((key, false))
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_obj_prop_value(
        &mut self,
        start: NodeStart,
        key: Node<'a>,
        computed: bool,
        decorators: &'a [Node<'a>],
        generator: bool,
        is_async: bool,
        is_pattern: bool,
        track: bool,
        marker: &mut Option<u32>,
    ) -> PResult<Node<'a>> {
        if is_async || generator || self.matches(TokenType::ParenL) || self.is_relational("<") {
            if is_pattern {
                return self.unexpected();
            }
            let type_parameters = self.parse_type_parameters()?;
            let function = self.parse_method(MethodKind::Method, generator, is_async, type_parameters)?;
            return Ok(self.object_method(start, MethodKind::Method, key, computed, decorators, function));
        }

        if self.eat(TokenType::Colon)? {
            let value = if is_pattern {
                self.parse_maybe_default(None, None)?
            } else if track {
                let value = self.parse_maybe_assign_marked(false, false)?;
                *marker = marker.or(value.shorthand_default);
                value.node
            } else {
                self.parse_maybe_assign(false)?
            };
            return Ok(self.finish_node(
                start,
                NodeKind::ObjectProperty {
                    key: self.alloc(key),
                    value: self.alloc(value),
                    computed,
                    shorthand: false,
                    decorators,
                },
            ));
        }

        let accessor = match key.identifier_name() {
            Some("get") => Some(MethodKind::Get),
            Some("set") => Some(MethodKind::Set),
            _ => None,
        };
        if let Some(kind) = accessor {
            if !is_pattern
                && !computed
                && !matches!(self.cur(), TokenType::Comma | TokenType::BraceR | TokenType::Eq)
            {
                let (key, computed) = self.parse_property_name()?;
                let function = self.parse_method(kind, false, false, None)?;
                self.check_accessor_params(kind, function.params.len(), start.pos)?;
                return Ok(self.object_method(start, kind, key, computed, decorators, function));
            }
        }

        let Some(name) = key.identifier_name().filter(|_| !computed) else {
            return self.unexpected();
        };
        let is_keyword = TokenType::from_keyword(name).is_some();
        if is_pattern {
            let illegal = is_keyword
                || (self.strict()
                    && (is_strict_bind_reserved_word(name) || is_strict_reserved_word(name)));
            if illegal {
                return Err(self.raise(key.start(), &messages::BINDING_KEYWORD, &[name]));
            }
        } else if is_keyword {
            return Err(self.raise(key.start(), &messages::UNEXPECTED_KEYWORD, &[name]));
        } else if self.strict() && is_strict_reserved_word(name) {
            return Err(self.raise(key.start(), &messages::RESERVED_WORD, &[name]));
        }

        let value = if is_pattern {
            self.parse_maybe_default(Some(start), Some(key.clone()))?
        } else if self.matches(TokenType::Eq) && track {
            if marker.is_none() {
                *marker = Some(self.start_pos());
            }
            self.parse_maybe_default(Some(start), Some(key.clone()))?
        } else {
            key.clone()
        };
        Ok(self.finish_node(
            start,
            NodeKind::ObjectProperty {
                key: self.alloc(key),
                value: self.alloc(value),
                computed: false,
                shorthand: true,
                decorators,
            },
        ))
    }

    fn object_method(
        &self,
        start: NodeStart,
        kind: MethodKind,
        key: Node<'a>,
        computed: bool,
        decorators: &'a [Node<'a>],
        function: Function<'a>,
    ) -> Node<'a> {
        self.finish_node(
            start,
            NodeKind::ObjectMethod(Method {
                kind,
                key: self.alloc(key),
                computed,
                is_static: false,
                decorators,
                function,
            }),
        )
    }

    /// Getters take no parameters and setters exactly one.
    pub(crate) fn check_accessor_params(&self, kind: MethodKind, count: usize, pos: u32) -> PResult<()> {
        match kind {
            MethodKind::Get if count != 0 => Err(self.raise(pos, &messages::GETTER_NO_PARAMS, &[])),
            MethodKind::Set if count != 1 => Err(self.raise(pos, &messages::SETTER_ONE_PARAM, &[])),
            _ => Ok(()),
        }
    }
}

/// Whether a block body starts with a `"use strict"` directive.
fn has_use_strict(body: &Node<'_>) -> bool {
    let NodeKind::BlockStatement { directives, .. } = body.kind else {
        return false;
    };
    directives.iter().any(|directive| match directive.kind {
        NodeKind::Directive { value } => matches!(value.kind, NodeKind::DirectiveLiteral { value: "use strict", .. }),
        _ => false,
    })
}

/// A non-computed, non-shorthand `__proto__: value` property.
fn is_proto_property(prop: &Node<'_>) -> bool {
    match prop.kind {
        NodeKind::ObjectProperty {
            key,
            computed: false,
            shorthand: false,
            ..
        } => match key.kind {
            NodeKind::Identifier { name, .. } => name == "__proto__",
            NodeKind::StringLiteral { value, .. } => value == "__proto__",
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParserOptions;
    use bumpalo::Bump;

    fn expression<'a>(arena: &'a Bump, source: &'a str) -> PResult<Node<'a>> {
        let mut p = Parser::new(arena, source, &ParserOptions::default());
        p.next_token()?;
        p.parse_expression(false)
    }

    fn operator_of<'a>(node: &Node<'a>) -> &'a str {
        match node.kind {
            NodeKind::BinaryExpression { operator, .. } | NodeKind::LogicalExpression { operator, .. } => operator,
            _ => "",
        }
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let arena = Bump::new();
        let node = expression(&arena, "a + b * c").unwrap();
        assert_eq!(operator_of(&node), "+");
        let NodeKind::BinaryExpression { right, .. } = node.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(operator_of(right), "*");
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let arena = Bump::new();
        let node = expression(&arena, "a ** b ** c").unwrap();
        let NodeKind::BinaryExpression { left, right, .. } = node.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(left.identifier_name(), Some("a"));
        assert_eq!(operator_of(right), "**");
    }

    #[test]
    fn test_unary_exponent_base_is_rejected() {
        let arena = Bump::new();
        let err = expression(&arena, "-a ** 2").unwrap_err();
        assert_eq!(err.pos, 1);
        assert!(expression(&arena, "(-a) ** 2").is_ok());
    }

    #[test]
    fn test_logical_operators() {
        let arena = Bump::new();
        let node = expression(&arena, "a || b && c").unwrap();
        assert_eq!(node.kind.type_name(), "LogicalExpression");
        assert_eq!(operator_of(&node), "||");
    }

    #[test]
    fn test_parenthesized_records_start() {
        let arena = Bump::new();
        let node = expression(&arena, "(a, b)").unwrap();
        assert_eq!(node.kind.type_name(), "SequenceExpression");
        assert_eq!(node.start(), 1);
        assert_eq!(node.data.paren_start, Some(0));
    }

    #[test]
    fn test_shorthand_default_needs_a_pattern() {
        let arena = Bump::new();
        let err = expression(&arena, "({a = 1})").unwrap_err();
        assert_eq!(err.pos, 4);
        let node = expression(&arena, "({a = 1} = b)").unwrap();
        assert_eq!(node.kind.type_name(), "AssignmentExpression");
    }

    #[test]
    fn test_raw_template_text_is_normalised() {
        assert_eq!(normalize_raw("a\r\nb\rc").as_deref(), Some("a\nb\nc"));
        assert_eq!(normalize_raw("abc"), None);
    }
}
