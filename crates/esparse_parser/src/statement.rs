//! Statements, declarations, classes and modules.

use esparse_ast::{Class, Function, ImportKind, Method, MethodKind, Node, NodeKind, NodeList, TokenType, VarKind};
use esparse_diagnostics::messages;

use crate::parser::{Label, LabelKind, NodeStart, PResult, Parser};

/// Whether a statement can open the directive prologue.
fn is_directive_candidate(stmt: &Node<'_>) -> bool {
    match stmt.kind {
        NodeKind::ExpressionStatement { expression } => {
            matches!(expression.kind, NodeKind::StringLiteral { .. }) && !expression.is_parenthesized()
        }
        _ => false,
    }
}

/// The name of a non-computed key, for identifier and string keys alike.
fn static_key_name<'a>(key: &Node<'a>) -> Option<&'a str> {
    match key.kind {
        NodeKind::Identifier { name, .. } => Some(name),
        NodeKind::StringLiteral { value, .. } => Some(value),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    // ========================================================================
    // Blocks and directives
    // ========================================================================

    /// Statements up to and including `end`. Returns the statements and the
    /// directive prologue. A `"use strict"` directive makes the rest of the
    /// body strict and rejects octal literals seen before it.
    pub fn parse_block_body(
        &mut self,
        allow_directives: bool,
        top_level: bool,
        end: TokenType,
    ) -> PResult<(NodeList<'a>, NodeList<'a>)> {
        let mut body = Vec::new();
        let mut directives = Vec::new();
        let mut parsed_non_directive = false;
        let mut old_strict = None;
        let mut octal_position = None;

        loop {
            if self.matches(end) {
                // Leave strict mode before the token after the body is read.
                if old_strict == Some(false) {
                    self.set_strict(false)?;
                }
                self.next()?;
                break;
            }
            if allow_directives && !parsed_non_directive && octal_position.is_none() && self.lexer.state.contains_octal
            {
                octal_position = self.lexer.state.octal_position;
            }

            let stmt = self.parse_statement(true, top_level)?;

            if allow_directives && !parsed_non_directive && is_directive_candidate(&stmt) {
                let directive = self.statement_to_directive(&stmt);
                let use_strict = matches!(
                    directive.kind,
                    NodeKind::Directive { value } if matches!(value.kind, NodeKind::DirectiveLiteral { value: "use strict", .. })
                );
                directives.push(directive);
                if use_strict && old_strict.is_none() {
                    old_strict = Some(self.strict());
                    self.set_strict(true)?;
                    if let Some(pos) = octal_position {
                        return Err(self.raise(pos as u32, &messages::OCTAL_IN_STRICT, &[]));
                    }
                }
                continue;
            }

            parsed_non_directive = true;
            body.push(stmt);
        }

        Ok((self.alloc_list(body), self.alloc_list(directives)))
    }

    fn statement_to_directive(&self, stmt: &Node<'a>) -> Node<'a> {
        let NodeKind::ExpressionStatement { expression } = stmt.kind else {
            return stmt.clone();
        };
        let raw = match expression.kind {
            NodeKind::StringLiteral { raw, .. } => raw,
            _ => "",
        };
        let value = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
        let literal = self.rewrap(expression, NodeKind::DirectiveLiteral { value, raw });
        self.rewrap(
            stmt,
            NodeKind::Directive {
                value: self.alloc(literal),
            },
        )
    }

    /// `{ ... }`
    pub fn parse_block(&mut self, allow_directives: bool) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.expect(TokenType::BraceL)?;
        let (body, directives) = self.parse_block_body(allow_directives, false, TokenType::BraceR)?;
        Ok(self.finish_node(start, NodeKind::BlockStatement { body, directives }))
    }

    // ========================================================================
    // Statement dispatch
    // ========================================================================

    /// A statement. `declaration` allows function, class and lexical
    /// declarations; `top_level` allows `import` and `export`.
    pub fn parse_statement(&mut self, declaration: bool, top_level: bool) -> PResult<Node<'a>> {
        self.enter()?;
        let result = self.parse_statement_inner(declaration, top_level);
        self.leave();
        result
    }

    fn parse_statement_inner(&mut self, declaration: bool, top_level: bool) -> PResult<Node<'a>> {
        if self.matches(TokenType::At) {
            self.parse_decorators(true)?;
        }

        let start = self.start_node();
        match self.cur() {
            TokenType::Break | TokenType::Continue => return self.parse_break_continue(start),
            TokenType::Debugger => {
                self.next()?;
                self.semicolon()?;
                return Ok(self.finish_node(start, NodeKind::DebuggerStatement));
            }
            TokenType::Do => return self.parse_do_statement(start),
            TokenType::For => return self.parse_for_statement(start),
            TokenType::Function => {
                if !declaration {
                    return self.unexpected();
                }
                self.next()?;
                return self.parse_function(start, true, false, false);
            }
            TokenType::Class => {
                if !declaration {
                    return self.unexpected();
                }
                return self.parse_class(start, true, false);
            }
            TokenType::If => return self.parse_if_statement(start),
            TokenType::Return => return self.parse_return_statement(start),
            TokenType::Switch => return self.parse_switch_statement(start),
            TokenType::Throw => return self.parse_throw_statement(start),
            TokenType::Try => return self.parse_try_statement(start),
            TokenType::Let | TokenType::Const | TokenType::Var => {
                let kind = match self.cur() {
                    TokenType::Let => VarKind::Let,
                    TokenType::Const => VarKind::Const,
                    _ => VarKind::Var,
                };
                if kind != VarKind::Var && !declaration {
                    return self.unexpected();
                }
                return self.parse_var_statement(start, kind);
            }
            TokenType::While => return self.parse_while_statement(start),
            TokenType::With => return self.parse_with_statement(start),
            TokenType::BraceL => return self.parse_block(false),
            TokenType::Semi => {
                self.next()?;
                return Ok(self.finish_node(start, NodeKind::EmptyStatement));
            }
            TokenType::Export | TokenType::Import => {
                if !self.options.allow_import_export_everywhere {
                    if !top_level {
                        return Err(self.raise(start.pos, &messages::IMPORT_EXPORT_TOP_LEVEL, &[]));
                    }
                    if !self.in_module() {
                        return Err(self.raise(start.pos, &messages::IMPORT_EXPORT_MODULE, &[]));
                    }
                }
                return if self.matches(TokenType::Import) {
                    self.parse_import(start)
                } else {
                    self.parse_export(start)
                };
            }
            _ => {}
        }

        if self.is_async_function()? {
            self.next()?;
            self.next()?;
            return self.parse_function(start, true, true, false);
        }

        let maybe_label = self.matches(TokenType::Name);
        let expr = self.parse_expression(false)?;
        if maybe_label && !expr.is_parenthesized() {
            if let Some(name) = expr.identifier_name() {
                if self.eat(TokenType::Colon)? {
                    return self.parse_labeled_statement(start, name, expr);
                }
            }
        }
        self.parse_expression_statement(start, expr)
    }

    /// Whether the current `async` starts an async function: `function`
    /// must follow on the same line.
    pub(crate) fn is_async_function(&mut self) -> PResult<bool> {
        if !self.is_contextual("async") {
            return Ok(false);
        }
        let ahead = self.lookahead()?;
        Ok(ahead.token_type == TokenType::Function && !self.lexer.has_line_break(self.lexer.state.end, ahead.start))
    }

    /// A statement consisting of an expression.
    pub fn base_parse_expression_statement(&mut self, start: NodeStart, expr: Node<'a>) -> PResult<Node<'a>> {
        self.semicolon()?;
        Ok(self.finish_node(
            start,
            NodeKind::ExpressionStatement {
                expression: self.alloc(expr),
            },
        ))
    }

    fn parse_paren_expression(&mut self) -> PResult<Node<'a>> {
        self.expect(TokenType::ParenL)?;
        let expr = self.parse_expression(false)?;
        self.expect(TokenType::ParenR)?;
        Ok(expr)
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn parse_break_continue(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        let is_break = self.matches(TokenType::Break);
        self.next()?;

        let label = if self.is_line_terminator()? {
            None
        } else if self.matches(TokenType::Name) {
            let label = self.parse_identifier(false)?;
            self.semicolon()?;
            Some(label)
        } else {
            return self.unexpected();
        };

        let name = label.as_ref().and_then(Node::identifier_name);
        let valid = self.state.labels.iter().any(|lab| {
            if name.is_some() && lab.name != name {
                return false;
            }
            (lab.kind != LabelKind::Plain && (is_break || lab.kind == LabelKind::Loop)) || (name.is_some() && is_break)
        });
        if !valid {
            let keyword = if is_break { "break" } else { "continue" };
            return Err(self.raise(start.pos, &messages::UNSYNTACTIC_JUMP, &[keyword]));
        }

        let label = label.map(|label| self.alloc(label));
        Ok(self.finish_node(
            start,
            if is_break {
                NodeKind::BreakStatement { label }
            } else {
                NodeKind::ContinueStatement { label }
            },
        ))
    }

    fn push_loop_label(&mut self, start: NodeStart) {
        self.state.labels.push(Label {
            name: None,
            kind: LabelKind::Loop,
            statement_start: start.pos,
        });
    }

    fn parse_do_statement(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;
        self.push_loop_label(start);
        let body = self.parse_statement(false, false)?;
        self.state.labels.pop();
        self.expect(TokenType::While)?;
        let test = self.parse_paren_expression()?;
        self.eat(TokenType::Semi)?;
        Ok(self.finish_node(
            start,
            NodeKind::DoWhileStatement {
                body: self.alloc(body),
                test: self.alloc(test),
            },
        ))
    }

    /// `for`, `for-in`, `for-of` and `for await`. The init clause is parsed
    /// with `in` disallowed and reinterpreted as the left-hand side when
    /// `in` or `of` follows.
    fn parse_for_statement(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;
        self.push_loop_label(start);

        let mut for_await = false;
        if self.state.in_async && self.is_contextual("await") {
            self.expect_plugin("asyncGenerators", None)?;
            for_await = true;
            self.next()?;
        }
        self.expect(TokenType::ParenL)?;

        if self.matches(TokenType::Semi) {
            if for_await {
                return self.unexpected();
            }
            return self.parse_for(start, None);
        }

        if matches!(self.cur(), TokenType::Var | TokenType::Let | TokenType::Const) {
            let init_start = self.start_node();
            let kind = match self.cur() {
                TokenType::Let => VarKind::Let,
                TokenType::Const => VarKind::Const,
                _ => VarKind::Var,
            };
            self.next()?;
            let declarations = self.parse_var(true, kind)?;
            let single_binding = declarations.len() == 1
                && matches!(declarations[0].kind, NodeKind::VariableDeclarator { init: None, .. });
            let init = self.finish_node(
                init_start,
                NodeKind::VariableDeclaration {
                    kind,
                    declarations: self.alloc_list(declarations),
                },
            );
            if single_binding && (self.matches(TokenType::In) || self.is_contextual("of")) {
                return self.parse_for_in(start, init, for_await);
            }
            if for_await {
                return self.unexpected();
            }
            return self.parse_for(start, Some(init));
        }

        let init = self.parse_expression_marked(true)?;
        if self.matches(TokenType::In) || self.is_contextual("of") {
            let target = self.to_assignable(init.node, false)?;
            let context = if self.matches(TokenType::In) {
                "for-in statement"
            } else {
                "for-of statement"
            };
            self.check_lval(&target, false, None, context)?;
            return self.parse_for_in(start, target, for_await);
        }
        let init = self.reject_marker(init)?;
        if for_await {
            return self.unexpected();
        }
        self.parse_for(start, Some(init))
    }

    fn parse_for(&mut self, start: NodeStart, init: Option<Node<'a>>) -> PResult<Node<'a>> {
        self.expect(TokenType::Semi)?;
        let test = if self.matches(TokenType::Semi) {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect(TokenType::Semi)?;
        let update = if self.matches(TokenType::ParenR) {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect(TokenType::ParenR)?;
        let body = self.parse_statement(false, false)?;
        self.state.labels.pop();
        Ok(self.finish_node(
            start,
            NodeKind::ForStatement {
                init: init.map(|node| self.alloc(node)),
                test: test.map(|node| self.alloc(node)),
                update: update.map(|node| self.alloc(node)),
                body: self.alloc(body),
            },
        ))
    }

    fn parse_for_in(&mut self, start: NodeStart, left: Node<'a>, for_await: bool) -> PResult<Node<'a>> {
        let is_in = self.matches(TokenType::In);
        if for_await && is_in {
            return self.unexpected();
        }
        self.next()?;
        let right = self.parse_expression(false)?;
        self.expect(TokenType::ParenR)?;
        let body = self.parse_statement(false, false)?;
        self.state.labels.pop();

        let left = self.alloc(left);
        let right = self.alloc(right);
        let body = self.alloc(body);
        let kind = if for_await {
            NodeKind::ForAwaitStatement { left, right, body }
        } else if is_in {
            NodeKind::ForInStatement { left, right, body }
        } else {
            NodeKind::ForOfStatement { left, right, body }
        };
        Ok(self.finish_node(start, kind))
    }

    fn parse_if_statement(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;
        let test = self.parse_paren_expression()?;
        let consequent = self.parse_statement(false, false)?;
        let alternate = if self.eat(TokenType::Else)? {
            Some(self.parse_statement(false, false)?)
        } else {
            None
        };
        Ok(self.finish_node(
            start,
            NodeKind::IfStatement {
                test: self.alloc(test),
                consequent: self.alloc(consequent),
                alternate: alternate.map(|node| self.alloc(node)),
            },
        ))
    }

    fn parse_return_statement(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        if !self.state.in_function && !self.options.allow_return_outside_function {
            return Err(self.raise(start.pos, &messages::RETURN_OUTSIDE_FUNCTION, &[]));
        }
        self.next()?;
        let argument = if self.is_line_terminator()? {
            None
        } else {
            let argument = self.parse_expression(false)?;
            self.semicolon()?;
            Some(self.alloc(argument))
        };
        Ok(self.finish_node(start, NodeKind::ReturnStatement { argument }))
    }

    fn parse_switch_statement(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;
        let discriminant = self.parse_paren_expression()?;
        self.expect(TokenType::BraceL)?;
        self.state.labels.push(Label {
            name: None,
            kind: LabelKind::Switch,
            statement_start: start.pos,
        });

        let mut cases = Vec::new();
        let mut current: Option<(NodeStart, Option<Node<'a>>, Vec<Node<'a>>)> = None;
        let mut saw_default = false;
        while !self.matches(TokenType::BraceR) {
            if matches!(self.cur(), TokenType::Case | TokenType::Default) {
                if let Some(case) = current.take() {
                    cases.push(self.finish_switch_case(case));
                }
                let case_start = self.start_node();
                let is_case = self.matches(TokenType::Case);
                self.next()?;
                let test = if is_case {
                    Some(self.parse_expression(false)?)
                } else {
                    if saw_default {
                        return Err(self.raise(self.last_tok_start(), &messages::MULTIPLE_DEFAULT_CLAUSES, &[]));
                    }
                    saw_default = true;
                    None
                };
                self.expect(TokenType::Colon)?;
                current = Some((case_start, test, Vec::new()));
            } else {
                let stmt = self.parse_statement(true, false)?;
                match current.as_mut() {
                    Some((_, _, consequent)) => consequent.push(stmt),
                    None => return self.unexpected_at(stmt.start()),
                }
            }
        }
        if let Some(case) = current.take() {
            cases.push(self.finish_switch_case(case));
        }
        self.next()?;
        self.state.labels.pop();

        Ok(self.finish_node(
            start,
            NodeKind::SwitchStatement {
                discriminant: self.alloc(discriminant),
                cases: self.alloc_list(cases),
            },
        ))
    }

    fn finish_switch_case(&self, (start, test, consequent): (NodeStart, Option<Node<'a>>, Vec<Node<'a>>)) -> Node<'a> {
        self.finish_node(
            start,
            NodeKind::SwitchCase {
                test: test.map(|node| self.alloc(node)),
                consequent: self.alloc_list(consequent),
            },
        )
    }

    fn parse_throw_statement(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;
        if self.has_preceding_line_break() {
            return Err(self.raise(self.last_tok_end(), &messages::ILLEGAL_NEWLINE_AFTER_THROW, &[]));
        }
        let argument = self.parse_expression(false)?;
        self.semicolon()?;
        Ok(self.finish_node(
            start,
            NodeKind::ThrowStatement {
                argument: self.alloc(argument),
            },
        ))
    }

    fn parse_try_statement(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;
        let block = self.parse_block(false)?;

        let handler = if self.matches(TokenType::Catch) {
            let clause_start = self.start_node();
            self.next()?;
            self.expect(TokenType::ParenL)?;
            let param = self.parse_binding_atom()?;
            self.check_lval(&param, true, None, "catch clause")?;
            self.expect(TokenType::ParenR)?;
            let body = self.parse_block(false)?;
            Some(self.finish_node(
                clause_start,
                NodeKind::CatchClause {
                    param: self.alloc(param),
                    body: self.alloc(body),
                },
            ))
        } else {
            None
        };
        let finalizer = if self.eat(TokenType::Finally)? {
            Some(self.parse_block(false)?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.raise(start.pos, &messages::MISSING_CATCH_OR_FINALLY, &[]));
        }

        Ok(self.finish_node(
            start,
            NodeKind::TryStatement {
                block: self.alloc(block),
                handler: handler.map(|node| self.alloc(node)),
                finalizer: finalizer.map(|node| self.alloc(node)),
            },
        ))
    }

    fn parse_while_statement(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;
        let test = self.parse_paren_expression()?;
        self.push_loop_label(start);
        let body = self.parse_statement(false, false)?;
        self.state.labels.pop();
        Ok(self.finish_node(
            start,
            NodeKind::WhileStatement {
                test: self.alloc(test),
                body: self.alloc(body),
            },
        ))
    }

    fn parse_with_statement(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        if self.strict() {
            return Err(self.raise(start.pos, &messages::WITH_IN_STRICT, &[]));
        }
        self.next()?;
        let object = self.parse_paren_expression()?;
        let body = self.parse_statement(false, false)?;
        Ok(self.finish_node(
            start,
            NodeKind::WithStatement {
                object: self.alloc(object),
                body: self.alloc(body),
            },
        ))
    }

    /// `name: body`, with the colon already consumed. Labels directly
    /// wrapping the same statement take on its kind so that `continue` can
    /// target them.
    fn parse_labeled_statement(&mut self, start: NodeStart, name: &'a str, label: Node<'a>) -> PResult<Node<'a>> {
        if self.state.labels.iter().any(|lab| lab.name == Some(name)) {
            return Err(self.raise(label.start(), &messages::LABEL_ALREADY_DECLARED, &[name]));
        }
        let kind = if self.cur().is_loop() {
            LabelKind::Loop
        } else if self.matches(TokenType::Switch) {
            LabelKind::Switch
        } else {
            LabelKind::Plain
        };
        let body_start = self.start_pos();
        for lab in self.state.labels.iter_mut().rev() {
            if lab.statement_start != start.pos {
                break;
            }
            lab.statement_start = body_start;
            lab.kind = kind;
        }
        self.state.labels.push(Label {
            name: Some(name),
            kind,
            statement_start: body_start,
        });
        let body = self.parse_statement(true, false)?;
        self.state.labels.pop();
        Ok(self.finish_node(
            start,
            NodeKind::LabeledStatement {
                label: self.alloc(label),
                body: self.alloc(body),
            },
        ))
    }

    // ========================================================================
    // Variables
    // ========================================================================

    fn parse_var_statement(&mut self, start: NodeStart, kind: VarKind) -> PResult<Node<'a>> {
        self.next()?;
        let declarations = self.parse_var(false, kind)?;
        self.semicolon()?;
        Ok(self.finish_node(
            start,
            NodeKind::VariableDeclaration {
                kind,
                declarations: self.alloc_list(declarations),
            },
        ))
    }

    /// Declarators after `var`, `let` or `const`. In a `for` head a
    /// declarator followed by `in` or `of` may omit its initialiser.
    fn parse_var(&mut self, is_for: bool, kind: VarKind) -> PResult<Vec<Node<'a>>> {
        let mut declarations = Vec::new();
        loop {
            let decl_start = self.start_node();
            let id = self.parse_binding_atom()?;
            let id = self.parse_binding_annotation(id, false)?;
            self.check_lval(&id, true, None, "variable declaration")?;

            let for_in_of = self.matches(TokenType::In) || self.is_contextual("of");
            let init = if self.eat(TokenType::Eq)? {
                let init = self.parse_maybe_assign(is_for)?;
                Some(self.alloc(init))
            } else if kind == VarKind::Const && !for_in_of {
                return self.unexpected();
            } else if !matches!(id.kind, NodeKind::Identifier { .. }) && !(is_for && for_in_of) {
                return Err(self.raise(self.last_tok_end(), &messages::COMPLEX_BINDING_NEEDS_INIT, &[]));
            } else {
                None
            };

            declarations.push(self.finish_node(
                decl_start,
                NodeKind::VariableDeclarator {
                    id: self.alloc(id),
                    init,
                },
            ));
            if !self.eat(TokenType::Comma)? {
                return Ok(declarations);
            }
        }
    }

    // ========================================================================
    // Decorators
    // ========================================================================

    /// Decorators before a class declaration or an `export`.
    pub fn parse_decorators(&mut self, allow_export: bool) -> PResult<()> {
        while self.matches(TokenType::At) {
            let decorator = self.parse_decorator()?;
            self.state.decorators.push(decorator);
        }
        if (allow_export && self.matches(TokenType::Export)) || self.matches(TokenType::Class) {
            return Ok(());
        }
        Err(self.raise(self.start_pos(), &messages::LEADING_DECORATORS, &[]))
    }

    pub fn parse_decorator(&mut self) -> PResult<Node<'a>> {
        self.expect_plugin("decorators", None)?;
        let start = self.start_node();
        self.next()?;
        let expression = self.parse_maybe_assign(false)?;
        Ok(self.finish_node(
            start,
            NodeKind::Decorator {
                expression: self.alloc(expression),
            },
        ))
    }

    fn take_decorators(&mut self) -> NodeList<'a> {
        let decorators = std::mem::take(&mut self.state.decorators);
        self.alloc_list(decorators)
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// A class after its decorators, starting at `class`. Pending
    /// decorators are attached to it.
    pub fn parse_class(&mut self, start: NodeStart, is_statement: bool, optional_id: bool) -> PResult<Node<'a>> {
        self.next()?;
        let decorators = self.take_decorators();

        let id = if self.matches(TokenType::Name) {
            let id = self.parse_identifier(false)?;
            Some(self.alloc(id))
        } else if optional_id || !is_statement {
            None
        } else {
            return self.unexpected();
        };
        let type_parameters = self.parse_type_parameters()?;

        let (super_class, super_type_parameters) = if self.eat(TokenType::Extends)? {
            let heritage = self.parse_expr_subscripts(false)?;
            let heritage = self.reject_marker(heritage)?;
            (Some(self.alloc(heritage)), self.parse_super_type_arguments()?)
        } else {
            (None, None)
        };
        let implements = self.parse_implements()?;
        let body = self.parse_class_body()?;

        let class = Class {
            id,
            super_class,
            body: self.alloc(body),
            decorators,
            type_parameters,
            super_type_parameters,
            implements,
        };
        Ok(self.finish_node(
            start,
            if is_statement {
                NodeKind::ClassDeclaration(class)
            } else {
                NodeKind::ClassExpression(class)
            },
        ))
    }

    /// Whether the class member whose key was just parsed is a property.
    pub fn base_is_class_property(&self) -> bool {
        matches!(self.cur(), TokenType::Eq | TokenType::Semi | TokenType::BraceR)
    }

    fn is_class_method(&self) -> bool {
        self.matches(TokenType::ParenL) || self.is_relational("<")
    }

    /// The class body. Class code is always strict.
    fn parse_class_body(&mut self) -> PResult<Node<'a>> {
        let old_strict = self.lexer.state.strict;
        self.lexer.state.strict = true;

        let start = self.start_node();
        self.expect(TokenType::BraceL)?;
        let mut members = Vec::new();
        let mut decorators = Vec::new();
        let mut had_constructor = false;
        let mut had_constructor_call = false;

        while !self.eat(TokenType::BraceR)? {
            if self.eat(TokenType::Semi)? {
                continue;
            }
            if self.matches(TokenType::At) {
                decorators.push(self.parse_decorator()?);
                continue;
            }

            let member_start = self.start_node();
            let member_decorators = self.alloc_list(std::mem::take(&mut decorators));
            let mut is_static = false;

            if self.is_contextual("static") {
                let key = self.parse_identifier(true)?;
                if self.is_class_method() {
                    let member =
                        self.parse_class_method(member_start, MethodKind::Method, key, false, false, member_decorators, false, false)?;
                    members.push(member);
                    continue;
                }
                if self.is_class_property() {
                    members.push(self.parse_class_property(member_start, key, false, false, member_decorators)?);
                    continue;
                }
                is_static = true;
            }

            if self.eat(TokenType::Star)? {
                let (key, computed) = self.parse_property_name()?;
                if is_constructor_key(&key, computed, is_static) {
                    return Err(self.raise(key.start(), &messages::CONSTRUCTOR_GENERATOR, &[]));
                }
                self.check_static_prototype(&key, computed, is_static)?;
                let member = self.parse_class_method(
                    member_start,
                    MethodKind::Method,
                    key,
                    computed,
                    is_static,
                    member_decorators,
                    true,
                    false,
                )?;
                members.push(member);
                continue;
            }

            let is_simple = self.matches(TokenType::Name);
            let (key, computed) = self.parse_property_name()?;
            self.check_static_prototype(&key, computed, is_static)?;

            if self.is_class_property() {
                members.push(self.parse_class_property(member_start, key, computed, is_static, member_decorators)?);
                continue;
            }

            if self.is_class_method() {
                let mut kind = MethodKind::Method;
                if is_constructor_key(&key, computed, is_static) {
                    if had_constructor {
                        return Err(self.raise(key.start(), &messages::DUPLICATE_CONSTRUCTOR, &[]));
                    }
                    if !member_decorators.is_empty() {
                        return Err(self.raise(member_start.pos, &messages::DECORATOR_ON_CONSTRUCTOR, &[]));
                    }
                    had_constructor = true;
                    kind = MethodKind::Constructor;
                }
                let member =
                    self.parse_class_method(member_start, kind, key, computed, is_static, member_decorators, false, false)?;
                members.push(member);
                continue;
            }

            let simple_name = if is_simple && !computed {
                key.identifier_name()
            } else {
                None
            };

            if simple_name == Some("async") && !self.can_insert_semicolon() {
                let generator = self.has_plugin("asyncGenerators") && self.eat(TokenType::Star)?;
                let (key, computed) = self.parse_property_name()?;
                if is_constructor_key(&key, computed, is_static) {
                    return Err(self.raise(key.start(), &messages::CONSTRUCTOR_ASYNC, &[]));
                }
                let member = self.parse_class_method(
                    member_start,
                    MethodKind::Method,
                    key,
                    computed,
                    is_static,
                    member_decorators,
                    generator,
                    true,
                )?;
                members.push(member);
            } else if matches!(simple_name, Some("get" | "set")) && !self.can_insert_semicolon() {
                let kind = if simple_name == Some("get") {
                    MethodKind::Get
                } else {
                    MethodKind::Set
                };
                let (key, computed) = self.parse_property_name()?;
                if is_constructor_key(&key, computed, is_static) {
                    return Err(self.raise(key.start(), &messages::CONSTRUCTOR_ACCESSOR, &[]));
                }
                self.check_static_prototype(&key, computed, is_static)?;
                let member =
                    self.parse_class_method(member_start, kind, key, computed, is_static, member_decorators, false, false)?;
                if let NodeKind::ClassMethod(method) = &member.kind {
                    self.check_accessor_params(kind, method.function.params.len(), member.start())?;
                }
                members.push(member);
            } else if simple_name == Some("call")
                && self.has_plugin("classConstructorCall")
                && self.is_contextual("constructor")
            {
                if had_constructor_call {
                    return Err(self.raise(key.start(), &messages::DUPLICATE_CONSTRUCTOR_CALL, &[]));
                }
                if !member_decorators.is_empty() {
                    return Err(self.raise(member_start.pos, &messages::DECORATOR_ON_CONSTRUCTOR, &[]));
                }
                had_constructor_call = true;
                let (key, computed) = self.parse_property_name()?;
                let member = self.parse_class_method(
                    member_start,
                    MethodKind::ConstructorCall,
                    key,
                    computed,
                    is_static,
                    member_decorators,
                    false,
                    false,
                )?;
                members.push(member);
            } else if self.can_insert_semicolon() {
                members.push(self.parse_class_property(member_start, key, computed, is_static, member_decorators)?);
            } else {
                return self.unexpected();
            }
        }

        if !decorators.is_empty() {
            return Err(self.raise(self.start_pos(), &messages::TRAILING_DECORATORS, &[]));
        }
        let body = self.finish_node(
            start,
            NodeKind::ClassBody {
                body: self.alloc_list(members),
            },
        );
        self.lexer.state.strict = old_strict;
        Ok(body)
    }

    fn check_static_prototype(&self, key: &Node<'a>, computed: bool, is_static: bool) -> PResult<()> {
        if is_static && !computed && static_key_name(key) == Some("prototype") {
            return Err(self.raise(key.start(), &messages::STATIC_PROTOTYPE, &[]));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_class_method(
        &mut self,
        start: NodeStart,
        kind: MethodKind,
        key: Node<'a>,
        computed: bool,
        is_static: bool,
        decorators: NodeList<'a>,
        generator: bool,
        is_async: bool,
    ) -> PResult<Node<'a>> {
        let type_parameters = self.parse_type_parameters()?;
        let function: Function<'a> = self.parse_method(kind, generator, is_async, type_parameters)?;
        Ok(self.finish_node(
            start,
            NodeKind::ClassMethod(Method {
                kind,
                key: self.alloc(key),
                computed,
                is_static,
                decorators,
                function,
            }),
        ))
    }

    /// A class property. Only properties with an initialiser need the
    /// `classProperties` extension.
    fn parse_class_property(
        &mut self,
        start: NodeStart,
        key: Node<'a>,
        computed: bool,
        is_static: bool,
        decorators: NodeList<'a>,
    ) -> PResult<Node<'a>> {
        let type_annotation = self.parse_return_type()?;
        let value = if self.matches(TokenType::Eq) {
            self.expect_plugin("classProperties", None)?;
            self.next()?;
            let old = std::mem::replace(&mut self.state.in_class_property, true);
            let value = self.parse_maybe_assign(false)?;
            self.state.in_class_property = old;
            Some(self.alloc(value))
        } else {
            None
        };
        self.semicolon()?;
        Ok(self.finish_node(
            start,
            NodeKind::ClassProperty {
                key: self.alloc(key),
                value,
                computed,
                is_static,
                decorators,
                type_annotation,
            },
        ))
    }

    // ========================================================================
    // Imports
    // ========================================================================

    fn parse_import(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;
        let mut specifiers = Vec::new();
        let mut import_kind = ImportKind::Value;
        if !self.matches(TokenType::String) {
            import_kind = self.parse_import_kind()?;
            self.parse_import_specifiers(&mut specifiers)?;
            self.expect_contextual("from")?;
        }
        let source = self.parse_module_source()?;
        self.semicolon()?;
        Ok(self.finish_node(
            start,
            NodeKind::ImportDeclaration {
                specifiers: self.alloc_list(specifiers),
                source: self.alloc(source),
                import_kind,
            },
        ))
    }

    fn parse_module_source(&mut self) -> PResult<Node<'a>> {
        if !self.matches(TokenType::String) {
            return self.unexpected();
        }
        self.parse_literal()
    }

    fn parse_import_specifiers(&mut self, specifiers: &mut Vec<Node<'a>>) -> PResult<()> {
        if self.matches(TokenType::Name) {
            let start = self.start_node();
            let local = self.parse_identifier(false)?;
            self.check_lval(&local, true, None, "default import specifier")?;
            specifiers.push(self.finish_node(
                start,
                NodeKind::ImportDefaultSpecifier {
                    local: self.alloc(local),
                },
            ));
            if !self.eat(TokenType::Comma)? {
                return Ok(());
            }
        }

        if self.matches(TokenType::Star) {
            let start = self.start_node();
            self.next()?;
            self.expect_contextual("as")?;
            let local = self.parse_identifier(false)?;
            self.check_lval(&local, true, None, "import namespace specifier")?;
            specifiers.push(self.finish_node(
                start,
                NodeKind::ImportNamespaceSpecifier {
                    local: self.alloc(local),
                },
            ));
            return Ok(());
        }

        self.expect(TokenType::BraceL)?;
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
            let start = self.start_node();
            let imported = self.parse_identifier(true)?;
            let local = if self.eat_contextual("as")? {
                self.parse_identifier(false)?
            } else {
                self.check_keyword_name(&imported)?;
                imported.clone()
            };
            self.check_lval(&local, true, None, "import specifier")?;
            specifiers.push(self.finish_node(
                start,
                NodeKind::ImportSpecifier {
                    imported: self.alloc(imported),
                    local: self.alloc(local),
                },
            ));
        }
        Ok(())
    }

    /// Reject a keyword used where a local binding or reference is needed.
    fn check_keyword_name(&self, id: &Node<'a>) -> PResult<()> {
        match id.identifier_name() {
            Some(name) if TokenType::from_keyword(name).is_some() => {
                Err(self.raise(id.start(), &messages::UNEXPECTED_KEYWORD, &[name]))
            }
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Exports
    // ========================================================================

    fn parse_export(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.next()?;

        if self.matches(TokenType::Star) {
            let specifier_start = self.start_node();
            self.next()?;
            if !(self.has_plugin("exportExtensions") && self.eat_contextual("as")?) {
                self.expect_contextual("from")?;
                let source = self.parse_module_source()?;
                self.semicolon()?;
                self.check_pending_decorators(start, None)?;
                return Ok(self.finish_node(
                    start,
                    NodeKind::ExportAllDeclaration {
                        source: self.alloc(source),
                    },
                ));
            }
            let exported = self.parse_identifier(true)?;
            let mut specifiers = vec![self.finish_node(
                specifier_start,
                NodeKind::ExportNamespaceSpecifier {
                    exported: self.alloc(exported),
                },
            )];
            if self.eat(TokenType::Comma)? {
                specifiers.extend(self.parse_export_specifiers()?);
            }
            return self.finish_export_from(start, specifiers, ImportKind::Value);
        }

        if self.has_plugin("exportExtensions") && self.is_export_default_specifier()? {
            let specifier_start = self.start_node();
            let exported = self.parse_identifier(true)?;
            let mut specifiers = vec![self.finish_node(
                specifier_start,
                NodeKind::ExportDefaultSpecifier {
                    exported: self.alloc(exported),
                },
            )];
            if self.matches(TokenType::Comma) && self.lookahead()?.token_type == TokenType::Star {
                self.next()?;
                let namespace_start = self.start_node();
                self.expect(TokenType::Star)?;
                self.expect_contextual("as")?;
                let exported = self.parse_identifier(true)?;
                specifiers.push(self.finish_node(
                    namespace_start,
                    NodeKind::ExportNamespaceSpecifier {
                        exported: self.alloc(exported),
                    },
                ));
            } else if self.eat(TokenType::Comma)? {
                specifiers.extend(self.parse_export_specifiers()?);
            }
            return self.finish_export_from(start, specifiers, ImportKind::Value);
        }

        if self.matches(TokenType::Default) {
            let default_start = self.start_node();
            self.next()?;
            let decl_start = self.start_node();
            let declaration = if self.matches(TokenType::Function) {
                self.next()?;
                self.parse_function(decl_start, true, false, true)?
            } else if self.is_async_function()? {
                self.next()?;
                self.next()?;
                self.parse_function(decl_start, true, true, true)?
            } else if self.matches(TokenType::Class) {
                self.parse_class(decl_start, true, true)?
            } else {
                let expr = self.parse_maybe_assign(false)?;
                self.semicolon()?;
                expr
            };
            if !self.exported.insert("default") {
                return Err(self.raise(default_start.pos, &messages::DUPLICATE_DEFAULT_EXPORT, &[]));
            }
            self.check_pending_decorators(start, Some(&declaration))?;
            return Ok(self.finish_node(
                start,
                NodeKind::ExportDefaultDeclaration {
                    declaration: self.alloc(declaration),
                },
            ));
        }

        let declaration = match self.parse_export_declaration()? {
            Some(declaration) => Some(declaration),
            None if self.should_parse_export_declaration() => Some(self.parse_statement(true, false)?),
            None => None,
        };
        if let Some(declaration) = declaration {
            self.check_declaration_exports(&declaration)?;
            self.check_pending_decorators(start, Some(&declaration))?;
            let export_kind = match declaration.kind {
                NodeKind::TypeAlias { .. } | NodeKind::InterfaceDeclaration { .. } => ImportKind::Type,
                _ => ImportKind::Value,
            };
            return Ok(self.finish_node(
                start,
                NodeKind::ExportNamedDeclaration {
                    declaration: Some(self.alloc(declaration)),
                    specifiers: &[],
                    source: None,
                    export_kind,
                },
            ));
        }

        let export_kind = self.parse_import_kind()?;
        let specifiers = self.parse_export_specifiers()?;
        if self.is_contextual("from") {
            return self.finish_export_from(start, specifiers, export_kind);
        }
        for specifier in &specifiers {
            if let NodeKind::ExportSpecifier { local, .. } = specifier.kind {
                self.check_keyword_name(local)?;
            }
        }
        self.semicolon()?;
        self.finish_named_export(start, specifiers, None, export_kind)
    }

    /// `from "source";` after an export specifier list.
    fn finish_export_from(&mut self, start: NodeStart, specifiers: Vec<Node<'a>>, kind: ImportKind) -> PResult<Node<'a>> {
        self.expect_contextual("from")?;
        let source = self.parse_module_source()?;
        self.semicolon()?;
        self.finish_named_export(start, specifiers, Some(source), kind)
    }

    fn finish_named_export(
        &mut self,
        start: NodeStart,
        specifiers: Vec<Node<'a>>,
        source: Option<Node<'a>>,
        export_kind: ImportKind,
    ) -> PResult<Node<'a>> {
        for specifier in &specifiers {
            let exported = match specifier.kind {
                NodeKind::ExportSpecifier { exported, .. }
                | NodeKind::ExportDefaultSpecifier { exported }
                | NodeKind::ExportNamespaceSpecifier { exported } => exported,
                _ => continue,
            };
            if let Some(name) = exported.identifier_name() {
                self.check_duplicate_export(specifier.start(), name)?;
            }
        }
        self.check_pending_decorators(start, None)?;
        Ok(self.finish_node(
            start,
            NodeKind::ExportNamedDeclaration {
                declaration: None,
                specifiers: self.alloc_list(specifiers),
                source: source.map(|node| self.alloc(node)),
                export_kind,
            },
        ))
    }

    fn parse_export_specifiers(&mut self) -> PResult<Vec<Node<'a>>> {
        self.expect(TokenType::BraceL)?;
        let mut specifiers = Vec::new();
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
            let start = self.start_node();
            let local = self.parse_identifier(true)?;
            let exported = if self.eat_contextual("as")? {
                self.parse_identifier(true)?
            } else {
                local.clone()
            };
            specifiers.push(self.finish_node(
                start,
                NodeKind::ExportSpecifier {
                    local: self.alloc(local),
                    exported: self.alloc(exported),
                },
            ));
        }
        Ok(specifiers)
    }

    fn is_export_default_specifier(&mut self) -> PResult<bool> {
        if self.matches(TokenType::Name) {
            return Ok(!matches!(self.text(), "type" | "async" | "interface"));
        }
        if !self.matches(TokenType::Default) {
            return Ok(false);
        }
        let ahead = self.lookahead()?;
        Ok(ahead.token_type == TokenType::Comma
            || (ahead.token_type == TokenType::Name && ahead.value.as_str() == "from"))
    }

    fn should_parse_export_declaration(&self) -> bool {
        matches!(
            self.cur(),
            TokenType::Var | TokenType::Let | TokenType::Const | TokenType::Function | TokenType::Class | TokenType::At
        ) || self.is_contextual("async")
    }

    /// Record the names bound by an exported declaration.
    fn check_declaration_exports(&mut self, declaration: &Node<'a>) -> PResult<()> {
        match &declaration.kind {
            NodeKind::FunctionDeclaration(Function { id: Some(id), .. })
            | NodeKind::ClassDeclaration(Class { id: Some(id), .. }) => {
                if let Some(name) = id.identifier_name() {
                    self.check_duplicate_export(declaration.start(), name)?;
                }
                Ok(())
            }
            NodeKind::VariableDeclaration { declarations, .. } => {
                for declarator in declarations.iter() {
                    if let NodeKind::VariableDeclarator { id, .. } = declarator.kind {
                        self.check_pattern_exports(id)?;
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn check_pattern_exports(&mut self, pattern: &Node<'a>) -> PResult<()> {
        match pattern.kind {
            NodeKind::Identifier { name, .. } => self.check_duplicate_export(pattern.start(), name),
            NodeKind::ObjectPattern { properties, .. } => {
                for prop in properties {
                    let target = match prop.kind {
                        NodeKind::ObjectProperty { value, .. } => value,
                        _ => prop,
                    };
                    self.check_pattern_exports(target)?;
                }
                Ok(())
            }
            NodeKind::ArrayPattern { elements, .. } => {
                for element in elements.iter().flatten() {
                    self.check_pattern_exports(element)?;
                }
                Ok(())
            }
            NodeKind::AssignmentPattern { left, .. } => self.check_pattern_exports(left),
            NodeKind::RestElement { argument, .. } | NodeKind::RestProperty { argument } => {
                self.check_pattern_exports(argument)
            }
            _ => Ok(()),
        }
    }

    fn check_duplicate_export(&mut self, pos: u32, name: &'a str) -> PResult<()> {
        if self.exported.insert(name) {
            return Ok(());
        }
        if name == "default" {
            return Err(self.raise(pos, &messages::DUPLICATE_DEFAULT_EXPORT, &[]));
        }
        Err(self.raise(pos, &messages::DUPLICATE_EXPORT, &[name]))
    }

    /// Decorators before `export` must end up on an exported class.
    fn check_pending_decorators(&mut self, start: NodeStart, declaration: Option<&Node<'a>>) -> PResult<()> {
        if self.state.decorators.is_empty() {
            return Ok(());
        }
        let is_class = matches!(
            declaration.map(|node| &node.kind),
            Some(NodeKind::ClassDeclaration(_) | NodeKind::ClassExpression(_))
        );
        if !is_class {
            return Err(self.raise(start.pos, &messages::DECORATORS_ON_EXPORT, &[]));
        }
        self.state.decorators.clear();
        Ok(())
    }
}

/// Whether a method key names the constructor of a class.
fn is_constructor_key(key: &Node<'_>, computed: bool, is_static: bool) -> bool {
    !computed && !is_static && static_key_name(key) == Some("constructor")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParserOptions;
    use bumpalo::Bump;

    fn statements<'a>(arena: &'a Bump, source: &'a str, options: &ParserOptions) -> PResult<NodeList<'a>> {
        let file = Parser::new(arena, source, options).parse()?;
        Ok(file.body())
    }

    #[test]
    fn test_directive_value_excludes_quotes() {
        let arena = Bump::new();
        let file = Parser::new(&arena, "'use strict'; a", &ParserOptions::default()).parse().unwrap();
        let NodeKind::Program { directives, body, .. } = file.program.kind else {
            panic!("expected program");
        };
        assert_eq!(directives.len(), 1);
        assert_eq!(body.len(), 1);
        let NodeKind::Directive { value } = directives[0].kind else {
            panic!("expected directive");
        };
        assert!(matches!(
            value.kind,
            NodeKind::DirectiveLiteral {
                value: "use strict",
                raw: "'use strict'"
            }
        ));
    }

    #[test]
    fn test_parenthesized_string_is_not_a_directive() {
        let arena = Bump::new();
        let file = Parser::new(&arena, "('use strict'); with (a) b;", &ParserOptions::default())
            .parse()
            .unwrap();
        assert_eq!(file.body().len(), 2);
    }

    #[test]
    fn test_continue_needs_a_loop() {
        let arena = Bump::new();
        let options = ParserOptions::default();
        let err = statements(&arena, "a: { continue a; }", &options).unwrap_err();
        assert_eq!(err.message, "Unsyntactic continue");
        assert!(statements(&arena, "a: while (x) { continue a; }", &options).is_ok());
        assert!(statements(&arena, "a: { break a; }", &options).is_ok());
    }

    #[test]
    fn test_nested_labels_share_loop_kind() {
        let arena = Bump::new();
        let options = ParserOptions::default();
        assert!(statements(&arena, "a: b: for (;;) { continue a; }", &options).is_ok());
        let err = statements(&arena, "a: a: x;", &options).unwrap_err();
        assert_eq!(err.message, "Label 'a' is already declared");
    }

    #[test]
    fn test_switch_cases() {
        let arena = Bump::new();
        let options = ParserOptions::default();
        let body = statements(&arena, "switch (x) { case 1: a; b; default: c }", &options).unwrap();
        let NodeKind::SwitchStatement { cases, .. } = body[0].kind else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 2);
        let err = statements(&arena, "switch (x) { default: default: }", &options).unwrap_err();
        assert_eq!(err.message, "Multiple default clauses");
    }

    #[test]
    fn test_export_names_must_be_unique() {
        let arena = Bump::new();
        let options = ParserOptions::module();
        let err = statements(&arena, "export var a; export { b as a };", &options).unwrap_err();
        assert_eq!(
            err.message,
            "`a` has already been exported. Exported identifiers must be unique."
        );
        let err = statements(&arena, "export default 1; export default 2;", &options).unwrap_err();
        assert_eq!(err.message, "Only one default export allowed per module.");
    }

    #[test]
    fn test_export_keyword_without_source() {
        let arena = Bump::new();
        let options = ParserOptions::module();
        let err = statements(&arena, "export { if };", &options).unwrap_err();
        assert_eq!(err.message, "Unexpected keyword 'if'");
        assert!(statements(&arena, "export { if } from 'x';", &options).is_ok());
    }

    #[test]
    fn test_class_constructor_rules() {
        let arena = Bump::new();
        let options = ParserOptions::default();
        let err = statements(&arena, "class A { constructor() {} constructor() {} }", &options).unwrap_err();
        assert_eq!(err.message, "Duplicate constructor in the same class");
        let err = statements(&arena, "class A { get constructor() {} }", &options).unwrap_err();
        assert_eq!(err.message, "Constructor can't have get/set modifier");
        let err = statements(&arena, "class A { static prototype() {} }", &options).unwrap_err();
        assert_eq!(err.message, "Classes may not have static property named prototype");
        assert!(statements(&arena, "class A { static constructor() {} constructor() {} }", &options).is_ok());
    }
}
