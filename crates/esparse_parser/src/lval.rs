//! Patterns and assignment targets.
//!
//! Object and array literals are parsed as expressions first and converted
//! here once the surrounding syntax shows they are patterns. `check_lval`
//! then validates the names a pattern binds or assigns.

use esparse_ast::token_type::{is_strict_bind_reserved_word, is_strict_reserved_word};
use esparse_ast::{MethodKind, Node, NodeKind, TokenType};
use esparse_core::collections::NameSet;
use esparse_diagnostics::messages;

use crate::parser::{Marked, NodeStart, PResult, Parser};

impl<'a> Parser<'a> {
    // ========================================================================
    // Conversion
    // ========================================================================

    /// Convert an expression into the pattern it denotes.
    pub fn to_assignable(&self, node: Node<'a>, is_binding: bool) -> PResult<Node<'a>> {
        match node.kind {
            NodeKind::Identifier { .. }
            | NodeKind::ObjectPattern { .. }
            | NodeKind::ArrayPattern { .. }
            | NodeKind::AssignmentPattern { .. }
            | NodeKind::RestElement { .. }
            | NodeKind::RestProperty { .. } => Ok(node),

            NodeKind::ObjectExpression { properties } => {
                let mut converted = Vec::with_capacity(properties.len());
                for prop in properties {
                    if let NodeKind::ObjectMethod(method) = &prop.kind {
                        let message = match method.kind {
                            MethodKind::Get | MethodKind::Set => &messages::OBJECT_PATTERN_ACCESSOR,
                            _ => &messages::OBJECT_PATTERN_METHOD,
                        };
                        return Err(self.raise(method.key.start(), message, &[]));
                    }
                    converted.push(self.to_assignable(prop.clone(), is_binding)?);
                }
                let kind = NodeKind::ObjectPattern {
                    properties: self.alloc_list(converted),
                    type_annotation: None,
                };
                Ok(self.rewrap(&node, kind))
            }

            NodeKind::ObjectProperty {
                key,
                value,
                computed,
                shorthand,
                decorators,
            } => {
                let value = self.to_assignable(value.clone(), is_binding)?;
                let kind = NodeKind::ObjectProperty {
                    key,
                    value: self.alloc(value),
                    computed,
                    shorthand,
                    decorators,
                };
                Ok(self.rewrap(&node, kind))
            }

            NodeKind::SpreadProperty { argument } => Ok(self.rewrap(&node, NodeKind::RestProperty { argument })),

            NodeKind::ArrayExpression { elements } => {
                let elements = self.to_assignable_list(elements.to_vec(), is_binding)?;
                let kind = NodeKind::ArrayPattern {
                    elements: self.arena().alloc_slice_fill_iter(elements),
                    type_annotation: None,
                };
                Ok(self.rewrap(&node, kind))
            }

            NodeKind::AssignmentExpression { operator, left, right } => {
                if operator != "=" {
                    return Err(self.raise(left.end(), &messages::DEFAULT_ONLY_EQ, &[]));
                }
                Ok(self.rewrap(&node, NodeKind::AssignmentPattern { left, right }))
            }

            NodeKind::MemberExpression { .. } if !is_binding => Ok(node),

            NodeKind::TypeCastExpression {
                expression,
                type_annotation,
            } => {
                let target = self.to_assignable(expression.clone(), is_binding)?;
                Ok(self.with_type_annotation(target, type_annotation))
            }

            _ => {
                let message = if is_binding {
                    &messages::BINDING_RVALUE
                } else {
                    &messages::ASSIGNING_TO_RVALUE
                };
                Err(self.raise(node.start(), message, &[]))
            }
        }
    }

    /// Convert a list of elements. A spread in the last position becomes a
    /// rest element.
    pub fn to_assignable_list(
        &self,
        mut elements: Vec<Option<Node<'a>>>,
        is_binding: bool,
    ) -> PResult<Vec<Option<Node<'a>>>> {
        let mut end = elements.len();
        if let Some(Some(last)) = elements.last_mut() {
            match last.kind {
                NodeKind::RestElement { .. } => end -= 1,
                NodeKind::SpreadElement { argument } => {
                    let argument = self.to_assignable(argument.clone(), is_binding)?;
                    if !matches!(
                        argument.kind,
                        NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. } | NodeKind::ArrayPattern { .. }
                    ) {
                        return self.unexpected_at(argument.start());
                    }
                    let rest = self.rewrap(
                        last,
                        NodeKind::RestElement {
                            argument: self.alloc(argument),
                            type_annotation: None,
                        },
                    );
                    *last = rest;
                    end -= 1;
                }
                _ => {}
            }
        }
        for slot in elements.iter_mut().take(end) {
            if let Some(element) = slot.take() {
                *slot = Some(self.to_assignable(element, is_binding)?);
            }
        }
        Ok(elements)
    }

    /// Attach an annotation to a binding target, extending it to cover the
    /// annotation.
    pub fn with_type_annotation(&self, target: Node<'a>, annotation: &'a Node<'a>) -> Node<'a> {
        let type_annotation = Some(annotation);
        let kind = match target.kind {
            NodeKind::Identifier { name, optional, .. } => NodeKind::Identifier {
                name,
                type_annotation,
                optional,
            },
            NodeKind::ObjectPattern { properties, .. } => NodeKind::ObjectPattern {
                properties,
                type_annotation,
            },
            NodeKind::ArrayPattern { elements, .. } => NodeKind::ArrayPattern {
                elements,
                type_annotation,
            },
            NodeKind::RestElement { argument, .. } => NodeKind::RestElement {
                argument,
                type_annotation,
            },
            _ => return target,
        };
        let start = self.start_of(&target);
        self.finish_node_at(start, kind, annotation.end(), annotation.data.loc.end)
    }

    /// Whether a converted assignment target was written in parentheses as
    /// a whole, as in `({a}) = 0`.
    pub fn check_parenthesized_pattern(&self, node: &Node<'a>) -> PResult<()> {
        if !node.is_parenthesized() {
            return Ok(());
        }
        match node.kind {
            NodeKind::ObjectPattern { .. } => Err(self.raise(node.start(), &messages::PARENTHESIZED_PATTERN, &[])),
            NodeKind::ArrayPattern { .. } => {
                Err(self.raise(node.start(), &messages::PARENTHESIZED_ARRAY_PATTERN, &[]))
            }
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Binding syntax
    // ========================================================================

    /// `...expr` in an array literal or argument list. Shorthand defaults
    /// in the argument are passed up only when `track` is set.
    pub fn parse_spread(&mut self, track: bool) -> PResult<Marked<'a>> {
        let start = self.start_node();
        self.next()?;
        let argument = if track {
            self.parse_maybe_assign_marked(false, false)?
        } else {
            Marked::plain(self.parse_maybe_assign(false)?)
        };
        let node = self.finish_node(
            start,
            NodeKind::SpreadElement {
                argument: self.alloc(argument.node),
            },
        );
        Ok(Marked {
            node,
            shorthand_default: argument.shorthand_default,
        })
    }

    /// `...target` in a binding list.
    pub fn parse_rest(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.next()?;
        let argument = self.parse_binding_atom()?;
        Ok(self.finish_node(
            start,
            NodeKind::RestElement {
                argument: self.alloc(argument),
                type_annotation: None,
            },
        ))
    }

    /// A binding identifier or a destructuring pattern.
    pub fn parse_binding_atom(&mut self) -> PResult<Node<'a>> {
        if !matches!(self.cur(), TokenType::BracketL | TokenType::BraceL) {
            return self.parse_binding_atom_inner();
        }
        self.enter()?;
        let result = self.parse_binding_atom_inner();
        self.leave();
        result
    }

    fn parse_binding_atom_inner(&mut self) -> PResult<Node<'a>> {
        match self.cur() {
            TokenType::Yield => {
                if self.strict() || self.state.in_generator {
                    return self.unexpected();
                }
                self.parse_identifier(true)
            }
            TokenType::Name => self.parse_identifier(false),
            TokenType::BracketL => {
                let start = self.start_node();
                self.next()?;
                let elements = self.parse_binding_list(TokenType::BracketR, true)?;
                Ok(self.finish_node(
                    start,
                    NodeKind::ArrayPattern {
                        elements: self.arena().alloc_slice_fill_iter(elements),
                        type_annotation: None,
                    },
                ))
            }
            TokenType::BraceL => Ok(self.parse_obj(true, false)?.node),
            _ => self.unexpected(),
        }
    }

    /// Elements of an array pattern or a parameter list, up to and
    /// including `close`. Holes are allowed only with `allow_empty`.
    pub fn parse_binding_list(&mut self, close: TokenType, allow_empty: bool) -> PResult<Vec<Option<Node<'a>>>> {
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(close)? {
            if first {
                first = false;
            } else {
                self.expect(TokenType::Comma)?;
            }
            if allow_empty && self.matches(TokenType::Comma) {
                elements.push(None);
            } else if self.eat(close)? {
                break;
            } else if self.matches(TokenType::Ellipsis) {
                let rest = self.parse_rest()?;
                let rest = self.parse_binding_annotation(rest, true)?;
                elements.push(Some(rest));
                if self.matches(TokenType::Comma) {
                    return Err(self.raise(self.start_pos(), &messages::REST_ELEMENT_NOT_LAST, &[]));
                }
                self.expect(close)?;
                break;
            } else {
                let start = self.start_node();
                let left = self.parse_binding_atom()?;
                let left = self.parse_binding_annotation(left, true)?;
                elements.push(Some(self.parse_maybe_default(Some(start), Some(left))?));
            }
        }
        Ok(elements)
    }

    /// A binding target with an optional `= default`.
    pub fn parse_maybe_default(&mut self, start: Option<NodeStart>, left: Option<Node<'a>>) -> PResult<Node<'a>> {
        let start = start.unwrap_or_else(|| self.start_node());
        let left = match left {
            Some(left) => left,
            None => self.parse_binding_atom()?,
        };
        if !self.eat(TokenType::Eq)? {
            return Ok(left);
        }
        let right = self.parse_maybe_assign(false)?;
        Ok(self.finish_node(
            start,
            NodeKind::AssignmentPattern {
                left: self.alloc(left),
                right: self.alloc(right),
            },
        ))
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate an assignment or binding target. With `clashes`, every
    /// bound name must be new to the set. `context` names the construct for
    /// the invalid-target message.
    pub fn check_lval(
        &self,
        expr: &Node<'a>,
        is_binding: bool,
        mut clashes: Option<&mut NameSet<'a>>,
        context: &str,
    ) -> PResult<()> {
        match &expr.kind {
            NodeKind::Identifier { name, .. } => {
                let name = *name;
                if self.strict() && (is_strict_bind_reserved_word(name) || is_strict_reserved_word(name)) {
                    let message = if is_binding {
                        &messages::BINDING_IN_STRICT
                    } else {
                        &messages::ASSIGN_IN_STRICT
                    };
                    return Err(self.raise(expr.start(), message, &[name]));
                }
                if let Some(names) = clashes {
                    if !names.insert(name) {
                        return Err(self.raise(expr.start(), &messages::ARGUMENT_NAME_CLASH, &[]));
                    }
                }
                Ok(())
            }
            NodeKind::MemberExpression { .. } if !is_binding => Ok(()),
            NodeKind::ObjectPattern { properties, .. } => {
                for prop in properties.iter() {
                    let target = match &prop.kind {
                        NodeKind::ObjectProperty { value, .. } => *value,
                        _ => prop,
                    };
                    self.check_lval(target, is_binding, clashes.as_deref_mut(), "object destructuring pattern")?;
                }
                Ok(())
            }
            NodeKind::ArrayPattern { elements, .. } => {
                for element in elements.iter().flatten() {
                    self.check_lval(element, is_binding, clashes.as_deref_mut(), "array destructuring pattern")?;
                }
                Ok(())
            }
            NodeKind::AssignmentPattern { left, .. } => {
                self.check_lval(left, is_binding, clashes, "assignment pattern")
            }
            NodeKind::RestProperty { argument } | NodeKind::RestElement { argument, .. } => {
                self.check_lval(argument, is_binding, clashes, "rest element")
            }
            _ => {
                let message = if is_binding {
                    &messages::BINDING_INVALID_LHS
                } else {
                    &messages::INVALID_LHS
                };
                Err(self.raise(expr.start(), message, &[context]))
            }
        }
    }
}
