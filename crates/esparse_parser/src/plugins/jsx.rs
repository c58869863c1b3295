//! The `jsx` extension: JSX elements as primary expressions.

use esparse_ast::{Node, NodeKind, TokenType, TokenValue};
use esparse_diagnostics::messages;
use esparse_lexer::{is_identifier_start, Context};

use crate::extension::{Chain, SyntaxExtension};
use crate::parser::{Marked, NodeStart, PResult, Parser};

pub struct Jsx;

pub static JSX: Jsx = Jsx;

impl SyntaxExtension for Jsx {
    fn name(&self) -> &'static str {
        "jsx"
    }

    fn read_token(&self, p: &mut Parser<'_>, next: Chain, ch: char) -> PResult<()> {
        let context = p.lexer.cur_context();
        match context {
            Context::JsxExpression => return p.lexer.jsx_read_token(),
            Context::JsxOpenTag | Context::JsxCloseTag => {
                if is_identifier_start(ch) {
                    return p.lexer.jsx_read_word();
                }
                if ch == '>' {
                    p.lexer.state.pos += 1;
                    p.lexer.finish_token(TokenType::JsxTagEnd, TokenValue::None);
                    return Ok(());
                }
                if (ch == '"' || ch == '\'') && context == Context::JsxOpenTag {
                    return p.lexer.jsx_read_string(ch);
                }
            }
            _ => {}
        }
        if ch == '<' && p.lexer.state.expr_allowed {
            p.lexer.state.pos += 1;
            p.lexer.finish_token(TokenType::JsxTagStart, TokenValue::None);
            return Ok(());
        }
        p.read_token_from(next, ch)
    }

    fn parse_expr_atom<'a>(&self, p: &mut Parser<'a>, next: Chain, track_defaults: bool) -> PResult<Marked<'a>> {
        match p.cur() {
            TokenType::JsxText => p.jsx_parse_text().map(Marked::plain),
            TokenType::JsxTagStart => p.jsx_parse_element().map(Marked::plain),
            _ => p.parse_expr_atom_from(next, track_defaults),
        }
    }
}

/// The dotted, namespaced source name of a tag, for matching open and
/// close tags.
fn qualified_name(node: &Node<'_>) -> String {
    match node.kind {
        NodeKind::JsxIdentifier { name } => name.to_string(),
        NodeKind::JsxNamespacedName { namespace, name } => {
            format!("{}:{}", qualified_name(namespace), qualified_name(name))
        }
        NodeKind::JsxMemberExpression { object, property } => {
            format!("{}.{}", qualified_name(object), qualified_name(property))
        }
        _ => String::new(),
    }
}

impl<'a> Parser<'a> {
    fn jsx_parse_text(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let value = self.text();
        let raw = self.source_of(self.start_pos(), self.lexer.state.end as u32);
        self.next()?;
        Ok(self.finish_node(start, NodeKind::JsxText { value, raw }))
    }

    /// A tag or attribute name part. Keywords are plain names here.
    fn jsx_parse_identifier(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let name = match self.cur() {
            TokenType::JsxName => self.text(),
            token => match token.keyword() {
                Some(keyword) => keyword,
                None => return self.unexpected(),
            },
        };
        self.next()?;
        Ok(self.finish_node(start, NodeKind::JsxIdentifier { name }))
    }

    fn jsx_parse_namespaced_name(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let namespace = self.jsx_parse_identifier()?;
        if !self.eat(TokenType::Colon)? {
            return Ok(namespace);
        }
        let name = self.jsx_parse_identifier()?;
        Ok(self.finish_node(
            start,
            NodeKind::JsxNamespacedName {
                namespace: self.alloc(namespace),
                name: self.alloc(name),
            },
        ))
    }

    fn jsx_parse_element_name(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        let mut node = self.jsx_parse_namespaced_name()?;
        while self.eat(TokenType::Dot)? {
            let property = self.jsx_parse_identifier()?;
            node = self.finish_node(
                start,
                NodeKind::JsxMemberExpression {
                    object: self.alloc(node),
                    property: self.alloc(property),
                },
            );
        }
        Ok(node)
    }

    fn jsx_parse_attribute_value(&mut self) -> PResult<Node<'a>> {
        match self.cur() {
            TokenType::BraceL => {
                let node = self.jsx_parse_expression_container()?;
                if let NodeKind::JsxExpressionContainer { expression } = node.kind {
                    if matches!(expression.kind, NodeKind::JsxEmptyExpression) {
                        return Err(self.raise(node.start(), &messages::JSX_EMPTY_ATTRIBUTE_EXPRESSION, &[]));
                    }
                }
                Ok(node)
            }
            TokenType::JsxTagStart | TokenType::String => Ok(self.parse_expr_atom(false)?.node),
            _ => Err(self.raise(self.start_pos(), &messages::JSX_INVALID_ATTRIBUTE_VALUE, &[])),
        }
    }

    /// The empty expression of `{}` spans the gap between the braces.
    fn jsx_parse_empty_expression(&self) -> Node<'a> {
        let start = NodeStart {
            pos: self.last_tok_end(),
            loc: self.lexer.state.last_tok_end_loc,
        };
        self.finish_node_at(start, NodeKind::JsxEmptyExpression, self.start_pos(), self.lexer.state.start_loc)
    }

    fn jsx_parse_expression_container(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.next()?;
        let expression = if self.matches(TokenType::BraceR) {
            self.jsx_parse_empty_expression()
        } else {
            self.parse_expression(false)?
        };
        self.expect(TokenType::BraceR)?;
        Ok(self.finish_node(
            start,
            NodeKind::JsxExpressionContainer {
                expression: self.alloc(expression),
            },
        ))
    }

    fn jsx_parse_attribute(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        if self.eat(TokenType::BraceL)? {
            self.expect(TokenType::Ellipsis)?;
            let argument = self.parse_maybe_assign(false)?;
            self.expect(TokenType::BraceR)?;
            return Ok(self.finish_node(
                start,
                NodeKind::JsxSpreadAttribute {
                    argument: self.alloc(argument),
                },
            ));
        }
        let name = self.jsx_parse_namespaced_name()?;
        let value = if self.eat(TokenType::Eq)? {
            let value = self.jsx_parse_attribute_value()?;
            Some(self.alloc(value))
        } else {
            None
        };
        Ok(self.finish_node(
            start,
            NodeKind::JsxAttribute {
                name: self.alloc(name),
                value,
            },
        ))
    }

    /// The rest of an opening tag after `<`.
    fn jsx_parse_opening_element_at(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        let name = self.jsx_parse_element_name()?;
        let mut attributes = Vec::new();
        while !self.matches(TokenType::Slash) && !self.matches(TokenType::JsxTagEnd) {
            attributes.push(self.jsx_parse_attribute()?);
        }
        let self_closing = self.eat(TokenType::Slash)?;
        self.expect(TokenType::JsxTagEnd)?;
        Ok(self.finish_node(
            start,
            NodeKind::JsxOpeningElement {
                name: self.alloc(name),
                attributes: self.alloc_list(attributes),
                self_closing,
            },
        ))
    }

    /// The rest of a closing tag after `</`.
    fn jsx_parse_closing_element_at(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        let name = self.jsx_parse_element_name()?;
        self.expect(TokenType::JsxTagEnd)?;
        Ok(self.finish_node(
            start,
            NodeKind::JsxClosingElement {
                name: self.alloc(name),
            },
        ))
    }

    fn jsx_parse_element_at(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        self.enter()?;
        let result = self.jsx_parse_element_inner(start);
        self.leave();
        result
    }

    fn jsx_parse_element_inner(&mut self, start: NodeStart) -> PResult<Node<'a>> {
        let opening = self.jsx_parse_opening_element_at(start)?;
        let NodeKind::JsxOpeningElement {
            name: opening_name,
            self_closing,
            ..
        } = opening.kind
        else {
            return self.unexpected_at(start.pos);
        };

        let mut children = Vec::new();
        let mut closing = None;
        if !self_closing {
            loop {
                match self.cur() {
                    TokenType::JsxTagStart => {
                        let child_start = self.start_node();
                        self.next()?;
                        if self.eat(TokenType::Slash)? {
                            closing = Some(self.jsx_parse_closing_element_at(child_start)?);
                            break;
                        }
                        children.push(self.jsx_parse_element_at(child_start)?);
                    }
                    TokenType::JsxText => children.push(self.jsx_parse_text()?),
                    TokenType::BraceL => children.push(self.jsx_parse_expression_container()?),
                    _ => return self.unexpected(),
                }
            }
            if let Some(NodeKind::JsxClosingElement { name }) = closing.as_ref().map(|node| &node.kind) {
                let expected = qualified_name(opening_name);
                if qualified_name(name) != expected {
                    let pos = closing.as_ref().map_or(start.pos, Node::start);
                    return Err(self.raise(pos, &messages::EXPECTED_CLOSING_JSX_TAG, &[&expected]));
                }
            }
        }

        if self.is_relational("<") {
            return Err(self.raise(self.start_pos(), &messages::ADJACENT_JSX_ELEMENTS, &[]));
        }
        Ok(self.finish_node(
            start,
            NodeKind::JsxElement {
                opening_element: self.alloc(opening),
                closing_element: closing.map(|node| self.alloc(node)),
                children: self.alloc_list(children),
            },
        ))
    }

    /// An element, starting at its `<`.
    fn jsx_parse_element(&mut self) -> PResult<Node<'a>> {
        let start = self.start_node();
        self.next()?;
        self.jsx_parse_element_at(start)
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use bumpalo::Bump;

    fn jsx_options() -> ParserOptions {
        ParserOptions::default().with_plugin("jsx")
    }

    #[test]
    fn test_element_with_attributes_and_children() {
        let arena = Bump::new();
        let file = crate::parse(&arena, "<a b=\"c\" {...d}>x {y}</a>", &jsx_options()).unwrap();
        let json = serde_json::to_value(&file.program).unwrap();
        let element = &json["body"][0]["expression"];
        assert_eq!(element["type"], "JSXElement");
        assert_eq!(element["openingElement"]["attributes"][0]["type"], "JSXAttribute");
        assert_eq!(element["openingElement"]["attributes"][1]["type"], "JSXSpreadAttribute");
        assert_eq!(element["children"][0]["type"], "JSXText");
        assert_eq!(element["children"][0]["value"], "x ");
        assert_eq!(element["children"][1]["type"], "JSXExpressionContainer");
        assert_eq!(element["closingElement"]["name"]["name"], "a");
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let arena = Bump::new();
        let err = crate::parse(&arena, "<a.b></a.c>", &jsx_options()).unwrap_err();
        assert_eq!(err.message, "Expected corresponding JSX closing tag for <a.b>");
    }

    #[test]
    fn test_entities_are_decoded() {
        let arena = Bump::new();
        let file = crate::parse(&arena, "<p>&lt;&#65;&#x42;</p>", &jsx_options()).unwrap();
        let json = serde_json::to_value(&file.program).unwrap();
        let text = &json["body"][0]["expression"]["children"][0];
        assert_eq!(text["value"], "<AB");
        assert_eq!(text["raw"], "&lt;&#65;&#x42;");
    }

    #[test]
    fn test_empty_attribute_expression() {
        let arena = Bump::new();
        let err = crate::parse(&arena, "<a b={} />", &jsx_options()).unwrap_err();
        assert_eq!(err.message, "JSX attributes must only be assigned a non-empty expression");
    }

    #[test]
    fn test_without_extension_lt_is_an_operator() {
        let arena = Bump::new();
        assert!(crate::parse(&arena, "<a />", &ParserOptions::default()).is_err());
    }
}
