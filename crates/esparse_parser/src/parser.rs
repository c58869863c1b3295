//! The parser core.
//!
//! A recursive descent parser over the on-demand [`Lexer`]. This module
//! holds the parser state, token driving, lookahead and speculative parsing,
//! the node builder, and the small predicates shared by the grammar modules
//! (`statement`, `expression`, `lval` and the built-in extensions), each of
//! which adds its own `impl<'a> Parser<'a>` block.

use bumpalo::Bump;
use esparse_ast::{
    Comment, File, MethodKind, Node, NodeData, NodeKind, NodeLocation, NodeList, Token, TokenType, TokenValue,
};
use esparse_core::arena::{alloc_str_in, alloc_vec_in};
use esparse_core::collections::{name_set, NameSet};
use esparse_core::text::{Position, SourceLocation};
use esparse_diagnostics::{messages, DiagnosticMessage, SyntaxError};
use esparse_lexer::{Lexer, LexerOptions, LexerState};
use tracing::{debug, trace};

use crate::comments::attach_comments;
use crate::extension::{Chain, ExtensionSet};
use crate::options::ParserOptions;

pub type PResult<T> = Result<T, SyntaxError>;

/// The start of a node under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStart {
    pub pos: u32,
    pub loc: Position,
}

/// An expression together with the offset of the first shorthand default
/// (`{a = 1}`) it contains. Such a default is only valid once the
/// expression is converted to a pattern.
#[derive(Debug, Clone)]
pub struct Marked<'a> {
    pub node: Node<'a>,
    pub shorthand_default: Option<u32>,
}

impl<'a> Marked<'a> {
    #[inline]
    pub fn plain(node: Node<'a>) -> Self {
        Self {
            node,
            shorthand_default: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Loop,
    Switch,
    Plain,
}

/// An entry of the label stack. Unnamed entries mark the loops and switches
/// that `break` and `continue` can target.
#[derive(Debug, Clone, Copy)]
pub struct Label<'a> {
    pub name: Option<&'a str>,
    pub kind: LabelKind,
    pub statement_start: u32,
}

/// Grammar context. Strictness and type mode live in the lexer state
/// because they change how tokens are read.
#[derive(Debug, Clone, Default)]
pub struct ParserState<'a> {
    pub in_function: bool,
    pub in_generator: bool,
    pub in_async: bool,
    /// The kind of the innermost enclosing method.
    pub in_method: Option<MethodKind>,
    pub in_class_property: bool,
    pub labels: Vec<Label<'a>>,
    pub potential_arrow_at: Option<u32>,
    /// Decorators waiting for the class they apply to.
    pub decorators: Vec<Node<'a>>,
    depth: u32,
}

/// The ECMAScript parser.
pub struct Parser<'a> {
    arena: &'a Bump,
    pub lexer: Lexer<'a>,
    pub state: ParserState<'a>,
    pub(crate) options: ParserOptions,
    pub(crate) extensions: ExtensionSet,
    /// Names exported so far by the module.
    pub(crate) exported: NameSet<'a>,
    /// Stamped on every node location.
    filename: Option<&'a str>,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, input: &'a str, options: &ParserOptions) -> Self {
        let extensions = ExtensionSet::resolve(&options.plugins);
        let lexer_options = LexerOptions {
            module: options.is_module(),
            double_colon: extensions.has("functionBind"),
            strict: options.is_strict(),
        };
        Self {
            arena,
            lexer: Lexer::new(arena, input, lexer_options),
            state: ParserState::default(),
            options: options.clone(),
            extensions,
            exported: name_set(),
            filename: options.source_filename.as_deref().map(|name| alloc_str_in(arena, name)),
        }
    }

    /// Parse the whole input as a program. Errors carry the source file
    /// name when one was configured.
    pub fn parse(self) -> PResult<File<'a>> {
        let filename = self.filename;
        self.parse_file().map_err(|err| err.with_filename(filename))
    }

    fn parse_file(mut self) -> PResult<File<'a>> {
        self.lexer.skip_shebang();
        self.next_token()?;
        let start = NodeStart {
            pos: 0,
            loc: Position::new(1, 0),
        };
        let (body, directives) = self.parse_block_body(true, true, TokenType::Eof)?;
        let program = self.finish_node(
            start,
            NodeKind::Program {
                source_type: self.options.source_type,
                body,
                directives,
            },
        );

        let arena = self.arena;
        let (tokens, comments) = self.lexer.finish();
        let tokens: &'a [Token<'a>] = alloc_vec_in(arena, tokens);
        let comments: &'a [Comment<'a>] = alloc_vec_in(arena, comments);
        attach_comments(&program, comments);
        debug!(
            tokens = tokens.len(),
            comments = comments.len(),
            statements = body.len(),
            "parsed program"
        );

        Ok(File {
            start: program.data.start,
            end: program.data.end,
            loc: program.data.loc,
            program,
            comments,
            tokens,
        })
    }

    #[inline]
    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    #[inline]
    pub fn input(&self) -> &'a str {
        self.lexer.input()
    }

    #[inline]
    pub fn has_plugin(&self, name: &str) -> bool {
        self.extensions.has(name)
    }

    /// Fail with the gated-syntax error unless `name` is enabled.
    pub fn expect_plugin(&self, name: &str, pos: Option<u32>) -> PResult<()> {
        if self.has_plugin(name) {
            Ok(())
        } else {
            let pos = pos.unwrap_or_else(|| self.start_pos());
            Err(self.raise(pos, &messages::PLUGIN_REQUIRED, &[name]))
        }
    }

    #[inline]
    pub fn in_module(&self) -> bool {
        self.options.is_module()
    }

    #[inline]
    pub fn strict(&self) -> bool {
        self.lexer.state.strict
    }

    pub fn set_strict(&mut self, strict: bool) -> PResult<()> {
        self.lexer.set_strict(strict)
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    pub fn cur(&self) -> TokenType {
        self.lexer.state.token_type
    }

    #[inline]
    pub fn value(&self) -> TokenValue<'a> {
        self.lexer.state.value
    }

    /// The string payload of the current token.
    #[inline]
    pub fn text(&self) -> &'a str {
        self.lexer.state.value.as_str()
    }

    #[inline]
    pub fn start_pos(&self) -> u32 {
        self.lexer.state.start as u32
    }

    #[inline]
    pub fn last_tok_end(&self) -> u32 {
        self.lexer.state.last_tok_end as u32
    }

    #[inline]
    pub fn last_tok_start(&self) -> u32 {
        self.lexer.state.last_tok_start as u32
    }

    /// Commit the current token and read the next one.
    pub fn next(&mut self) -> PResult<()> {
        self.lexer.record_token();
        self.next_token()
    }

    /// Read a token through the extension chain.
    pub fn next_token(&mut self) -> PResult<()> {
        if let Some(ch) = self.lexer.begin_token()? {
            self.read_token_from(Chain::START, ch)?;
        }
        Ok(())
    }

    /// Scan one token ahead through the extension chain and return the
    /// resulting state. Nothing is committed.
    pub fn lookahead(&mut self) -> PResult<LexerState<'a>> {
        let old = self.lexer.snapshot();
        self.lexer.state.is_lookahead = true;
        let result = self.next();
        let mut ahead = std::mem::replace(&mut self.lexer.state, old);
        result?;
        ahead.is_lookahead = false;
        Ok(ahead)
    }

    /// Run `f` speculatively. On failure every effect on the lexer, the
    /// parser state and the token and comment histories is rolled back.
    pub fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> Option<T> {
        let lexer_state = self.lexer.snapshot();
        let history = self.lexer.history_len();
        let state = self.state.clone();
        match f(self) {
            Ok(value) => Some(value),
            Err(err) => {
                trace!(pos = err.pos, message = %err.message, "speculative parse rolled back");
                self.lexer.restore(lexer_state);
                self.lexer.truncate_history(history);
                self.state = state;
                None
            }
        }
    }

    #[inline]
    pub fn matches(&self, token_type: TokenType) -> bool {
        self.cur() == token_type
    }

    /// Consume the current token if it has the given type.
    pub fn eat(&mut self, token_type: TokenType) -> PResult<bool> {
        if self.matches(token_type) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn expect(&mut self, token_type: TokenType) -> PResult<()> {
        if self.eat(token_type)? {
            Ok(())
        } else {
            Err(self.raise(self.start_pos(), &messages::UNEXPECTED_TOKEN_EXPECTED, &[token_type.label()]))
        }
    }

    /// Whether the current token is the plain identifier `name`.
    #[inline]
    pub fn is_contextual(&self, name: &str) -> bool {
        self.matches(TokenType::Name) && self.text() == name
    }

    pub fn eat_contextual(&mut self, name: &str) -> PResult<bool> {
        if self.is_contextual(name) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn expect_contextual(&mut self, name: &str) -> PResult<()> {
        if self.eat_contextual(name)? {
            Ok(())
        } else {
            Err(self.raise(self.start_pos(), &messages::UNEXPECTED_TOKEN_EXPECTED, &[name]))
        }
    }

    /// Whether the current token is the relational operator `op`.
    #[inline]
    pub fn is_relational(&self, op: &str) -> bool {
        self.matches(TokenType::Relational) && self.text() == op
    }

    pub fn expect_relational(&mut self, op: &str) -> PResult<()> {
        if self.is_relational(op) {
            self.next()
        } else {
            Err(self.raise(self.start_pos(), &messages::UNEXPECTED_TOKEN_EXPECTED, &[op]))
        }
    }

    /// Whether a line break separates the previous token from the current
    /// one.
    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.lexer.has_line_break(self.lexer.state.last_tok_end, self.lexer.state.start)
    }

    /// Whether automatic semicolon insertion applies here.
    pub fn can_insert_semicolon(&self) -> bool {
        matches!(self.cur(), TokenType::Eof | TokenType::BraceR) || self.has_preceding_line_break()
    }

    /// Consume a `;` or accept an inserted one.
    pub fn is_line_terminator(&mut self) -> PResult<bool> {
        Ok(self.eat(TokenType::Semi)? || self.can_insert_semicolon())
    }

    pub fn semicolon(&mut self) -> PResult<()> {
        if self.is_line_terminator()? {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub fn raise(&self, pos: u32, message: &DiagnosticMessage, args: &[&str]) -> SyntaxError {
        self.lexer.error(pos as usize, message, args)
    }

    /// "Unexpected token" at the current token.
    pub fn unexpected<T>(&self) -> PResult<T> {
        self.unexpected_at(self.start_pos())
    }

    pub fn unexpected_at<T>(&self, pos: u32) -> PResult<T> {
        Err(self.raise(pos, &messages::UNEXPECTED_TOKEN, &[]))
    }

    /// Guard one level of syntactic nesting.
    pub(crate) fn enter(&mut self) -> PResult<()> {
        self.state.depth += 1;
        if self.state.depth > self.options.max_nesting_depth {
            return Err(self.raise(self.start_pos(), &messages::MAX_NESTING_DEPTH, &[]));
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn leave(&mut self) {
        self.state.depth = self.state.depth.saturating_sub(1);
    }

    // ========================================================================
    // Node builder
    // ========================================================================

    /// Capture the start of the current token.
    #[inline]
    pub fn start_node(&self) -> NodeStart {
        NodeStart {
            pos: self.start_pos(),
            loc: self.lexer.state.start_loc,
        }
    }

    #[inline]
    pub fn start_node_at(&self, pos: u32, loc: Position) -> NodeStart {
        NodeStart { pos, loc }
    }

    /// The start of an already built node.
    #[inline]
    pub fn start_of(&self, node: &Node<'a>) -> NodeStart {
        NodeStart {
            pos: node.data.start,
            loc: node.data.loc.start,
        }
    }

    /// Close a node at the end of the last consumed token.
    pub fn finish_node(&self, start: NodeStart, kind: NodeKind<'a>) -> Node<'a> {
        self.finish_node_at(start, kind, self.last_tok_end(), self.lexer.state.last_tok_end_loc)
    }

    pub fn finish_node_at(&self, start: NodeStart, kind: NodeKind<'a>, end: u32, end_loc: Position) -> Node<'a> {
        let loc = NodeLocation::new(SourceLocation::new(start.loc, end_loc), self.filename);
        Node::new(kind, NodeData::new(start.pos, end, loc))
    }

    /// A copy of `node` with a new kind and the same location.
    pub fn rewrap(&self, node: &Node<'a>, kind: NodeKind<'a>) -> Node<'a> {
        Node::new(kind, node.data.clone())
    }

    #[inline]
    pub fn alloc(&self, node: Node<'a>) -> &'a Node<'a> {
        self.arena.alloc(node)
    }

    #[inline]
    pub fn alloc_list(&self, nodes: Vec<Node<'a>>) -> NodeList<'a> {
        alloc_vec_in(self.arena, nodes)
    }

    #[inline]
    pub fn alloc_str(&self, text: &str) -> &'a str {
        alloc_str_in(self.arena, text)
    }

    /// The source text of a node.
    #[inline]
    pub fn source_of(&self, start: u32, end: u32) -> &'a str {
        self.input().get(start as usize..end as usize).unwrap_or("")
    }

    pub fn identifier(&self, start: NodeStart, name: &'a str) -> Node<'a> {
        self.finish_node(
            start,
            NodeKind::Identifier {
                name,
                type_annotation: None,
                optional: false,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser<'a>(arena: &'a Bump, source: &'a str) -> Parser<'a> {
        let mut parser = Parser::new(arena, source, &ParserOptions::default());
        parser.next_token().unwrap();
        parser
    }

    #[test]
    fn test_lookahead_does_not_commit() {
        let arena = Bump::new();
        let mut p = parser(&arena, "a b c");
        let ahead = p.lookahead().unwrap();
        assert_eq!(ahead.value.as_str(), "b");
        assert_eq!(p.text(), "a");
        assert!(p.lexer.tokens().is_empty());
    }

    #[test]
    fn test_try_parse_rolls_back() {
        let arena = Bump::new();
        let mut p = parser(&arena, "a /* x */ b c");
        let failed: Option<()> = p.try_parse(|p| {
            p.next()?;
            p.next()?;
            p.state.in_async = true;
            p.unexpected()
        });
        assert!(failed.is_none());
        assert_eq!(p.text(), "a");
        assert!(!p.state.in_async);
        assert_eq!(p.lexer.history_len(), (0, 0));

        let kept = p.try_parse(|p| p.next());
        assert!(kept.is_some());
        assert_eq!(p.text(), "b");
        assert_eq!(p.lexer.history_len(), (1, 1));
    }

    #[test]
    fn test_can_insert_semicolon() {
        let arena = Bump::new();
        let mut p = parser(&arena, "a\nb c");
        p.next().unwrap();
        assert!(p.can_insert_semicolon());
        p.next().unwrap();
        assert!(!p.can_insert_semicolon());
    }

    #[test]
    fn test_expect_reports_the_missing_token() {
        let arena = Bump::new();
        let mut p = parser(&arena, "a");
        let err = p.expect(TokenType::ParenL).unwrap_err();
        assert_eq!(err.message, "Unexpected token, expected (");
        assert_eq!(err.pos, 0);
    }

    #[test]
    fn test_nesting_guard() {
        let arena = Bump::new();
        let options = ParserOptions {
            max_nesting_depth: 2,
            ..ParserOptions::default()
        };
        let mut p = Parser::new(&arena, "x", &options);
        assert!(p.enter().is_ok());
        assert!(p.enter().is_ok());
        let err = p.enter().unwrap_err();
        assert_eq!(err.message, "Maximum nesting depth exceeded");
        p.leave();
        p.leave();
        p.leave();
        assert!(p.enter().is_ok());
    }
}
