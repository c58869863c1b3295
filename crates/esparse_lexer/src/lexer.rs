//! The ECMAScript lexer.
//!
//! Converts source text into tokens on demand. The lexer keeps a context
//! stack so it can tell a regular expression from a division and a block
//! from an object literal without help from the parser. All mutable scan
//! state lives in [`LexerState`], a plain `Clone` struct, so lookahead and
//! speculative parsing are a snapshot and a restore.

use crate::char_codes::*;
use crate::context::{Context, ContextStack};
use bumpalo::Bump;
use esparse_ast::{Comment, CommentKind, Token, TokenType, TokenValue};
use esparse_core::arena::alloc_str_in;
use esparse_core::text::{LineMap, Position, SourceLocation};
use esparse_diagnostics::{messages, DiagnosticMessage, SyntaxError};
use std::cell::OnceCell;

pub type LexResult<T> = Result<T, SyntaxError>;

/// Options that change how characters are tokenized.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexerOptions {
    /// Module code: HTML-like comments are rejected.
    pub module: bool,
    /// Recognise `::` as a single token.
    pub double_colon: bool,
    /// Start in strict mode.
    pub strict: bool,
}

/// The complete scan state. Cloning it is a snapshot; the context stack is
/// shared with the clone rather than copied.
#[derive(Debug, Clone)]
pub struct LexerState<'a> {
    pub pos: usize,
    /// 1-based line of `pos`.
    pub cur_line: u32,
    /// Byte offset of the start of the current line.
    pub line_start: usize,

    // Current token.
    pub token_type: TokenType,
    pub value: TokenValue<'a>,
    pub start: usize,
    pub end: usize,
    pub start_loc: Position,
    pub end_loc: Position,

    // Previous token.
    pub last_tok_start: usize,
    pub last_tok_end: usize,
    pub last_tok_start_loc: Position,
    pub last_tok_end_loc: Position,

    pub context: ContextStack,
    /// Whether an expression may start at the current position.
    pub expr_allowed: bool,
    /// The last word read contained a `\u` escape.
    pub contains_esc: bool,
    /// The current token contains a legacy octal escape.
    pub contains_octal: bool,
    pub octal_position: Option<usize>,
    pub strict: bool,
    /// Inside a type annotation; `<` and `>` are single-character tokens.
    pub in_type: bool,
    /// Tokens and comments are not recorded while set.
    pub is_lookahead: bool,
}

impl<'a> LexerState<'a> {
    fn new(strict: bool) -> Self {
        let origin = Position::new(1, 0);
        Self {
            pos: 0,
            cur_line: 1,
            line_start: 0,
            token_type: TokenType::Eof,
            value: TokenValue::None,
            start: 0,
            end: 0,
            start_loc: origin,
            end_loc: origin,
            last_tok_start: 0,
            last_tok_end: 0,
            last_tok_start_loc: origin,
            last_tok_end_loc: origin,
            context: ContextStack::new(Context::BraceStatement),
            expr_allowed: true,
            contains_esc: false,
            contains_octal: false,
            octal_position: None,
            strict,
            in_type: false,
            is_lookahead: false,
        }
    }
}

/// The lexer converts source text into tokens.
pub struct Lexer<'a> {
    arena: &'a Bump,
    input: &'a str,
    pub state: LexerState<'a>,
    options: LexerOptions,
    tokens: Vec<Token<'a>>,
    comments: Vec<Comment<'a>>,
    line_map: OnceCell<LineMap>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source text.
    pub fn new(arena: &'a Bump, input: &'a str, options: LexerOptions) -> Self {
        Self {
            arena,
            input,
            state: LexerState::new(options.strict),
            options,
            tokens: Vec::new(),
            comments: Vec::new(),
            line_map: OnceCell::new(),
        }
    }

    #[inline]
    pub fn input(&self) -> &'a str {
        self.input
    }

    #[inline]
    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    #[inline]
    pub fn options(&self) -> LexerOptions {
        self.options
    }

    /// Tokens recorded so far.
    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    /// Comments recorded so far.
    pub fn comments(&self) -> &[Comment<'a>] {
        &self.comments
    }

    /// Lengths of the token and comment histories.
    pub fn history_len(&self) -> (usize, usize) {
        (self.tokens.len(), self.comments.len())
    }

    /// Drop history recorded after `len` was taken.
    pub fn truncate_history(&mut self, len: (usize, usize)) {
        self.tokens.truncate(len.0);
        self.comments.truncate(len.1);
    }

    /// Consume the lexer, returning the recorded tokens and comments.
    pub fn finish(self) -> (Vec<Token<'a>>, Vec<Comment<'a>>) {
        (self.tokens, self.comments)
    }

    /// Snapshot the scan state.
    #[inline]
    pub fn snapshot(&self) -> LexerState<'a> {
        self.state.clone()
    }

    /// Restore a snapshot taken with [`Lexer::snapshot`].
    #[inline]
    pub fn restore(&mut self, state: LexerState<'a>) {
        self.state = state;
    }

    /// The innermost context frame.
    #[inline]
    pub fn cur_context(&self) -> Context {
        self.state.context.last().unwrap_or(Context::BraceStatement)
    }

    /// Line and column of the scan position.
    #[inline]
    pub fn cur_position(&self) -> Position {
        Position::new(self.state.cur_line, (self.state.pos - self.state.line_start) as u32)
    }

    /// Line and column of an arbitrary offset.
    pub fn position_of(&self, pos: usize) -> Position {
        self.line_map.get_or_init(|| LineMap::new(self.input)).position_of(pos as u32)
    }

    /// Build a syntax error at `pos`.
    pub fn error(&self, pos: usize, message: &DiagnosticMessage, args: &[&str]) -> SyntaxError {
        SyntaxError::new(message, args, pos as u32, self.position_of(pos))
    }

    /// The current token as a value.
    pub fn current_token(&self) -> Token<'a> {
        Token {
            token_type: self.state.token_type,
            value: self.state.value,
            start: self.state.start as u32,
            end: self.state.end as u32,
            loc: SourceLocation::new(self.state.start_loc, self.state.end_loc),
        }
    }

    // ========================================================================
    // Driving
    // ========================================================================

    /// Skip a `#!` line at the very start of the input.
    pub fn skip_shebang(&mut self) {
        if self.state.pos == 0 && self.input.starts_with("#!") {
            self.skip_line_comment(2);
        }
    }

    /// Record the current token and move to the next one.
    pub fn next(&mut self) -> LexResult<()> {
        self.record_token();
        self.next_token()
    }

    /// Push the current token to the history (outside lookahead) and make it
    /// the last token.
    pub fn record_token(&mut self) {
        if !self.state.is_lookahead {
            let token = self.current_token();
            self.tokens.push(token);
        }
        self.state.last_tok_end = self.state.end;
        self.state.last_tok_start = self.state.start;
        self.state.last_tok_end_loc = self.state.end_loc;
        self.state.last_tok_start_loc = self.state.start_loc;
    }

    /// Read the next token without recording the current one.
    pub fn next_token(&mut self) -> LexResult<()> {
        if let Some(ch) = self.begin_token()? {
            self.read_token(ch)?;
        }
        Ok(())
    }

    /// Skip whitespace and comments and mark the start of the next token.
    ///
    /// End of input and template chunks are finished here. Otherwise the
    /// first character is returned and the caller reads the token, which lets
    /// the parser route token reading through its extensions.
    pub fn begin_token(&mut self) -> LexResult<Option<char>> {
        let context = self.cur_context();
        if !context.preserve_space() {
            self.skip_space()?;
        }
        self.state.contains_octal = false;
        self.state.octal_position = None;
        self.state.start = self.state.pos;
        self.state.start_loc = self.cur_position();
        match self.char_at(self.state.pos) {
            None => {
                self.finish_token(TokenType::Eof, TokenValue::None);
                Ok(None)
            }
            Some(_) if context == Context::Template => {
                self.read_tmpl_token()?;
                Ok(None)
            }
            Some(ch) => Ok(Some(ch)),
        }
    }

    /// Scan one token ahead and return the resulting state, leaving the
    /// lexer untouched.
    pub fn lookahead(&mut self) -> LexResult<LexerState<'a>> {
        let old = self.state.clone();
        self.state.is_lookahead = true;
        let result = self.next();
        let mut ahead = std::mem::replace(&mut self.state, old);
        result?;
        ahead.is_lookahead = false;
        Ok(ahead)
    }

    /// Toggle strict mode. A number or string token that is already scanned
    /// is read again under the new rules.
    pub fn set_strict(&mut self, strict: bool) -> LexResult<()> {
        self.state.strict = strict;
        if !matches!(self.state.token_type, TokenType::Num | TokenType::String) {
            return Ok(());
        }
        self.state.pos = self.state.start;
        if self.state.pos < self.state.line_start {
            let loc = self.position_of(self.state.pos);
            self.state.cur_line = loc.line;
            self.state.line_start = self.state.pos - loc.column as usize;
        }
        self.next_token()
    }

    // ========================================================================
    // Character access
    // ========================================================================

    #[inline]
    fn byte_at(&self, pos: usize) -> u8 {
        self.input.as_bytes().get(pos).copied().unwrap_or(0)
    }

    /// The character starting at `pos`.
    #[inline]
    pub fn char_at(&self, pos: usize) -> Option<char> {
        let byte = *self.input.as_bytes().get(pos)?;
        if byte < 0x80 {
            return Some(byte as char);
        }
        self.input.get(pos..)?.chars().next()
    }

    /// Whether a U+2028 or U+2029 starts at `pos`.
    #[inline]
    fn is_unicode_line_break_at(&self, pos: usize) -> bool {
        let bytes = self.input.as_bytes();
        bytes.get(pos) == Some(&0xE2) && bytes.get(pos + 1) == Some(&0x80) && matches!(bytes.get(pos + 2), Some(0xA8 | 0xA9))
    }

    #[inline]
    pub(crate) fn new_line(&mut self) {
        self.state.cur_line += 1;
        self.state.line_start = self.state.pos;
    }

    /// Advance past `to`, counting the line breaks in between.
    fn track_line_breaks(&mut self, from: usize, to: usize) {
        let bytes = self.input.as_bytes();
        let mut i = from;
        while let Some(offset) = memchr::memchr3(b'\n', b'\r', 0xE2, &bytes[i..to]) {
            let at = i + offset;
            let width = match bytes[at] {
                b'\r' if at + 1 < to && bytes[at + 1] == b'\n' => 2,
                b'\r' | b'\n' => 1,
                _ if self.is_unicode_line_break_at(at) => 3,
                _ => {
                    i = at + 1;
                    continue;
                }
            };
            self.state.cur_line += 1;
            self.state.line_start = at + width;
            i = at + width;
        }
    }

    // ========================================================================
    // Whitespace and comments
    // ========================================================================

    fn push_comment(&mut self, kind: CommentKind, value: &'a str, start: usize, start_loc: Position) {
        if self.state.is_lookahead {
            return;
        }
        self.comments.push(Comment {
            kind,
            value,
            start: start as u32,
            end: self.state.pos as u32,
            loc: SourceLocation::new(start_loc, self.cur_position()),
        });
    }

    fn skip_block_comment(&mut self) -> LexResult<()> {
        let start = self.state.pos;
        let start_loc = self.cur_position();
        let body = start + 2;
        let end = memchr::memmem::find(&self.input.as_bytes()[body..], b"*/")
            .map(|offset| body + offset)
            .ok_or_else(|| self.error(start, &messages::UNTERMINATED_COMMENT, &[]))?;
        self.state.pos = end + 2;
        self.track_line_breaks(body, end);
        let value = &self.input[body..end];
        self.push_comment(CommentKind::Block, value, start, start_loc);
        Ok(())
    }

    fn skip_line_comment(&mut self, start_skip: usize) {
        let start = self.state.pos;
        let start_loc = self.cur_position();
        let bytes = self.input.as_bytes();
        let body = start + start_skip;
        let mut end = bytes.len();
        let mut i = body;
        while let Some(offset) = memchr::memchr3(b'\n', b'\r', 0xE2, &bytes[i..]) {
            let at = i + offset;
            if bytes[at] != 0xE2 || self.is_unicode_line_break_at(at) {
                end = at;
                break;
            }
            i = at + 1;
        }
        self.state.pos = end;
        let value = &self.input[body..end];
        self.push_comment(CommentKind::Line, value, start, start_loc);
    }

    /// Skip whitespace, line terminators and comments.
    pub fn skip_space(&mut self) -> LexResult<()> {
        let input = self.input;
        let bytes = input.as_bytes();
        while self.state.pos < bytes.len() {
            let pos = self.state.pos;
            match bytes[pos] {
                b' ' | b'\t' | 0x0B | 0x0C => self.state.pos += 1,
                b'\r' => {
                    self.state.pos += if self.byte_at(pos + 1) == b'\n' { 2 } else { 1 };
                    self.new_line();
                }
                b'\n' => {
                    self.state.pos += 1;
                    self.new_line();
                }
                b'/' => match self.byte_at(pos + 1) {
                    b'*' => self.skip_block_comment()?,
                    b'/' => self.skip_line_comment(2),
                    _ => break,
                },
                b'<' if input[pos..].starts_with("<!--") => {
                    // `<!--` is a line comment in scripts.
                    if self.options.module {
                        return Err(self.error(pos, &messages::UNEXPECTED_TOKEN, &[]));
                    }
                    self.skip_line_comment(4);
                }
                b'-' if input[pos..].starts_with("-->") && self.state.line_start > self.state.last_tok_end => {
                    // `-->` at the start of a line is a line comment.
                    self.skip_line_comment(3);
                }
                byte if byte < 0x80 => break,
                _ => match self.char_at(pos) {
                    Some(ch) if ch == LINE_SEPARATOR || ch == PARAGRAPH_SEPARATOR => {
                        self.state.pos += ch.len_utf8();
                        self.new_line();
                    }
                    Some(ch) if is_white_space_single_line(ch) => self.state.pos += ch.len_utf8(),
                    _ => break,
                },
            }
        }
        Ok(())
    }

    // ========================================================================
    // Token completion
    // ========================================================================

    /// Finish the current token: set its end, type and value, and update the
    /// context stack.
    pub fn finish_token(&mut self, token_type: TokenType, value: TokenValue<'a>) {
        self.state.end = self.state.pos;
        self.state.end_loc = self.cur_position();
        let prev_type = self.state.token_type;
        self.state.token_type = token_type;
        self.state.value = value;
        self.update_context(prev_type);
    }

    /// Finish an operator token of `size` bytes whose value is its text.
    pub fn finish_op(&mut self, token_type: TokenType, size: usize) {
        let text = &self.input[self.state.pos..self.state.pos + size];
        self.state.pos += size;
        self.finish_token(token_type, TokenValue::Str(text));
    }

    fn finish_punct(&mut self, token_type: TokenType, size: usize) {
        self.state.pos += size;
        self.finish_token(token_type, TokenValue::None);
    }

    /// Whether a `{` after `prev_type` opens a block.
    fn brace_is_block(&self, prev_type: TokenType) -> bool {
        let parent = self.cur_context();
        match prev_type {
            TokenType::Colon if matches!(parent, Context::BraceStatement | Context::BraceExpression) => {
                !parent.is_expr()
            }
            TokenType::Return => self.has_line_break(self.state.last_tok_end, self.state.start),
            TokenType::Else | TokenType::Semi | TokenType::Eof | TokenType::ParenR => true,
            TokenType::BraceL => parent == Context::BraceStatement,
            _ => !self.state.expr_allowed,
        }
    }

    /// Whether the source between two offsets contains a line terminator.
    pub fn has_line_break(&self, from: usize, to: usize) -> bool {
        let Some(text) = self.input.get(from..to) else {
            return false;
        };
        text.bytes().any(|b| b == b'\n' || b == b'\r') || text.contains(LINE_SEPARATOR) || text.contains(PARAGRAPH_SEPARATOR)
    }

    /// Whether only horizontal whitespace separates `pos` from a line break.
    fn line_break_follows(&self, pos: usize) -> bool {
        self.input[pos..]
            .chars()
            .find(|&ch| !is_white_space_single_line(ch))
            .is_some_and(is_line_break)
    }

    /// Maintain the context stack and `expr_allowed` after a token.
    fn update_context(&mut self, prev_type: TokenType) {
        let token_type = self.state.token_type;
        if token_type.is_keyword() && prev_type == TokenType::Dot {
            self.state.expr_allowed = false;
            return;
        }
        match token_type {
            TokenType::ParenR | TokenType::BraceR => {
                if self.state.context.len() == 1 {
                    self.state.expr_allowed = true;
                    return;
                }
                let out = self.state.context.pop().unwrap_or(Context::BraceStatement);
                if out == Context::BraceStatement && self.cur_context() == Context::FunctionExpression {
                    self.state.context.pop();
                    self.state.expr_allowed = false;
                } else if out == Context::TemplateQuasi {
                    self.state.expr_allowed = true;
                } else {
                    self.state.expr_allowed = !out.is_expr();
                }
            }
            TokenType::Name => {
                self.state.expr_allowed = matches!(prev_type, TokenType::Let | TokenType::Const | TokenType::Var)
                    && self.line_break_follows(self.state.end);
            }
            TokenType::BraceL => {
                let frame = match self.cur_context() {
                    Context::JsxOpenTag => Context::BraceExpression,
                    Context::JsxExpression => Context::TemplateQuasi,
                    _ if self.brace_is_block(prev_type) => Context::BraceStatement,
                    _ => Context::BraceExpression,
                };
                self.state.context.push(frame);
                self.state.expr_allowed = true;
            }
            TokenType::DollarBraceL => {
                self.state.context.push(Context::TemplateQuasi);
                self.state.expr_allowed = true;
            }
            TokenType::ParenL => {
                let statement_parens = matches!(
                    prev_type,
                    TokenType::If | TokenType::For | TokenType::With | TokenType::While
                );
                self.state.context.push(if statement_parens {
                    Context::ParenStatement
                } else {
                    Context::ParenExpression
                });
                self.state.expr_allowed = true;
            }
            TokenType::IncDec => {}
            TokenType::Function => {
                if self.cur_context() != Context::BraceStatement {
                    self.state.context.push(Context::FunctionExpression);
                }
                self.state.expr_allowed = false;
            }
            TokenType::BackQuote => {
                if self.cur_context() == Context::Template {
                    self.state.context.pop();
                } else {
                    self.state.context.push(Context::Template);
                }
                self.state.expr_allowed = false;
            }
            TokenType::JsxTagStart => {
                self.state.context.push(Context::JsxExpression);
                self.state.context.push(Context::JsxOpenTag);
                self.state.expr_allowed = false;
            }
            TokenType::JsxTagEnd => {
                let out = self.state.context.pop();
                if (out == Some(Context::JsxOpenTag) && prev_type == TokenType::Slash) || out == Some(Context::JsxCloseTag) {
                    self.state.context.pop();
                    self.state.expr_allowed = self.cur_context() == Context::JsxExpression;
                } else {
                    self.state.expr_allowed = true;
                }
            }
            TokenType::Slash if prev_type == TokenType::JsxTagStart => {
                // `</` turns the tag into a closing tag.
                let len = self.state.context.len().saturating_sub(2).max(1);
                self.state.context.truncate(len);
                self.state.context.push(Context::JsxCloseTag);
                self.state.expr_allowed = false;
            }
            _ => self.state.expr_allowed = token_type.before_expr(),
        }
    }

    // ========================================================================
    // Token reading
    // ========================================================================

    /// Read a token starting with `ch` using the base grammar.
    pub fn read_token(&mut self, ch: char) -> LexResult<()> {
        if is_identifier_start(ch) || ch == '\\' {
            self.read_word()
        } else {
            self.get_token_from_code(ch)
        }
    }

    /// Read a punctuator, operator, number or string starting with `ch`.
    pub fn get_token_from_code(&mut self, ch: char) -> LexResult<()> {
        let pos = self.state.pos;
        match ch {
            '.' => return self.read_token_dot(),
            '(' => self.finish_punct(TokenType::ParenL, 1),
            ')' => self.finish_punct(TokenType::ParenR, 1),
            ';' => self.finish_punct(TokenType::Semi, 1),
            ',' => self.finish_punct(TokenType::Comma, 1),
            '[' => self.finish_punct(TokenType::BracketL, 1),
            ']' => self.finish_punct(TokenType::BracketR, 1),
            '{' => self.finish_punct(TokenType::BraceL, 1),
            '}' => self.finish_punct(TokenType::BraceR, 1),
            ':' if self.options.double_colon && self.byte_at(pos + 1) == b':' => {
                self.finish_op(TokenType::DoubleColon, 2)
            }
            ':' => self.finish_punct(TokenType::Colon, 1),
            '?' => self.finish_punct(TokenType::Question, 1),
            '@' => self.finish_punct(TokenType::At, 1),
            '`' => self.finish_punct(TokenType::BackQuote, 1),
            '0' => {
                return match self.byte_at(pos + 1) {
                    b'x' | b'X' => self.read_radix_number(16),
                    b'o' | b'O' => self.read_radix_number(8),
                    b'b' | b'B' => self.read_radix_number(2),
                    _ => self.read_number(false),
                }
            }
            '1'..='9' => return self.read_number(false),
            '"' | '\'' => return self.read_string(ch as u8),
            '/' => return self.read_token_slash(),
            '%' | '*' => self.read_token_mult_modulo(ch),
            '|' | '&' => self.read_token_pipe_amp(ch),
            '^' => self.read_token_caret(),
            '+' | '-' => self.read_token_plus_min(ch),
            '<' | '>' => self.read_token_lt_gt(ch),
            '=' | '!' => self.read_token_eq_excl(ch),
            '~' => self.finish_op(TokenType::Prefix, 1),
            _ => return Err(self.error(pos, &messages::UNEXPECTED_CHARACTER, &[&ch.to_string()])),
        }
        Ok(())
    }

    fn read_token_dot(&mut self) -> LexResult<()> {
        let next = self.byte_at(self.state.pos + 1);
        if next.is_ascii_digit() {
            return self.read_number(true);
        }
        if next == b'.' && self.byte_at(self.state.pos + 2) == b'.' {
            self.finish_punct(TokenType::Ellipsis, 3);
        } else {
            self.finish_punct(TokenType::Dot, 1);
        }
        Ok(())
    }

    fn read_token_slash(&mut self) -> LexResult<()> {
        if self.state.expr_allowed {
            self.state.pos += 1;
            return self.read_regexp();
        }
        if self.byte_at(self.state.pos + 1) == b'=' {
            self.finish_op(TokenType::Assign, 2);
        } else {
            self.finish_op(TokenType::Slash, 1);
        }
        Ok(())
    }

    fn read_token_mult_modulo(&mut self, ch: char) {
        let mut token_type = if ch == '*' { TokenType::Star } else { TokenType::Modulo };
        let mut width = 1;
        let mut next = self.byte_at(self.state.pos + 1);
        if ch == '*' && next == b'*' {
            width += 1;
            next = self.byte_at(self.state.pos + 2);
            token_type = TokenType::Exponent;
        }
        if next == b'=' {
            width += 1;
            token_type = TokenType::Assign;
        }
        self.finish_op(token_type, width);
    }

    fn read_token_pipe_amp(&mut self, ch: char) {
        let next = self.byte_at(self.state.pos + 1);
        if next == ch as u8 {
            let token_type = if ch == '|' { TokenType::LogicalOr } else { TokenType::LogicalAnd };
            return self.finish_op(token_type, 2);
        }
        if next == b'=' {
            return self.finish_op(TokenType::Assign, 2);
        }
        let token_type = if ch == '|' { TokenType::BitwiseOr } else { TokenType::BitwiseAnd };
        self.finish_op(token_type, 1);
    }

    fn read_token_caret(&mut self) {
        if self.byte_at(self.state.pos + 1) == b'=' {
            self.finish_op(TokenType::Assign, 2);
        } else {
            self.finish_op(TokenType::BitwiseXor, 1);
        }
    }

    fn read_token_plus_min(&mut self, ch: char) {
        let next = self.byte_at(self.state.pos + 1);
        if next == ch as u8 {
            self.finish_op(TokenType::IncDec, 2);
        } else if next == b'=' {
            self.finish_op(TokenType::Assign, 2);
        } else {
            self.finish_op(TokenType::PlusMin, 1);
        }
    }

    fn read_token_lt_gt(&mut self, ch: char) {
        let pos = self.state.pos;
        let next = self.byte_at(pos + 1);
        if next == ch as u8 {
            let size = if ch == '>' && self.byte_at(pos + 2) == b'>' { 3 } else { 2 };
            if self.byte_at(pos + size) == b'=' {
                return self.finish_op(TokenType::Assign, size + 1);
            }
            return self.finish_op(TokenType::BitShift, size);
        }
        let size = if next == b'=' { 2 } else { 1 };
        self.finish_op(TokenType::Relational, size);
    }

    fn read_token_eq_excl(&mut self, ch: char) {
        let pos = self.state.pos;
        let next = self.byte_at(pos + 1);
        if next == b'=' {
            let size = if self.byte_at(pos + 2) == b'=' { 3 } else { 2 };
            return self.finish_op(TokenType::Equality, size);
        }
        if ch == '=' && next == b'>' {
            return self.finish_punct(TokenType::Arrow, 2);
        }
        self.finish_op(if ch == '=' { TokenType::Eq } else { TokenType::Prefix }, 1);
    }

    fn read_regexp(&mut self) -> LexResult<()> {
        let start = self.state.pos;
        let mut escaped = false;
        let mut in_class = false;
        loop {
            let ch = match self.char_at(self.state.pos) {
                Some(ch) if !is_line_break(ch) => ch,
                _ => return Err(self.error(start, &messages::UNTERMINATED_REGEXP, &[])),
            };
            if escaped {
                escaped = false;
            } else {
                if ch == '[' {
                    in_class = true;
                } else if ch == ']' && in_class {
                    in_class = false;
                } else if ch == '/' && !in_class {
                    break;
                }
                escaped = ch == '\\';
            }
            self.state.pos += ch.len_utf8();
        }
        let pattern = &self.input[start..self.state.pos];
        self.state.pos += 1;
        let flags = self.read_word1()?;
        if !flags.chars().all(|flag| "gmsiyu".contains(flag)) {
            return Err(self.error(start, &messages::INVALID_REGEXP_FLAG, &[]));
        }
        self.finish_token(TokenType::Regexp, TokenValue::Regex { pattern, flags });
        Ok(())
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    /// Read digits in `radix`. Returns `None` if no digits were read, or if
    /// `len` is given and a different number of digits was read.
    fn read_int(&mut self, radix: u32, len: Option<usize>) -> Option<f64> {
        let start = self.state.pos;
        let limit = len.unwrap_or(usize::MAX);
        let mut total = 0f64;
        let mut count = 0;
        while count < limit {
            let Some(value) = digit_value(self.byte_at(self.state.pos)) else {
                break;
            };
            if value >= radix {
                break;
            }
            self.state.pos += 1;
            total = total * radix as f64 + value as f64;
            count += 1;
        }
        if self.state.pos == start || len.is_some_and(|len| self.state.pos - start != len) {
            return None;
        }
        Some(total)
    }

    fn read_radix_number(&mut self, radix: u32) -> LexResult<()> {
        self.state.pos += 2;
        let value = self
            .read_int(radix, None)
            .ok_or_else(|| self.error(self.state.start + 2, &messages::EXPECTED_NUMBER_IN_RADIX, &[&radix.to_string()]))?;
        if self.char_at(self.state.pos).is_some_and(is_identifier_start) {
            return Err(self.error(self.state.pos, &messages::IDENTIFIER_AFTER_NUMBER, &[]));
        }
        self.finish_token(TokenType::Num, TokenValue::Num(value));
        Ok(())
    }

    /// Read an integer, legacy octal integer or floating-point number.
    fn read_number(&mut self, starts_with_dot: bool) -> LexResult<()> {
        let start = self.state.pos;
        let mut is_float = false;
        let octal = self.byte_at(start) == b'0';
        if !starts_with_dot && self.read_int(10, None).is_none() {
            return Err(self.error(start, &messages::INVALID_NUMBER, &[]));
        }
        let mut next = self.byte_at(self.state.pos);
        if next == b'.' {
            self.state.pos += 1;
            self.read_int(10, None);
            is_float = true;
            next = self.byte_at(self.state.pos);
        }
        if next == b'e' || next == b'E' {
            self.state.pos += 1;
            if matches!(self.byte_at(self.state.pos), b'+' | b'-') {
                self.state.pos += 1;
            }
            if self.read_int(10, None).is_none() {
                return Err(self.error(start, &messages::INVALID_NUMBER, &[]));
            }
            is_float = true;
        }
        if self.char_at(self.state.pos).is_some_and(is_identifier_start) {
            return Err(self.error(self.state.pos, &messages::IDENTIFIER_AFTER_NUMBER, &[]));
        }

        let text = &self.input[start..self.state.pos];
        let legacy_octal = !is_float && octal && text.len() > 1;
        if legacy_octal && (self.state.strict || text.bytes().any(|b| b == b'8' || b == b'9')) {
            return Err(self.error(start, &messages::INVALID_NUMBER, &[]));
        }
        let value = if legacy_octal {
            text.bytes().fold(0f64, |acc, b| acc * 8.0 + (b - b'0') as f64)
        } else {
            text.parse::<f64>()
                .map_err(|_| self.error(start, &messages::INVALID_NUMBER, &[]))?
        };
        self.finish_token(TokenType::Num, TokenValue::Num(value));
        Ok(())
    }

    // ========================================================================
    // Strings, templates and escapes
    // ========================================================================

    /// Read `\u{...}` or `\uXXXX` digits; the `\u` is already consumed.
    fn read_code_point(&mut self) -> LexResult<u32> {
        if self.byte_at(self.state.pos) == b'{' {
            self.state.pos += 1;
            let code_pos = self.state.pos;
            let len = self.input[code_pos..]
                .find('}')
                .ok_or_else(|| self.error(code_pos, &messages::BAD_ESCAPE, &[]))?;
            let code = self
                .read_int(16, Some(len))
                .ok_or_else(|| self.error(code_pos, &messages::BAD_ESCAPE, &[]))?;
            self.state.pos += 1;
            if code > 0x10FFFF as f64 {
                return Err(self.error(code_pos, &messages::CODE_POINT_OUT_OF_BOUNDS, &[]));
            }
            Ok(code as u32)
        } else {
            self.read_hex_char(4)
        }
    }

    fn read_hex_char(&mut self, len: usize) -> LexResult<u32> {
        let code_pos = self.state.pos;
        self.read_int(16, Some(len))
            .map(|code| code as u32)
            .ok_or_else(|| self.error(code_pos, &messages::BAD_ESCAPE, &[]))
    }

    /// Read a `\u` escape in a string, pairing UTF-16 surrogates when a low
    /// surrogate escape follows a high one. Lone surrogates decode to U+FFFD.
    fn read_unicode_escape(&mut self) -> LexResult<char> {
        let code = self.read_code_point()?;
        if (0xD800..=0xDBFF).contains(&code) && self.input[self.state.pos..].starts_with("\\u") {
            let saved = self.state.pos;
            self.state.pos += 2;
            match self.read_code_point() {
                Ok(low) => {
                    if let Some(pair) = combine_surrogates(code, low) {
                        return Ok(char::from_u32(pair).unwrap_or(REPLACEMENT_CHARACTER));
                    }
                    self.state.pos = saved;
                }
                Err(_) => self.state.pos = saved,
            }
        }
        Ok(char::from_u32(code).unwrap_or(REPLACEMENT_CHARACTER))
    }

    /// Decode the escape sequence at the backslash and append it to `out`.
    fn read_escaped_char(&mut self, in_template: bool, out: &mut String) -> LexResult<()> {
        self.state.pos += 1;
        let Some(ch) = self.char_at(self.state.pos) else {
            return Ok(());
        };
        self.state.pos += ch.len_utf8();
        match ch {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{0008}'),
            'v' => out.push('\u{000B}'),
            'f' => out.push('\u{000C}'),
            'x' => {
                let code = self.read_hex_char(2)?;
                out.push(char::from_u32(code).unwrap_or(REPLACEMENT_CHARACTER));
            }
            'u' => out.push(self.read_unicode_escape()?),
            '\r' => {
                if self.byte_at(self.state.pos) == b'\n' {
                    self.state.pos += 1;
                }
                self.new_line();
            }
            '\n' | LINE_SEPARATOR | PARAGRAPH_SEPARATOR => self.new_line(),
            '0'..='7' => {
                let digits_start = self.state.pos - 1;
                let bytes = self.input.as_bytes();
                let mut len = bytes[digits_start..]
                    .iter()
                    .take(3)
                    .take_while(|b| matches!(b, b'0'..=b'7'))
                    .count();
                let parse = |len: usize| {
                    bytes[digits_start..digits_start + len]
                        .iter()
                        .fold(0u32, |acc, b| acc * 8 + (b - b'0') as u32)
                };
                let mut octal = parse(len);
                if octal > 255 {
                    len -= 1;
                    octal = parse(len);
                }
                if octal > 0 {
                    if !self.state.contains_octal {
                        self.state.contains_octal = true;
                        self.state.octal_position = Some(digits_start - 1);
                    }
                    if self.state.strict || in_template {
                        return Err(self.error(digits_start - 1, &messages::OCTAL_IN_STRICT, &[]));
                    }
                }
                self.state.pos += len - 1;
                out.push(char::from_u32(octal).unwrap_or(REPLACEMENT_CHARACTER));
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn read_string(&mut self, quote: u8) -> LexResult<()> {
        let mut out = String::new();
        let mut escaped = false;
        self.state.pos += 1;
        let mut chunk_start = self.state.pos;
        loop {
            let pos = self.state.pos;
            let Some(&byte) = self.input.as_bytes().get(pos) else {
                return Err(self.error(self.state.start, &messages::UNTERMINATED_STRING, &[]));
            };
            if byte == quote {
                break;
            }
            if byte == b'\\' {
                out.push_str(&self.input[chunk_start..pos]);
                self.read_escaped_char(false, &mut out)?;
                escaped = true;
                chunk_start = self.state.pos;
            } else if byte == b'\n' || byte == b'\r' || self.is_unicode_line_break_at(pos) {
                return Err(self.error(self.state.start, &messages::UNTERMINATED_STRING, &[]));
            } else {
                self.state.pos += 1;
            }
        }
        let value = if escaped {
            out.push_str(&self.input[chunk_start..self.state.pos]);
            alloc_str_in(self.arena, &out)
        } else {
            &self.input[chunk_start..self.state.pos]
        };
        self.state.pos += 1;
        self.finish_token(TokenType::String, TokenValue::Str(value));
        Ok(())
    }

    /// Read a template chunk, or the `${` / `` ` `` that ends one.
    pub fn read_tmpl_token(&mut self) -> LexResult<()> {
        let mut out = String::new();
        let mut chunk_start = self.state.pos;
        loop {
            let pos = self.state.pos;
            let Some(&byte) = self.input.as_bytes().get(pos) else {
                return Err(self.error(self.state.start, &messages::UNTERMINATED_TEMPLATE, &[]));
            };
            if byte == b'`' || (byte == b'$' && self.byte_at(pos + 1) == b'{') {
                if pos == self.state.start && self.state.token_type == TokenType::Template {
                    if byte == b'$' {
                        self.finish_punct(TokenType::DollarBraceL, 2);
                    } else {
                        self.finish_punct(TokenType::BackQuote, 1);
                    }
                    return Ok(());
                }
                out.push_str(&self.input[chunk_start..pos]);
                let cooked = alloc_str_in(self.arena, &out);
                self.finish_token(TokenType::Template, TokenValue::Str(cooked));
                return Ok(());
            }
            if byte == b'\\' {
                out.push_str(&self.input[chunk_start..pos]);
                self.read_escaped_char(true, &mut out)?;
                chunk_start = self.state.pos;
            } else if byte == b'\r' || byte == b'\n' {
                out.push_str(&self.input[chunk_start..pos]);
                self.state.pos += 1;
                if byte == b'\r' && self.byte_at(self.state.pos) == b'\n' {
                    self.state.pos += 1;
                }
                out.push('\n');
                self.new_line();
                chunk_start = self.state.pos;
            } else if self.is_unicode_line_break_at(pos) {
                self.state.pos += 3;
                self.new_line();
            } else {
                self.state.pos += 1;
            }
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    /// Read an identifier name, decoding `\u` escapes. Sets
    /// `state.contains_esc`.
    pub fn read_word1(&mut self) -> LexResult<&'a str> {
        self.state.contains_esc = false;
        let mut decoded: Option<String> = None;
        let mut first = true;
        let mut chunk_start = self.state.pos;
        while let Some(ch) = self.char_at(self.state.pos) {
            if is_identifier_char(ch) {
                self.state.pos += ch.len_utf8();
            } else if ch == '\\' {
                self.state.contains_esc = true;
                let word = decoded.get_or_insert_with(String::new);
                word.push_str(&self.input[chunk_start..self.state.pos]);
                let esc_start = self.state.pos;
                self.state.pos += 1;
                if self.byte_at(self.state.pos) != b'u' {
                    return Err(self.error(self.state.pos, &messages::EXPECTING_UNICODE_ESCAPE, &[]));
                }
                self.state.pos += 1;
                let esc = self.read_code_point()?;
                let valid = if first {
                    is_identifier_start_code(esc)
                } else {
                    is_identifier_char_code(esc)
                };
                match char::from_u32(esc) {
                    Some(decoded_ch) if valid => word.push(decoded_ch),
                    _ => return Err(self.error(esc_start, &messages::INVALID_UNICODE_ESCAPE, &[])),
                }
                chunk_start = self.state.pos;
            } else {
                break;
            }
            first = false;
        }
        let rest = &self.input[chunk_start..self.state.pos];
        Ok(match decoded {
            Some(mut word) => {
                word.push_str(rest);
                alloc_str_in(self.arena, &word)
            }
            None => rest,
        })
    }

    /// Read an identifier or keyword token.
    fn read_word(&mut self) -> LexResult<()> {
        let word = self.read_word1()?;
        let token_type = if self.state.contains_esc {
            TokenType::Name
        } else {
            TokenType::from_keyword(word).unwrap_or(TokenType::Name)
        };
        self.finish_token(token_type, TokenValue::Str(word));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexer<'a>(arena: &'a Bump, source: &'a str) -> Lexer<'a> {
        let mut lexer = Lexer::new(arena, source, LexerOptions::default());
        lexer.next_token().unwrap();
        lexer
    }

    #[test]
    fn test_read_int_respects_length() {
        let arena = Bump::new();
        let mut lexer = Lexer::new(&arena, "12ab", LexerOptions::default());
        assert_eq!(lexer.read_int(16, Some(3)), Some(0x12a as f64));
        lexer.state.pos = 0;
        assert_eq!(lexer.read_int(10, Some(3)), None);
    }

    #[test]
    fn test_lookahead_leaves_state() {
        let arena = Bump::new();
        let mut lexer = lexer(&arena, "a b");
        let ahead = lexer.lookahead().unwrap();
        assert_eq!(ahead.value.as_str(), "b");
        assert_eq!(lexer.state.value.as_str(), "a");
        assert!(lexer.tokens().is_empty());
    }

    #[test]
    fn test_set_strict_rescans_number() {
        let arena = Bump::new();
        let mut lexer = lexer(&arena, "010");
        assert_eq!(lexer.state.value.as_num(), Some(8.0));
        let err = lexer.set_strict(true).unwrap_err();
        assert_eq!(err.message, "Invalid number");
        assert_eq!(err.pos, 0);
    }

    #[test]
    fn test_error_position_uses_line_map() {
        let arena = Bump::new();
        let lexer = Lexer::new(&arena, "a\nbc", LexerOptions::default());
        let err = lexer.error(3, &messages::UNEXPECTED_TOKEN, &[]);
        assert_eq!(err.loc, Position::new(2, 1));
    }
}
