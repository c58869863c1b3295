//! esparse_lexer: Lexer/tokenizer for ECMAScript source code.
//!
//! Produces tokens on demand with support for:
//! - All ES2017 punctuators, keywords and literals
//! - Context-sensitive regular expression and block detection
//! - Template literals
//! - JSX children, names and attribute strings
//! - Unicode identifiers and escapes

mod char_codes;
mod context;
mod jsx;
mod lexer;

pub use char_codes::{is_identifier_char, is_identifier_start, is_line_break};
pub use context::{Context, ContextStack};
pub use esparse_ast::{Token, TokenType, TokenValue};
pub use lexer::{LexResult, Lexer, LexerOptions, LexerState};

use bumpalo::Bump;
use esparse_ast::Comment;

/// Tokenize a whole input without a parser.
///
/// The returned token list ends with the end-of-file token. Without a parser
/// the context stack only sees the base grammar, so extension syntax such as
/// JSX is not recognised.
pub fn tokenize<'a>(
    arena: &'a Bump,
    input: &'a str,
    options: LexerOptions,
) -> LexResult<(Vec<Token<'a>>, Vec<Comment<'a>>)> {
    let mut lexer = Lexer::new(arena, input, options);
    lexer.skip_shebang();
    lexer.next_token()?;
    while lexer.state.token_type != TokenType::Eof {
        lexer.next()?;
    }
    lexer.record_token();
    Ok(lexer.finish())
}
