//! esparse_parser: Recursive descent parser for ECMAScript.
//!
//! Turns source text into an arena-allocated AST with Babylon-shaped node
//! types, positions, comments and a token list. The base grammar covers
//! ES2017; JSX, flow annotations and proposal syntax are opt-in through the
//! `plugins` option.
//!
//! ```ignore
//! let arena = bumpalo::Bump::new();
//! let file = esparse_parser::parse(&arena, "let x = 1;", &ParserOptions::default())?;
//! ```

mod comments;
mod expression;
pub mod extension;
mod lval;
pub mod options;
mod parser;
pub mod plugins;
mod statement;

use bumpalo::Bump;
use esparse_ast::{Comment, File, Token};
use esparse_diagnostics::SyntaxError;

pub use comments::attach_comments;
pub use extension::{Chain, ExtensionSet, SyntaxExtension};
pub use options::{ParserOptions, DEFAULT_MAX_NESTING_DEPTH};
pub use parser::{Marked, NodeStart, PResult, Parser, ParserState};

/// Receives the tokens and comments of a successful parse.
///
/// Both callbacks are invoked in source order, interleaved by start offset.
#[allow(unused_variables)]
pub trait ParseObserver {
    fn on_token(&mut self, token: &Token<'_>) {}
    fn on_comment(&mut self, comment: &Comment<'_>) {}
}

/// Parse `source` as a complete program.
pub fn parse<'a>(arena: &'a Bump, source: &'a str, options: &ParserOptions) -> Result<File<'a>, SyntaxError> {
    Parser::new(arena, source, options).parse()
}

/// Parse `source` and report its tokens and comments to `observer`.
pub fn parse_with_observer<'a>(
    arena: &'a Bump,
    source: &'a str,
    options: &ParserOptions,
    observer: &mut dyn ParseObserver,
) -> Result<File<'a>, SyntaxError> {
    let file = parse(arena, source, options)?;
    let mut comments = file.comments.iter().peekable();
    for token in file.tokens {
        while let Some(comment) = comments.next_if(|comment| comment.start < token.start) {
            observer.on_comment(comment);
        }
        observer.on_token(token);
    }
    for comment in comments {
        observer.on_comment(comment);
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ParseObserver for Recorder {
        fn on_token(&mut self, token: &Token<'_>) {
            self.events.push(format!("token@{}", token.start));
        }

        fn on_comment(&mut self, comment: &Comment<'_>) {
            self.events.push(format!("comment@{}", comment.start));
        }
    }

    #[test]
    fn test_observer_sees_source_order() {
        let arena = Bump::new();
        let mut recorder = Recorder::default();
        parse_with_observer(&arena, "a /* b */ + c // d", &ParserOptions::default(), &mut recorder).unwrap();
        assert_eq!(
            recorder.events,
            vec!["token@0", "comment@2", "token@10", "token@12", "comment@14", "token@18"]
        );
    }
}
