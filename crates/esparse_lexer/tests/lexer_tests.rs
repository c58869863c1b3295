//! Lexer integration tests.
//!
//! Verifies that the lexer correctly tokenizes ECMAScript constructs without
//! a parser driving it.

use bumpalo::Bump;
use esparse_ast::CommentKind;
use esparse_core::text::Position;
use esparse_lexer::{tokenize, LexerOptions, TokenType, TokenValue};

/// Helper: tokenize and return the token types, without the final EOF.
fn scan_types(source: &str) -> Vec<TokenType> {
    let arena = Bump::new();
    let (tokens, _) = tokenize(&arena, source, LexerOptions::default()).unwrap();
    let mut types: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();
    assert_eq!(types.pop(), Some(TokenType::Eof));
    types
}

/// Helper: tokenize and return the numeric values.
fn scan_numbers(source: &str) -> Vec<f64> {
    let arena = Bump::new();
    let (tokens, _) = tokenize(&arena, source, LexerOptions::default()).unwrap();
    tokens.iter().filter_map(|t| t.value.as_num()).collect()
}

/// Helper: the cooked value of the single string token in `source`.
fn scan_string(source: &str) -> String {
    let arena = Bump::new();
    let (tokens, _) = tokenize(&arena, source, LexerOptions::default()).unwrap();
    assert_eq!(tokens[0].token_type, TokenType::String);
    tokens[0].value.as_str().to_string()
}

/// Helper: the error message and offset for a source that fails to lex.
fn scan_error(source: &str) -> (String, u32) {
    let arena = Bump::new();
    let err = tokenize(&arena, source, LexerOptions::default()).unwrap_err();
    (err.message, err.pos)
}

#[test]
fn test_empty_source() {
    assert!(scan_types("").is_empty());
    assert!(scan_types("   \n\t  ").is_empty());
}

#[test]
fn test_numeric_literals() {
    assert_eq!(
        scan_numbers("42 3.14 .5 0xFF 0b1010 0o17 1e3 2E-1"),
        vec![42.0, 3.14, 0.5, 255.0, 10.0, 15.0, 1000.0, 0.2]
    );
}

#[test]
fn test_legacy_octal_numbers() {
    assert_eq!(scan_numbers("010 0 07 09.5 08e1"), vec![8.0, 0.0, 7.0, 9.5, 80.0]);
    assert_eq!(scan_error("08"), ("Invalid number".to_string(), 0));
    assert_eq!(scan_error("x = 09"), ("Invalid number".to_string(), 4));
    assert_eq!(scan_error("0189"), ("Invalid number".to_string(), 0));
    let arena = Bump::new();
    let strict = LexerOptions {
        strict: true,
        ..LexerOptions::default()
    };
    let err = tokenize(&arena, "x = 010", strict).unwrap_err();
    assert_eq!(err.message, "Invalid number");
    assert_eq!(err.pos, 4);
}

#[test]
fn test_number_errors() {
    assert_eq!(scan_error("1a"), ("Identifier directly after number".to_string(), 1));
    assert_eq!(scan_error("0x"), ("Expected number in radix 16".to_string(), 2));
    assert_eq!(scan_error("1e+"), ("Invalid number".to_string(), 0));
}

#[test]
fn test_string_escapes() {
    assert_eq!(scan_string(r"'a\nb'"), "a\nb");
    assert_eq!(scan_string(r#""\x41\t""#), "A\t");
    assert_eq!(scan_string(r#""\u{1F600}""#), "\u{1F600}");
    assert_eq!(scan_string(r#""😀""#), "\u{1F600}");
    assert_eq!(scan_string(r#""\uD800x""#), "\u{FFFD}x");
    assert_eq!(scan_string("'a\\\nb'"), "ab");
    assert_eq!(scan_string(r"'\101'"), "A");
}

#[test]
fn test_string_errors() {
    assert_eq!(scan_error("'abc"), ("Unterminated string constant".to_string(), 0));
    assert_eq!(scan_error("x = 'a\nb'"), ("Unterminated string constant".to_string(), 4));
    assert_eq!(scan_error(r#""\u{110000}""#), ("Code point out of bounds".to_string(), 4));
    assert_eq!(scan_error(r#""\xZ1""#), ("Bad character escape sequence".to_string(), 3));
}

#[test]
fn test_octal_escape_in_strict_mode() {
    let arena = Bump::new();
    let strict = LexerOptions {
        strict: true,
        ..LexerOptions::default()
    };
    let err = tokenize(&arena, r"'\07'", strict).unwrap_err();
    assert_eq!(err.message, "Octal literal in strict mode");
    assert_eq!(err.pos, 1);
}

#[test]
fn test_regex_versus_division() {
    assert_eq!(
        scan_types("a / b / g"),
        vec![TokenType::Name, TokenType::Slash, TokenType::Name, TokenType::Slash, TokenType::Name]
    );

    let arena = Bump::new();
    let (tokens, _) = tokenize(&arena, "x = /ab+[/]c/gi", LexerOptions::default()).unwrap();
    assert_eq!(tokens[2].token_type, TokenType::Regexp);
    assert_eq!(
        tokens[2].value,
        TokenValue::Regex {
            pattern: "ab+[/]c",
            flags: "gi"
        }
    );
}

#[test]
fn test_regex_after_statement_parens() {
    assert_eq!(
        scan_types("if (x) /y/.test(z)"),
        vec![
            TokenType::If,
            TokenType::ParenL,
            TokenType::Name,
            TokenType::ParenR,
            TokenType::Regexp,
            TokenType::Dot,
            TokenType::Name,
            TokenType::ParenL,
            TokenType::Name,
            TokenType::ParenR,
        ]
    );
}

#[test]
fn test_brace_classification() {
    // An object literal in parentheses is followed by division.
    assert_eq!(
        scan_types("({}) / 2"),
        vec![
            TokenType::ParenL,
            TokenType::BraceL,
            TokenType::BraceR,
            TokenType::ParenR,
            TokenType::Slash,
            TokenType::Num,
        ]
    );
    // A block statement is followed by a regular expression.
    assert_eq!(
        scan_types("{}\n/foo/"),
        vec![TokenType::BraceL, TokenType::BraceR, TokenType::Regexp]
    );
}

#[test]
fn test_regex_errors() {
    assert_eq!(scan_error("/abc"), ("Unterminated regular expression".to_string(), 1));
    assert_eq!(scan_error("/a/z"), ("Invalid regular expression flag".to_string(), 1));
}

#[test]
fn test_template_tokens() {
    let arena = Bump::new();
    let (tokens, _) = tokenize(&arena, "`a${b}c`", LexerOptions::default()).unwrap();
    let types: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();
    assert_eq!(
        types,
        vec![
            TokenType::BackQuote,
            TokenType::Template,
            TokenType::DollarBraceL,
            TokenType::Name,
            TokenType::BraceR,
            TokenType::Template,
            TokenType::BackQuote,
            TokenType::Eof,
        ]
    );
    assert_eq!(tokens[1].value.as_str(), "a");
    assert_eq!(tokens[5].value.as_str(), "c");

    assert_eq!(
        scan_types("``"),
        vec![TokenType::BackQuote, TokenType::Template, TokenType::BackQuote]
    );
    assert_eq!(scan_error("`abc"), ("Unterminated template".to_string(), 1));
}

#[test]
fn test_template_cooks_crlf() {
    let arena = Bump::new();
    let (tokens, _) = tokenize(&arena, "`a\r\nb`", LexerOptions::default()).unwrap();
    assert_eq!(tokens[1].value.as_str(), "a\nb");
    assert_eq!(tokens[2].loc.start, Position::new(2, 1));
}

#[test]
fn test_operators() {
    let arena = Bump::new();
    let (tokens, _) = tokenize(&arena, "a **= 2 ** 3 >>>= 1 === b", LexerOptions::default()).unwrap();
    let pairs: Vec<(TokenType, &str)> = tokens.iter().map(|t| (t.token_type, t.value.as_str())).collect();
    assert_eq!(pairs[1], (TokenType::Assign, "**="));
    assert_eq!(pairs[3], (TokenType::Exponent, "**"));
    assert_eq!(pairs[5], (TokenType::Assign, ">>>="));
    assert_eq!(pairs[7], (TokenType::Equality, "==="));
}

#[test]
fn test_double_colon_requires_option() {
    assert_eq!(
        scan_types("a::b"),
        vec![TokenType::Name, TokenType::Colon, TokenType::Colon, TokenType::Name]
    );
    let arena = Bump::new();
    let options = LexerOptions {
        double_colon: true,
        ..LexerOptions::default()
    };
    let (tokens, _) = tokenize(&arena, "a::b", options).unwrap();
    assert_eq!(tokens[1].token_type, TokenType::DoubleColon);
}

#[test]
fn test_comments_are_collected() {
    let arena = Bump::new();
    let (tokens, comments) = tokenize(&arena, "a /* x */ b // y\nc", LexerOptions::default()).unwrap();
    assert_eq!(tokens.len(), 4);
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].kind, CommentKind::Block);
    assert_eq!(comments[0].value, " x ");
    assert_eq!((comments[0].start, comments[0].end), (2, 9));
    assert_eq!(comments[1].kind, CommentKind::Line);
    assert_eq!(comments[1].value, " y");
    assert_eq!(tokens[2].loc.start, Position::new(2, 0));
}

#[test]
fn test_unterminated_comment() {
    assert_eq!(scan_error("a /* x"), ("Unterminated comment".to_string(), 2));
}

#[test]
fn test_html_comments() {
    assert_eq!(scan_types("a\n--> note\nb"), vec![TokenType::Name, TokenType::Name]);
    assert_eq!(scan_types("<!-- note\nb"), vec![TokenType::Name]);

    let arena = Bump::new();
    let module = LexerOptions {
        module: true,
        ..LexerOptions::default()
    };
    assert!(tokenize(&arena, "<!-- note\nb", module).is_err());
}

#[test]
fn test_shebang_is_a_comment() {
    let arena = Bump::new();
    let (tokens, comments) = tokenize(&arena, "#!/usr/bin/env node\nx", LexerOptions::default()).unwrap();
    assert_eq!(comments[0].value, "/usr/bin/env node");
    assert_eq!(tokens[0].value.as_str(), "x");
}

#[test]
fn test_identifiers_and_keywords() {
    let arena = Bump::new();
    let (tokens, _) = tokenize(&arena, r"if \u0069f café $_x", LexerOptions::default()).unwrap();
    assert_eq!(tokens[0].token_type, TokenType::If);
    assert_eq!(tokens[1].token_type, TokenType::Name);
    assert_eq!(tokens[1].value.as_str(), "if");
    assert_eq!(tokens[2].value.as_str(), "café");
    assert_eq!(tokens[3].value.as_str(), "$_x");
}

#[test]
fn test_identifier_errors() {
    assert_eq!(scan_error(r"a\x"), ("Expecting Unicode escape sequence \\uXXXX".to_string(), 2));
    assert_eq!(scan_error(r"\u0031"), ("Invalid Unicode escape".to_string(), 0));
    assert_eq!(scan_error("a # b"), ("Unexpected character '#'".to_string(), 2));
}

#[test]
fn test_positions_track_lines() {
    let arena = Bump::new();
    let (tokens, _) = tokenize(&arena, "a\r\n  b\u{2028}c", LexerOptions::default()).unwrap();
    assert_eq!(tokens[1].loc.start, Position::new(2, 2));
    assert_eq!(tokens[2].loc.start, Position::new(3, 0));
}

#[test]
fn test_tokens_do_not_overlap() {
    let arena = Bump::new();
    let source = "function f(a, b) { return `${a}` + /x/g.source + b; }";
    let (tokens, _) = tokenize(&arena, source, LexerOptions::default()).unwrap();
    for pair in tokens.windows(2) {
        assert!(pair[0].start <= pair[0].end);
        assert!(pair[0].end <= pair[1].start);
    }
    assert!(tokens.last().unwrap().end as usize <= source.len());
}
