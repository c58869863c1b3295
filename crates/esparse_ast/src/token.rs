//! Tokens as recorded in a parse result.

use crate::token_type::TokenType;
use esparse_core::text::SourceLocation;
use serde::Serialize;

/// The payload of a token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenValue<'a> {
    None,
    /// Identifier names, operator text, cooked string/template/JSX text.
    Str(&'a str),
    Num(f64),
    Regex { pattern: &'a str, flags: &'a str },
}

impl<'a> TokenValue<'a> {
    /// The string payload, or `""` for non-string values.
    #[inline]
    pub fn as_str(&self) -> &'a str {
        match *self {
            TokenValue::Str(s) => s,
            _ => "",
        }
    }

    #[inline]
    pub fn as_num(&self) -> Option<f64> {
        match *self {
            TokenValue::Num(n) => Some(n),
            _ => None,
        }
    }
}

/// A token with its type, value and location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Token<'a> {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub value: TokenValue<'a>,
    pub start: u32,
    pub end: u32,
    pub loc: SourceLocation,
}

impl<'a> Token<'a> {
    /// The length of this token in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether this token has zero length (only the end-of-file token).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esparse_core::text::Position;

    #[test]
    fn test_token_serializes_babylon_shape() {
        let token = Token {
            token_type: TokenType::Name,
            value: TokenValue::Str("foo"),
            start: 0,
            end: 3,
            loc: SourceLocation::new(Position::new(1, 0), Position::new(1, 3)),
        };
        let json = serde_json::to_value(token).unwrap();
        assert_eq!(json["type"], "name");
        assert_eq!(json["value"], "foo");
        assert_eq!(json["end"], 3);
        assert_eq!(json["loc"]["end"]["column"], 3);
        assert_eq!(token.len(), 3);
    }

    #[test]
    fn test_token_value_accessors() {
        assert_eq!(TokenValue::Str("x").as_str(), "x");
        assert_eq!(TokenValue::Num(1.5).as_str(), "");
        assert_eq!(TokenValue::Num(1.5).as_num(), Some(1.5));
        assert_eq!(TokenValue::None.as_num(), None);
    }
}
