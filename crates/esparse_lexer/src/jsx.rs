//! JSX token reading.
//!
//! These readers are driven by the parser's `jsx` extension when the
//! innermost context is a JSX frame: element children, tag names and
//! attribute strings. Character references are decoded in text and
//! attribute values.

use crate::char_codes::*;
use crate::lexer::{LexResult, Lexer};
use esparse_ast::{TokenType, TokenValue};
use esparse_core::arena::alloc_str_in;
use esparse_diagnostics::messages;

impl<'a> Lexer<'a> {
    /// Read JSX children text up to the next `<` or `{`.
    pub fn jsx_read_token(&mut self) -> LexResult<()> {
        let input = self.input();
        let bytes = input.as_bytes();
        let mut out = String::new();
        let mut chunk_start = self.state.pos;
        loop {
            let pos = self.state.pos;
            let Some(&byte) = bytes.get(pos) else {
                return Err(self.error(self.state.start, &messages::UNTERMINATED_JSX_CONTENTS, &[]));
            };
            match byte {
                b'<' | b'{' => {
                    if pos == self.state.start {
                        if byte == b'<' && self.state.expr_allowed {
                            self.state.pos += 1;
                            self.finish_token(TokenType::JsxTagStart, TokenValue::None);
                            return Ok(());
                        }
                        return self.get_token_from_code(byte as char);
                    }
                    out.push_str(&input[chunk_start..pos]);
                    let text = alloc_str_in(self.arena(), &out);
                    self.finish_token(TokenType::JsxText, TokenValue::Str(text));
                    return Ok(());
                }
                b'&' => {
                    out.push_str(&input[chunk_start..pos]);
                    self.jsx_read_entity(&mut out);
                    chunk_start = self.state.pos;
                }
                _ => match self.char_at(pos) {
                    Some(ch) if is_line_break(ch) => {
                        out.push_str(&input[chunk_start..pos]);
                        self.jsx_read_new_line(true, &mut out);
                        chunk_start = self.state.pos;
                    }
                    _ => self.state.pos += 1,
                },
            }
        }
    }

    fn jsx_read_new_line(&mut self, normalize_crlf: bool, out: &mut String) {
        let Some(ch) = self.char_at(self.state.pos) else {
            return;
        };
        self.state.pos += ch.len_utf8();
        if ch == '\r' && self.char_at(self.state.pos) == Some('\n') {
            self.state.pos += 1;
            out.push_str(if normalize_crlf { "\n" } else { "\r\n" });
        } else {
            out.push(ch);
        }
        self.new_line();
    }

    /// Read a quoted attribute value. Backslashes are not escapes.
    pub fn jsx_read_string(&mut self, quote: char) -> LexResult<()> {
        let input = self.input();
        let mut out = String::new();
        self.state.pos += 1;
        let mut chunk_start = self.state.pos;
        loop {
            let Some(ch) = self.char_at(self.state.pos) else {
                return Err(self.error(self.state.start, &messages::UNTERMINATED_STRING, &[]));
            };
            if ch == quote {
                break;
            }
            if ch == '&' {
                out.push_str(&input[chunk_start..self.state.pos]);
                self.jsx_read_entity(&mut out);
                chunk_start = self.state.pos;
            } else if is_line_break(ch) {
                out.push_str(&input[chunk_start..self.state.pos]);
                self.jsx_read_new_line(false, &mut out);
                chunk_start = self.state.pos;
            } else {
                self.state.pos += ch.len_utf8();
            }
        }
        out.push_str(&input[chunk_start..self.state.pos]);
        self.state.pos += 1;
        let value = alloc_str_in(self.arena(), &out);
        self.finish_token(TokenType::String, TokenValue::Str(value));
        Ok(())
    }

    /// Decode a character reference at `&`. An unknown or malformed
    /// reference leaves a literal `&`.
    fn jsx_read_entity(&mut self, out: &mut String) {
        let input = self.input();
        let bytes = input.as_bytes();
        let name_start = self.state.pos + 1;
        let mut i = name_start;
        let mut entity = None;
        while i < bytes.len() && i - name_start < 10 {
            let byte = bytes[i];
            i += 1;
            if byte == b';' {
                entity = decode_entity(&input[name_start..i - 1]);
                break;
            }
        }
        match entity {
            Some(ch) => {
                self.state.pos = i;
                out.push(ch);
            }
            None => {
                self.state.pos = name_start;
                out.push('&');
            }
        }
    }

    /// Read a JSX name: an identifier that may contain `-`.
    pub fn jsx_read_word(&mut self) -> LexResult<()> {
        let input = self.input();
        let start = self.state.pos;
        if let Some(first) = self.char_at(start) {
            self.state.pos += first.len_utf8();
        }
        while let Some(ch) = self.char_at(self.state.pos) {
            if !(is_identifier_char(ch) || ch == '-') {
                break;
            }
            self.state.pos += ch.len_utf8();
        }
        let name = &input[start..self.state.pos];
        self.finish_token(TokenType::JsxName, TokenValue::Str(name));
        Ok(())
    }
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix('x') {
            Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => u32::from_str_radix(hex, 16).ok()?,
            Some(_) => return None,
            None if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) => number.parse().ok()?,
            None => return None,
        };
        return char::from_u32(code);
    }
    named_entity(name)
}

/// The commonly used XHTML named character references.
fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "quot" => '\u{0022}',
        "amp" => '&',
        "apos" => '\u{0027}',
        "lt" => '<',
        "gt" => '>',
        "nbsp" => '\u{00A0}',
        "iexcl" => '\u{00A1}',
        "cent" => '\u{00A2}',
        "pound" => '\u{00A3}',
        "curren" => '\u{00A4}',
        "yen" => '\u{00A5}',
        "brvbar" => '\u{00A6}',
        "sect" => '\u{00A7}',
        "uml" => '\u{00A8}',
        "copy" => '\u{00A9}',
        "ordf" => '\u{00AA}',
        "laquo" => '\u{00AB}',
        "not" => '\u{00AC}',
        "shy" => '\u{00AD}',
        "reg" => '\u{00AE}',
        "macr" => '\u{00AF}',
        "deg" => '\u{00B0}',
        "plusmn" => '\u{00B1}',
        "sup2" => '\u{00B2}',
        "sup3" => '\u{00B3}',
        "acute" => '\u{00B4}',
        "micro" => '\u{00B5}',
        "para" => '\u{00B6}',
        "middot" => '\u{00B7}',
        "cedil" => '\u{00B8}',
        "sup1" => '\u{00B9}',
        "ordm" => '\u{00BA}',
        "raquo" => '\u{00BB}',
        "frac14" => '\u{00BC}',
        "frac12" => '\u{00BD}',
        "frac34" => '\u{00BE}',
        "iquest" => '\u{00BF}',
        "Agrave" => '\u{00C0}',
        "Aacute" => '\u{00C1}',
        "Auml" => '\u{00C4}',
        "Ccedil" => '\u{00C7}',
        "Eacute" => '\u{00C9}',
        "Ntilde" => '\u{00D1}',
        "Ouml" => '\u{00D6}',
        "times" => '\u{00D7}',
        "Uuml" => '\u{00DC}',
        "szlig" => '\u{00DF}',
        "agrave" => '\u{00E0}',
        "aacute" => '\u{00E1}',
        "auml" => '\u{00E4}',
        "ccedil" => '\u{00E7}',
        "egrave" => '\u{00E8}',
        "eacute" => '\u{00E9}',
        "ntilde" => '\u{00F1}',
        "ouml" => '\u{00F6}',
        "divide" => '\u{00F7}',
        "uuml" => '\u{00FC}',
        "Alpha" => '\u{0391}',
        "Beta" => '\u{0392}',
        "Gamma" => '\u{0393}',
        "Delta" => '\u{0394}',
        "Omega" => '\u{03A9}',
        "alpha" => '\u{03B1}',
        "beta" => '\u{03B2}',
        "gamma" => '\u{03B3}',
        "delta" => '\u{03B4}',
        "lambda" => '\u{03BB}',
        "mu" => '\u{03BC}',
        "pi" => '\u{03C0}',
        "sigma" => '\u{03C3}',
        "omega" => '\u{03C9}',
        "ensp" => '\u{2002}',
        "emsp" => '\u{2003}',
        "thinsp" => '\u{2009}',
        "zwnj" => '\u{200C}',
        "zwj" => '\u{200D}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "sbquo" => '\u{201A}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "bdquo" => '\u{201E}',
        "dagger" => '\u{2020}',
        "Dagger" => '\u{2021}',
        "bull" => '\u{2022}',
        "hellip" => '\u{2026}',
        "permil" => '\u{2030}',
        "prime" => '\u{2032}',
        "Prime" => '\u{2033}',
        "lsaquo" => '\u{2039}',
        "rsaquo" => '\u{203A}',
        "euro" => '\u{20AC}',
        "trade" => '\u{2122}',
        "larr" => '\u{2190}',
        "uarr" => '\u{2191}',
        "rarr" => '\u{2192}',
        "darr" => '\u{2193}',
        "harr" => '\u{2194}',
        "rArr" => '\u{21D2}',
        "hArr" => '\u{21D4}',
        "forall" => '\u{2200}',
        "part" => '\u{2202}',
        "exist" => '\u{2203}',
        "empty" => '\u{2205}',
        "isin" => '\u{2208}',
        "sum" => '\u{2211}',
        "minus" => '\u{2212}',
        "radic" => '\u{221A}',
        "infin" => '\u{221E}',
        "and" => '\u{2227}',
        "or" => '\u{2228}',
        "cap" => '\u{2229}',
        "cup" => '\u{222A}',
        "asymp" => '\u{2248}',
        "ne" => '\u{2260}',
        "equiv" => '\u{2261}',
        "le" => '\u{2264}',
        "ge" => '\u{2265}',
        "loz" => '\u{25CA}',
        "spades" => '\u{2660}',
        "clubs" => '\u{2663}',
        "hearts" => '\u{2665}',
        "diams" => '\u{2666}',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entity("amp"), Some('&'));
        assert_eq!(decode_entity("#123"), Some('{'));
        assert_eq!(decode_entity("#x7B"), Some('{'));
        assert_eq!(decode_entity("#x"), None);
        assert_eq!(decode_entity("bogus"), None);
    }
}
