//! Character classes used by the lexer.

use unicode_xid::UnicodeXID;

pub const LINE_SEPARATOR: char = '\u{2028}';
pub const PARAGRAPH_SEPARATOR: char = '\u{2029}';
pub const ZWNJ: char = '\u{200C}';
pub const ZWJ: char = '\u{200D}';
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// Check if a character is a line terminator.
#[inline]
pub fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | LINE_SEPARATOR | PARAGRAPH_SEPARATOR)
}

/// Check if a character is whitespace (not line break).
#[inline]
pub fn is_white_space_single_line(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{000B}' // vertical tab
            | '\u{000C}' // form feed
            | '\u{00A0}' // no-break space
            | '\u{1680}' // ogham space mark
            | '\u{180E}' // mongolian vowel separator
            | '\u{2000}'..='\u{200A}' // various spaces
            | '\u{202F}' // narrow no-break space
            | '\u{205F}' // medium mathematical space
            | '\u{3000}' // ideographic space
            | '\u{FEFF}' // BOM / zero-width no-break space
    )
}

/// Check if a character can start an identifier.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_alphabetic() || ch == '$' || ch == '_';
    }
    UnicodeXID::is_xid_start(ch)
}

/// Check if a character can continue an identifier.
#[inline]
pub fn is_identifier_char(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_alphanumeric() || ch == '$' || ch == '_';
    }
    ch == ZWNJ || ch == ZWJ || UnicodeXID::is_xid_continue(ch)
}

/// Check if a code point (possibly not a valid `char`) can start an identifier.
#[inline]
pub fn is_identifier_start_code(code: u32) -> bool {
    char::from_u32(code).is_some_and(is_identifier_start)
}

/// Check if a code point (possibly not a valid `char`) can continue an identifier.
#[inline]
pub fn is_identifier_char_code(code: u32) -> bool {
    char::from_u32(code).is_some_and(is_identifier_char)
}

/// The numeric value of `byte` as a digit in any radix up to 36.
#[inline]
pub fn digit_value(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some((byte - b'0') as u32),
        b'a'..=b'z' => Some((byte - b'a') as u32 + 10),
        b'A'..=b'Z' => Some((byte - b'A') as u32 + 10),
        _ => None,
    }
}

/// Decode a UTF-16 surrogate pair, if `high` and `low` form one.
#[inline]
pub fn combine_surrogates(high: u32, low: u32) -> Option<u32> {
    if (0xD800..=0xDBFF).contains(&high) && (0xDC00..=0xDFFF).contains(&low) {
        Some(((high - 0xD800) << 10) + (low - 0xDC00) + 0x10000)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_classes() {
        assert!(is_identifier_start('a'));
        assert!(is_identifier_start('$'));
        assert!(is_identifier_start('ü'));
        assert!(!is_identifier_start('1'));
        assert!(is_identifier_char('1'));
        assert!(is_identifier_char(ZWJ));
        assert!(!is_identifier_char('-'));
        assert!(!is_identifier_start_code(0xD800));
    }

    #[test]
    fn test_whitespace_and_breaks() {
        assert!(is_white_space_single_line('\u{00A0}'));
        assert!(is_white_space_single_line('\u{FEFF}'));
        assert!(!is_white_space_single_line('\n'));
        assert!(is_line_break(LINE_SEPARATOR));
    }

    #[test]
    fn test_surrogates() {
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), Some(0x1F600));
        assert_eq!(combine_surrogates(0xD83D, 0x0041), None);
        assert_eq!(digit_value(b'f'), Some(15));
        assert_eq!(digit_value(b'-'), None);
    }
}
