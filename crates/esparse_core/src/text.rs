//! Source positions and line maps.
//!
//! Offsets are byte offsets into the UTF-8 source. Lines are 1-based and
//! columns are 0-based byte columns, counted from the last line terminator.
//! Line terminators are `\n`, `\r`, `\r\n`, U+2028 and U+2029.

use serde::Serialize;
use std::fmt;

/// A byte offset into source text.
pub type TextPos = u32;

/// A line/column pair.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
}

impl Position {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The same position moved `n` columns to the right.
    #[inline]
    pub fn offset(self, n: u32) -> Self {
        Self {
            line: self.line,
            column: self.column + n,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The start and end positions of a token, node or comment.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    #[inline]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Whether `ch` terminates a line.
#[inline]
pub fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// A map from byte offsets to line numbers, built from source text.
///
/// The lexer tracks positions incrementally; the line map is used when a
/// position has to be recovered for an arbitrary offset, for example when an
/// error is raised at an offset recorded earlier.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offsets of the start of each line.
    line_starts: Vec<TextPos>,
}

impl LineMap {
    /// Build a line map from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        let mut chars = text.char_indices().peekable();
        while let Some((i, ch)) = chars.next() {
            match ch {
                '\r' => {
                    if let Some(&(_, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push((i + 2) as u32);
                    } else {
                        line_starts.push((i + 1) as u32);
                    }
                }
                '\n' => line_starts.push((i + 1) as u32),
                '\u{2028}' | '\u{2029}' => line_starts.push((i + ch.len_utf8()) as u32),
                _ => {}
            }
        }
        Self { line_starts }
    }

    /// Get the 0-based line index for a byte offset.
    pub fn line_index_of(&self, pos: TextPos) -> usize {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line,
            Err(line) => line - 1,
        }
    }

    /// Get the position (1-based line, 0-based column) of a byte offset.
    pub fn position_of(&self, pos: TextPos) -> Position {
        let index = self.line_index_of(pos);
        Position {
            line: index as u32 + 1,
            column: pos - self.line_starts[index],
        }
    }

    /// Get the byte offset of the start of a 1-based line.
    pub fn line_start(&self, line: u32) -> Option<TextPos> {
        let index = line.checked_sub(1)? as usize;
        self.line_starts.get(index).copied()
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_map() {
        let text = "line1\nline2\nline3";
        let map = LineMap::new(text);
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.position_of(0), Position::new(1, 0));
        assert_eq!(map.position_of(5), Position::new(1, 5)); // newline char
        assert_eq!(map.position_of(6), Position::new(2, 0));
        assert_eq!(map.position_of(8), Position::new(2, 2));
        assert_eq!(map.position_of(12), Position::new(3, 0));
    }

    #[test]
    fn test_line_map_crlf_and_unicode_terminators() {
        let text = "a\r\nb\rc\u{2028}d";
        let map = LineMap::new(text);
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.position_of(3), Position::new(2, 0));
        assert_eq!(map.position_of(5), Position::new(3, 0));
        let d = text.find('d').unwrap() as u32;
        assert_eq!(map.position_of(d), Position::new(4, 0));
        assert_eq!(map.line_start(2), Some(3));
        assert_eq!(map.line_start(0), None);
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(3, 7).to_string(), "3:7");
        assert_eq!(Position::new(1, 2).offset(3), Position::new(1, 5));
    }
}
