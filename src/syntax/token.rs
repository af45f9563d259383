//! Scoped tokens and offset conversion
//!
//! Grammars report spans in character indices; consumers address text by
//! byte, so every token is converted before it enters a buffer cache.

use serde::Serialize;

/// A scoped span on a single line.
///
/// Positions are 1-indexed and measured in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Line number (1-indexed)
    pub line: usize,
    /// Byte offset of the first byte within the line (1-indexed)
    pub column: usize,
    /// Length in bytes
    pub length: usize,
    /// Scope names, most general first
    pub scopes: Vec<String>,
}

impl Token {
    /// Build a token from a character span on `text`.
    ///
    /// `row` is the 0-indexed line the text came from.
    ///
    /// # Panics
    ///
    /// Panics if either index lies beyond the line's character count.
    pub fn from_char_span(
        text: &str,
        row: usize,
        start_char: usize,
        end_char: usize,
        scopes: Vec<String>,
    ) -> Self {
        ByteColumns::new(text).token(row, start_char, end_char, scopes)
    }

    /// Byte range of the token within its line (0-indexed, end exclusive)
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        let start = self.column - 1;
        start..start + self.length
    }

    /// Innermost scope, if any
    pub fn innermost_scope(&self) -> Option<&str> {
        self.scopes.last().map(String::as_str)
    }
}

/// Converts character columns on one line to byte columns.
///
/// Columns are usually requested in increasing order (token after token), so
/// each call resumes from the previous position instead of the line start.
pub struct ByteColumns<'a> {
    text: &'a str,
    chars: usize,
    byte: usize,
}

impl<'a> ByteColumns<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: 0,
            byte: 0,
        }
    }

    /// # Panics
    ///
    /// Panics if `char_col` is past the end of the line.
    pub fn byte_col(&mut self, char_col: usize) -> usize {
        if char_col < self.chars {
            self.chars = 0;
            self.byte = 0;
        }
        let skip = char_col - self.chars;
        let rest = &self.text[self.byte..];
        let offset = match rest.char_indices().nth(skip) {
            Some((offset, _)) => offset,
            None if rest.chars().count() == skip => rest.len(),
            None => panic!(
                "character offset {} out of range for line with {} characters",
                char_col,
                self.text.chars().count()
            ),
        };
        self.chars = char_col;
        self.byte += offset;
        self.byte
    }

    /// Build a token for a character span; see [`Token::from_char_span`]
    pub fn token(
        &mut self,
        row: usize,
        start_char: usize,
        end_char: usize,
        scopes: Vec<String>,
    ) -> Token {
        let start_byte = self.byte_col(start_char);
        let end_byte = self.byte_col(end_char);
        Token {
            line: row + 1,
            column: start_byte + 1,
            length: end_byte.saturating_sub(start_byte),
            scopes,
        }
    }
}

/// Convert a character column to a byte column on a given line.
///
/// A column equal to the character count maps to the line's byte length.
///
/// # Panics
///
/// Panics if `char_col` is past the end of the line. Grammars only ever
/// report offsets inside the text they were handed, so this indicates a
/// broken grammar implementation.
pub fn char_to_byte_col(text: &str, char_col: usize) -> usize {
    match text.char_indices().nth(char_col) {
        Some((byte, _)) => byte,
        None => {
            let char_count = text.chars().count();
            if char_col == char_count {
                text.len()
            } else {
                panic!(
                    "character offset {} out of range for line with {} characters",
                    char_col, char_count
                );
            }
        }
    }
}

/// Convert a byte column to a character column.
///
/// Clamps to the line length and rounds down to the nearest char boundary.
pub fn byte_to_char_col(text: &str, byte_col: usize) -> usize {
    let byte_col = byte_col.min(text.len());
    let mut valid_byte = byte_col;
    while valid_byte > 0 && !text.is_char_boundary(valid_byte) {
        valid_byte -= 1;
    }
    text[..valid_byte].chars().count()
}
