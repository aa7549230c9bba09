//! Character-level source cursor.
//!
//! Tracks byte position, 1-based line, and 1-based column as it advances.
//! Mini-C identifiers and literals are ASCII, so the cursor works at the
//! byte level with an ASCII-fast-path `current_char`; non-ASCII bytes only
//! ever show up inside comments, where they are skipped opaquely.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorSnapshot {
    position: usize,
    line: u32,
    column: u32,
}

pub struct Cursor<'a> {
    source: &'a str,
    bytes: &'a [u8],
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The current character, or `'\0'` at end of input. Mini-C source is
    /// ASCII outside of comments, so this never needs to decode multi-byte
    /// sequences for the characters the lexer actually dispatches on.
    pub fn current_char(&self) -> char {
        self.peek_char(0)
    }

    pub fn peek_char(&self, offset: usize) -> char {
        self.bytes
            .get(self.position + offset)
            .map(|&b| b as char)
            .unwrap_or('\0')
    }

    pub fn advance(&mut self) -> char {
        let c = self.current_char();
        if !self.is_at_end() {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    pub fn match_char(&mut self, expected: char) -> bool {
        if self.current_char() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skips ASCII whitespace. Comments are handled by the lexer, which
    /// alternates calls to this with its own comment-skipping loop.
    pub fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_ascii_whitespace() {
            self.advance();
        }
    }

    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    pub fn restore(&mut self, snapshot: CursorSnapshot) {
        self.position = snapshot.position;
        self.line = snapshot.line;
        self.column = snapshot.column;
    }
}
