//! The Mini-C lexer.
//!
//! `Lexer::next` is the single forward-pass entry point; `Lexer::push_back`
//! lets the parser rewind up to two tokens, which is exactly what the
//! assignment-vs-expression ambiguity in the grammar needs (consume an
//! identifier, look at what follows, sometimes put both back).

use mcc_util::{DiagnosticBuilder, DiagnosticCode, FileId, Handler, Span, Symbol};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    handler: &'a Handler,
    file_id: FileId,
    pushback: Vec<Token>,
    token_start: usize,
    token_start_line: u32,
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file_id: FileId, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            file_id,
            pushback: Vec::new(),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Returns the next token, either from the pushback buffer (most
    /// recent first) or freshly lexed from the source.
    pub fn next(&mut self) -> Token {
        if let Some(tok) = self.pushback.pop() {
            return tok;
        }
        self.lex_token()
    }

    /// Rewinds one token so the next call to [`Lexer::next`] returns it
    /// again. Calling this twice in a row rewinds two tokens, which is the
    /// maximum the grammar needs.
    pub fn push_back(&mut self, token: Token) {
        self.pushback.push(token);
    }

    /// Looks at the next token without consuming it.
    pub fn peek(&mut self) -> Token {
        let tok = self.next();
        self.push_back(tok);
        tok
    }

    fn make_span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
            self.file_id,
        )
    }

    fn report_error(&self, message: impl Into<String>) {
        DiagnosticBuilder::error(message)
            .code(DiagnosticCode::Lexical)
            .span(self.make_span())
            .emit(self.handler);
    }

    fn lex_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return self.single(TokenKind::Eof);
        }

        match self.cursor.current_char() {
            '(' => self.advance_single(TokenKind::LParen),
            ')' => self.advance_single(TokenKind::RParen),
            '{' => self.advance_single(TokenKind::LBrace),
            '}' => self.advance_single(TokenKind::RBrace),
            '[' => self.advance_single(TokenKind::LBracket),
            ']' => self.advance_single(TokenKind::RBracket),
            ',' => self.advance_single(TokenKind::Comma),
            ';' => self.advance_single(TokenKind::Semicolon),
            '+' => self.advance_single(TokenKind::Plus),
            '-' => self.advance_single(TokenKind::Minus),
            '*' => self.advance_single(TokenKind::Star),
            '/' => self.advance_single(TokenKind::Slash),
            '%' => self.advance_single(TokenKind::Percent),
            '=' => self.lex_two_char('=', TokenKind::EqEq, TokenKind::Assign),
            '!' => self.lex_two_char('=', TokenKind::Ne, TokenKind::Bang),
            '<' => self.lex_two_char('=', TokenKind::Le, TokenKind::Lt),
            '>' => self.lex_two_char('=', TokenKind::Ge, TokenKind::Gt),
            '&' => self.lex_doubled('&', TokenKind::AndAnd),
            '|' => self.lex_doubled('|', TokenKind::OrOr),
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_identifier(),
            c if c.is_ascii_digit() => self.lex_number(),
            c => {
                self.cursor.advance();
                self.report_error(format!("unexpected character '{}'", c));
                self.single(TokenKind::Invalid)
            }
        }
    }

    /// Skips whitespace and `//` line comments, which run to end of line
    /// or, legally, to end of file if unterminated.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '/' {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
            } else {
                break;
            }
        }
    }

    fn advance_single(&mut self, kind: TokenKind) -> Token {
        self.cursor.advance();
        self.single(kind)
    }

    fn single(&self, kind: TokenKind) -> Token {
        let lexeme = Symbol::intern(self.cursor.slice_from(self.token_start));
        Token::new(kind, lexeme, self.make_span())
    }

    /// Lexes a one- or two-character operator where the second form is
    /// this character followed by `=` (`<` vs `<=`, `!` vs `!=`, ...).
    fn lex_two_char(&mut self, second: char, wide: TokenKind, narrow: TokenKind) -> Token {
        self.cursor.advance();
        if self.cursor.match_char(second) {
            self.single(wide)
        } else {
            self.single(narrow)
        }
    }

    /// Lexes `&&` / `||`. A lone `&` or `|` is not part of Mini-C's
    /// operator set, so it is reported as lexically invalid.
    fn lex_doubled(&mut self, repeat: char, kind: TokenKind) -> Token {
        self.cursor.advance();
        if self.cursor.match_char(repeat) {
            self.single(kind)
        } else {
            self.report_error(format!("unexpected character '{}'", repeat));
            self.single(TokenKind::Invalid)
        }
    }

    fn lex_identifier(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_alphanumeric() || self.cursor.current_char() == '_' {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(self.token_start);
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Ident);
        self.single(kind)
    }

    /// Integer literals are a maximal digit run; float literals require a
    /// `.` with at least one digit on either side. `1.` and `.5` are both
    /// malformed and reported as lexical errors rather than silently
    /// accepted.
    fn lex_number(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        let is_float = self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit();
        if !is_float {
            let text = self.cursor.slice_from(self.token_start);
            return match text.parse::<i64>() {
                Ok(value) => self.single(TokenKind::IntLit).with_int(value),
                Err(_) => {
                    self.report_error(format!("integer literal '{}' out of range", text));
                    self.single(TokenKind::Invalid)
                }
            };
        }

        self.cursor.advance(); // '.'
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        // A malformed literal like `1.` (no digits after the dot) is
        // caught above because `is_float` requires a following digit; a
        // trailing `.` is therefore left as a separate, later error at
        // the next token rather than swallowed here.
        let text = self.cursor.slice_from(self.token_start);
        match text.parse::<f64>() {
            Ok(value) => self.single(TokenKind::FloatLit).with_float(value),
            Err(_) => {
                self.report_error(format!("malformed float literal '{}'", text));
                self.single(TokenKind::Invalid)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str) -> Vec<TokenKind> {
        let handler = Handler::new();
        let mut lexer = Lexer::new(src, FileId(0), &handler);
        let mut kinds = Vec::new();
        loop {
            let tok = lexer.next();
            let is_eof = tok.is_eof();
            kinds.push(tok.kind);
            if is_eof {
                break;
            }
        }
        kinds
    }

    #[test]
    fn keywords_are_recognized() {
        assert_eq!(
            lex_all("int float bool void if else while return extern true false"),
            vec![
                TokenKind::Int,
                TokenKind::Float,
                TokenKind::Bool,
                TokenKind::Void,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::Return,
                TokenKind::Extern,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn multi_char_operators_win_over_their_prefix() {
        assert_eq!(
            lex_all("== != <= >= && ||"),
            vec![
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn single_char_operators_are_not_swallowed_by_two_char_lookahead() {
        assert_eq!(
            lex_all("< > = !"),
            vec![TokenKind::Lt, TokenKind::Gt, TokenKind::Assign, TokenKind::Bang, TokenKind::Eof]
        );
    }

    #[test]
    fn integer_literal_decodes_value() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("120", FileId(0), &handler);
        let tok = lexer.next();
        assert_eq!(tok.kind, TokenKind::IntLit);
        assert_eq!(tok.int_value, Some(120));
    }

    #[test]
    fn float_literal_requires_digits_on_both_sides_of_dot() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("2.5", FileId(0), &handler);
        let tok = lexer.next();
        assert_eq!(tok.kind, TokenKind::FloatLit);
        assert_eq!(tok.float_value, Some(2.5));
    }

    #[test]
    fn bare_trailing_dot_is_an_integer_then_a_lexical_error() {
        // "1." lexes as IntLit("1") followed by an invalid lone '.' token,
        // because is_float requires a digit after the dot.
        let handler = Handler::new();
        let mut lexer = Lexer::new("1.", FileId(0), &handler);
        let first = lexer.next();
        assert_eq!(first.kind, TokenKind::IntLit);
        let second = lexer.next();
        assert_eq!(second.kind, TokenKind::Invalid);
        assert!(handler.has_errors());
    }

    #[test]
    fn line_comment_runs_to_end_of_line() {
        assert_eq!(
            lex_all("int a; // trailing comment\nfloat b;"),
            vec![
                TokenKind::Int,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Float,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_line_comment_is_legal_at_eof() {
        let handler = Handler::new();
        assert_eq!(lex_all("int a; // no newline here"), vec![TokenKind::Int, TokenKind::Ident, TokenKind::Semicolon, TokenKind::Eof]);
        let _ = handler;
    }

    #[test]
    fn unrecognized_byte_is_a_lexical_error() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("@", FileId(0), &handler);
        let tok = lexer.next();
        assert_eq!(tok.kind, TokenKind::Invalid);
        assert!(handler.has_errors());
    }

    #[test]
    fn push_back_rewinds_two_tokens() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("x = 1", FileId(0), &handler);
        let ident = lexer.next();
        let eq = lexer.next();
        assert_eq!(ident.kind, TokenKind::Ident);
        assert_eq!(eq.kind, TokenKind::Assign);
        lexer.push_back(eq);
        lexer.push_back(ident);
        assert_eq!(lexer.next().kind, TokenKind::Ident);
        assert_eq!(lexer.next().kind, TokenKind::Assign);
    }

    #[test]
    fn column_resets_after_newline() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("int\nfloat", FileId(0), &handler);
        let _ = lexer.next();
        let second = lexer.next();
        assert_eq!(second.span.line, 2);
        assert_eq!(second.span.column, 1);
    }
}
