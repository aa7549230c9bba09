//! Parser error type.

use mcc_util::Span;
use thiserror::Error;

/// The kinds of syntax failure the grammar can hit. The parser reports and
/// aborts on the first one — no panic-mode recovery.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxErrorKind {
    UnexpectedToken { expected: String, got: String },
    MissingBody,
    EmptyBlock,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("syntax error at {span:?}: {kind:?}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Span,
}

impl SyntaxError {
    pub fn unexpected(expected: impl Into<String>, got: impl Into<String>, span: Span) -> Self {
        Self {
            kind: SyntaxErrorKind::UnexpectedToken {
                expected: expected.into(),
                got: got.into(),
            },
            span,
        }
    }

    pub fn missing_body(span: Span) -> Self {
        Self {
            kind: SyntaxErrorKind::MissingBody,
            span,
        }
    }

    pub fn empty_block(span: Span) -> Self {
        Self {
            kind: SyntaxErrorKind::EmptyBlock,
            span,
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            SyntaxErrorKind::UnexpectedToken { expected, got } => {
                format!("expected {}, found {}", expected, got)
            }
            SyntaxErrorKind::MissingBody => "function declared without a body or `extern`".to_string(),
            SyntaxErrorKind::EmptyBlock => "empty blocks are not accepted; use `{ ; }`".to_string(),
        }
    }
}

pub type SyntaxResult<T> = std::result::Result<T, SyntaxError>;
