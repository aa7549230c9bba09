//! Scope and type errors — the two semantic-diagnostic categories from the
//! taxonomy in §7 of the design (`Scope` and `Type`), as opposed to the
//! lexical/syntax errors owned by `mcc-lex`/`mcc-par`.

use mcc_util::Span;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScopeError {
    #[error("`{name}` is already declared in this scope")]
    Redeclaration { name: String, span: Span },

    #[error(
        "`{name}` is not declared{}",
        suggestion.as_deref().map(|s| format!(" (did you mean `{s}`?)")).unwrap_or_default()
    )]
    Undeclared {
        name: String,
        span: Span,
        suggestion: Option<String>,
    },

    /// A second `Function` item with a body for a name already bound to a
    /// function in the global scope. Detected deliberately, diverging from
    /// the lenient behavior this implementation's ancestry tolerates.
    #[error("`{name}` is already defined")]
    Redefinition { name: String, span: Span },
}

impl ScopeError {
    pub fn span(&self) -> Span {
        match self {
            ScopeError::Redeclaration { span, .. } => *span,
            ScopeError::Undeclared { span, .. } => *span,
            ScopeError::Redefinition { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeErrorKind {
    Narrowing,
    NonNumeric,
    ArgCount,
    ArgType,
    ReturnType,
    ModFloat,
    VoidValue,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("type error at {span:?}: {kind:?} (expected {expected}, got {got})")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub expected: String,
    pub got: String,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, expected: impl Into<String>, got: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            expected: expected.into(),
            got: got.into(),
            span,
        }
    }
}

/// The combined failure type the walker can raise. Scope resolution and
/// type checking are interleaved in one pass (§1), so one error type
/// covers both rather than forcing the walker to juggle two `Result`s.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemaError {
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Type(#[from] TypeError),
}

impl SemaError {
    pub fn span(&self) -> Span {
        match self {
            SemaError::Scope(e) => e.span(),
            SemaError::Type(e) => e.span,
        }
    }
}

pub type SemaResult<T> = std::result::Result<T, SemaError>;
