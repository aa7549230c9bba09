//! Structured error types for the shared utility concerns.
//!
//! Each concern below the pipeline stages (source map, diagnostic sink) gets
//! its own `thiserror`-derived enum rather than a single catch-all error,
//! matching how each stage-specific crate reports its own failures.

use thiserror::Error;

/// Errors that can occur while registering or looking up source files.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceMapError {
    #[error("unknown file id {0:?}")]
    UnknownFile(crate::FileId),

    #[error("span {span:?} is out of bounds for file {file_id:?} (len {len})")]
    SpanOutOfBounds {
        span: crate::Span,
        file_id: crate::FileId,
        len: usize,
    },
}

pub type SourceMapResult<T> = std::result::Result<T, SourceMapError>;

/// Errors raised by the diagnostic handler itself (as opposed to diagnostics
/// it is asked to hold, which represent compile errors, not handler bugs).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticError {
    #[error("diagnostic builder finalized without a message")]
    EmptyMessage,

    #[error("handler configured to panic on error, and an error was emitted: {0}")]
    PanicOnError(String),
}

pub type DiagnosticResult<T> = std::result::Result<T, DiagnosticError>;
