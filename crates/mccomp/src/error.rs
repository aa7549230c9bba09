//! Top-level error type for the mccomp driver.
//!
//! Every pipeline crate owns its own `thiserror` enum scoped to its
//! concern (`mcc_par::SyntaxError`, `mcc_sem::SemaError`); this type
//! aggregates them with `#[from]` and is the only place that decides the
//! process exit code (§7's "Implementation idiom").

use thiserror::Error;

/// Errors the driver itself can surface, on top of what it forwards from
/// the pipeline stages.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("syntax error: {0}")]
    Syntax(#[from] mcc_par::SyntaxError),

    #[error(transparent)]
    Sema(#[from] mcc_sem::SemaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal compiler error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;

impl DriverError {
    /// Maps a failure to the process exit code from §6: 1 for any
    /// user-facing lexical/syntax/scope/type error, 2 for an internal
    /// invariant violation raised during emission.
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::Internal(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_errors_exit_with_one() {
        let err = DriverError::Config("missing field".to_string());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn internal_errors_exit_with_two() {
        let err = DriverError::Internal("unterminated basic block".to_string());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn config_error_display() {
        let err = DriverError::Config("bad toml".to_string());
        assert_eq!(err.to_string(), "configuration error: bad toml");
    }
}
