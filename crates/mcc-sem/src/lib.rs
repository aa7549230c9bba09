//! Combined scope resolution, type checking, and IR emission for Mini-C.
//!
//! Unlike a pipeline with a separate `mcc-mir` stage, this crate walks the
//! AST exactly once: each expression is both typed and lowered in the same
//! visit, driven by an [`mcc_ir::FunctionBuilder`] owned directly by the
//! walker (no process-wide emission state).

mod checker;
mod error;
mod scope;

pub use checker::analyze_and_emit;
pub use error::{ScopeError, SemaError, SemaResult, TypeError, TypeErrorKind};
pub use scope::{ScopeStack, Storage, SymbolEntry, SymbolKind};
