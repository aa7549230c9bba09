//! Shared infrastructure for the Mini-C compiler pipeline.
//!
//! Every downstream crate (lexer, parser, semantic analyzer) builds on the
//! four concerns gathered here: interned identifiers, source positions,
//! diagnostic reporting, and typed index vectors for arena-style storage.

mod diagnostic;
mod error;
mod index_vec;
mod span;
mod symbol;

pub use diagnostic::{suggest_closest, Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level};
pub use error::{DiagnosticError, DiagnosticResult, SourceMapError, SourceMapResult};
pub use index_vec::{define_idx, Idx, IndexVec};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;

pub use rustc_hash::{FxHashMap, FxHashSet};
