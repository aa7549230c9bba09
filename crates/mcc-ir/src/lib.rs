//! A thin, direct textual-LLVM-IR model: module, function, basic block,
//! and instruction types plus a pretty-printer, built and owned explicitly
//! by the walker in `mcc-sem` rather than pulled in from a real LLVM
//! binding — there is no optimization pass between type-checking and
//! emission for this core to preserve, so a second, heavier IR (or a real
//! `inkwell`/LLVM-C dependency) would have nothing to do.

mod builder;
mod inst;
mod module;
mod ty;
mod value;

pub use builder::{FunctionBuilder, ModuleBuilder};
pub use inst::{Instruction, Terminator};
pub use module::{Block, BlockId, ExternFn, Function, Global, Module};
pub use ty::IrType;
pub use value::Value;
