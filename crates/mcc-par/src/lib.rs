//! The Mini-C abstract syntax tree and recursive-descent parser.

mod ast;
mod error;
mod parser;

pub use ast::{
    ArrayDecl, Assign, Binary, BinaryOp, Block, Call, Decl, ExprStmt, ExternDecl, Function, If,
    Item, Param, Program, Return, Stmt, Type, Unary, UnaryOp, VarDecl, While,
};
pub use ast::{ArrayRef, BoolLit, Expr, FloatLit, IntLit, Var};
pub use error::{SyntaxError, SyntaxErrorKind, SyntaxResult};
pub use parser::Parser;
