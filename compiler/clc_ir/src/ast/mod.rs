//! The input AST, as handed down by the (external) parser.
//!
//! Every node carries a [`Pos`](crate::Pos) for diagnostic attribution.
//! Positions are concrete here (rather than a type parameter, as in the
//! distilled specification) since this crate is the only consumer; a
//! driver embedding a richer position/source-map layer can still populate
//! [`Pos`](crate::Pos) freely, it just can't attach arbitrary types.

mod expr;
mod items;
mod stmt;
mod types;

pub use expr::{AssignOp, BinOp, ConstId, Expr, ExprKind};
pub use items::{ClassArg, Definition, DefinitionKind, FunctionArg};
pub use stmt::{Stmt, StmtKind};
pub use types::TypeRef;
