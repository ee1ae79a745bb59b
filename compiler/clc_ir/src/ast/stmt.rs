//! Statement AST.

use super::expr::Expr;
use super::types::TypeRef;
use crate::Pos;

#[derive(Clone, Debug)]
pub enum StmtKind {
    Block(Vec<Stmt>),
    Decl {
        name: String,
        ty: TypeRef,
        init: Option<Expr>,
    },
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    /// `for (init; cond; iter) body`. Each clause is independently
    /// optional, per the C-like grammar's `for(;;)` allowance (§4.4).
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        iter: Option<Box<Stmt>>,
        body: Box<Stmt>,
    },
    Break,
    Expr(Expr),
}

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Pos,
}

impl Stmt {
    #[must_use]
    pub fn new(kind: StmtKind, pos: Pos) -> Self {
        Stmt { kind, pos }
    }
}
