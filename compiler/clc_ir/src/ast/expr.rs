//! Expression AST.

use super::stmt::Stmt;
use super::types::TypeRef;
use crate::Pos;

/// A qualified identifier. This core uses only `path[0]` for lookup (dotted
/// access is out of scope); `absolute` is carried through but unused.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ConstId {
    pub absolute: bool,
    pub path: Vec<String>,
}

impl ConstId {
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        ConstId {
            absolute: false,
            path: vec![name.into()],
        }
    }

    /// The only path segment this core consults.
    #[must_use]
    pub fn head(&self) -> &str {
        self.path.first().map_or("", String::as_str)
    }
}

/// Binary operators recognised by this core. Others may appear in a fuller
/// grammar but are not part of the specified lowering (§4.3).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BinOp {
    /// `<`
    Less,
    /// `+`
    Plus,
}

/// Assignment operators. This core only lowers `Eq` (plain `=`); compound
/// assignment operators are accepted syntactically but rejected by the
/// lowerer the same way an unsupported construct would be.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AssignOp {
    Eq,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Int(i64),
    Id(ConstId),
    Assign {
        op: AssignOp,
        lvalue: Box<Expr>,
        rhs: Box<Expr>,
    },
    Bin {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Lambda {
        args: Vec<(String, TypeRef)>,
        body: Vec<Stmt>,
    },
    /// Present in the grammar but given no lowering in this core (§4.3,
    /// §9 open questions) — always lowers to `Unsupported`.
    Index {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
}

impl Expr {
    #[must_use]
    pub fn new(kind: ExprKind, pos: Pos) -> Self {
        Expr { kind, pos }
    }
}
