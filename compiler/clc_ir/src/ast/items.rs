//! Top-level and class-member definitions.

use super::stmt::Stmt;
use super::types::TypeRef;
use crate::Pos;

/// A class constructor/member-declaration argument: `name: ty`.
#[derive(Clone, Debug)]
pub struct ClassArg {
    pub name: String,
    pub ty: TypeRef,
}

/// A function (or lambda) formal parameter: `name: ty`.
#[derive(Clone, Debug)]
pub struct FunctionArg {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Clone, Debug)]
pub enum DefinitionKind {
    /// A top-level variable declaration, e.g. `int x, y;`.
    Variable { ty: TypeRef, names: Vec<String> },
    Class {
        name: String,
        args: Vec<ClassArg>,
        body: Vec<Definition>,
    },
    Function {
        name: String,
        ret: TypeRef,
        args: Vec<FunctionArg>,
        body: Vec<Stmt>,
    },
    Import(String),
}

#[derive(Clone, Debug)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub pos: Pos,
}

impl Definition {
    #[must_use]
    pub fn new(kind: DefinitionKind, pos: Pos) -> Self {
        Definition { kind, pos }
    }
}
