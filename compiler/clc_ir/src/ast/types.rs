//! Source-level type annotations, as written by the programmer.

use crate::Pos;

/// A parsed type annotation: `int`, `bool`, `float`, `void`, or a named
/// class reference. Resolution (`clc_resolve`) is what turns this into an
/// [`crate::RType`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeRef {
    pub name: String,
    pub pos: Pos,
}

impl TypeRef {
    #[must_use]
    pub fn new(name: impl Into<String>, pos: Pos) -> Self {
        TypeRef {
            name: name.into(),
            pos,
        }
    }
}
