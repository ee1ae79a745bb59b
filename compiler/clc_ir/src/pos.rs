//! The opaque source position carried by AST nodes.
//!
//! Lexing, parsing, and the position/source-map layer are external
//! collaborators of this core (see the crate-level docs); this core only
//! ever stores and forwards positions into diagnostics, never interprets
//! them. `Pos` is therefore a minimal opaque wrapper, not a line/column
//! pair — a real driver can carry richer data through the same slot by
//! swapping this type out.

use std::fmt;

/// An opaque source position, attached to AST nodes and forwarded into
/// diagnostics for error attribution.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Pos(u32);

impl Pos {
    /// A position with no useful source attribution (e.g. synthesized AST
    /// nodes, such as the desugared `for(;;)` condition).
    pub const SYNTHETIC: Pos = Pos(u32::MAX);

    /// Construct a position from a raw byte offset.
    #[must_use]
    pub const fn new(offset: u32) -> Self {
        Pos(offset)
    }

    /// The raw byte offset, if this position is not synthetic.
    #[must_use]
    pub const fn offset(self) -> Option<u32> {
        if self.0 == u32::MAX {
            None
        } else {
            Some(self.0)
        }
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset() {
            Some(off) => write!(f, "Pos({off})"),
            None => write!(f, "Pos(synthetic)"),
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset() {
            Some(off) => write!(f, "@{off}"),
            None => write!(f, "@?"),
        }
    }
}
