//! Data model for the class-language compiler core.
//!
//! This crate contains the core data structures shared by resolution and
//! lowering:
//! - [`ast`]: the input AST (definitions, statements, expressions) as handed
//!   down by the (external) parser.
//! - [`rtype`]: resolved source types (`RType`).
//! - [`scope`]: the shapes used by the lexical stack — `StackReference`,
//!   `Scope`, and the `ClassTable`. The stack's *behavior* (push/pop/lookup/…)
//!   lives in the sibling `clc_scope` crate, which is built on these shapes.
//! - [`ir`]: the output SSA IR module (type aliases, functions, basic blocks,
//!   instructions).
//! - [`name`] / [`ids`]: internal names, class IDs, labels, and SSA ids.
//! - [`pos`]: the opaque source position carried by AST nodes.
//!
//! # Design philosophy
//!
//! Unlike a full-scale compiler's IR crate, there is no interning here:
//! class/function/variable counts in a single compilation unit are small, so
//! plain `String`/`Vec` are used throughout in favor of index-based arenas.
//! The one place identity matters — class IDs — gets a dedicated newtype.

pub mod ast;
pub mod ir;
pub mod name;
pub mod pos;
pub mod rtype;
pub mod scope;

pub use name::InternalName;
pub use pos::Pos;
pub use rtype::RType;
pub use scope::{ClassEntry, ClassId, ClassTable, Scope, StackReference};
