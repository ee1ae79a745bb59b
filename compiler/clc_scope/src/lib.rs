//! The lexical scope stack shared by resolution and lowering (§4.2).
//!
//! [`clc_ir::scope`] defines the shapes (`Scope`, `StackReference`,
//! `ClassTable`); this crate defines the *behavior* over them.

mod stack;
mod uniq;

pub use stack::{stack_diff, Stack};
pub use uniq::Uniq;
