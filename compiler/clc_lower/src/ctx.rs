//! Shared lowering context: the uniqueness counter, the lexical stack, the
//! class table, and the append-only lifted-lambda list (§5 resource model).

use clc_ir::ir::{Function, Label};
use clc_ir::ClassTable;
use clc_scope::{Stack, Uniq};
use clc_stacksafe::ensure_sufficient_stack;

/// Mutable state threaded through statement and expression lowering for one
/// compilation.
pub struct Ctx<'a> {
    pub uniq: Uniq,
    pub stack: Stack,
    pub classes: &'a ClassTable,
    /// Lifted lambda functions, in the order they were encountered.
    /// Append-only for the duration of lowering.
    pub lifted: Vec<Function>,
    /// The enclosing module's name, folded into each lifted lambda's
    /// internal name so two independently-compiled modules don't collide
    /// if later linked (§6).
    pub module_name: String,
    loop_ends: Vec<Label>,
}

impl<'a> Ctx<'a> {
    #[must_use]
    pub fn new(classes: &'a ClassTable, module_name: impl Into<String>) -> Self {
        Ctx {
            uniq: Uniq::new(),
            stack: Stack::new(),
            classes,
            lifted: Vec::new(),
            module_name: module_name.into(),
            loop_ends: Vec::new(),
        }
    }

    /// Push a scope, run `f`, and pop unconditionally — the RAII-style
    /// scope guard used for `{...}` blocks, function bodies, and each
    /// branch of `if` (§4.2).
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.stack.push();
        let result = f(self);
        self.stack.pop();
        result
    }

    /// Run `f` with `end_label` visible to `break` as the enclosing loop's
    /// exit, restoring the previous loop context (if any) on exit.
    pub fn with_loop<T>(&mut self, end_label: Label, f: impl FnOnce(&mut Self) -> T) -> T {
        self.loop_ends.push(end_label);
        let result = f(self);
        self.loop_ends.pop();
        result
    }

    /// The innermost enclosing loop's exit label, if any. `None` outside
    /// any loop, in which case a `break` is a fatal internal error (§5, §7).
    #[must_use]
    pub fn current_loop_end(&self) -> Option<Label> {
        self.loop_ends.last().copied()
    }

    /// Run `f` against a stack temporarily emptied of every enclosing
    /// scope, restoring it on exit. A lambda body lowers under this so it
    /// captures nothing lexically (§4.3).
    pub fn with_shadowed_stack<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::take(&mut self.stack);
        let result = f(self);
        self.stack = saved;
        result
    }
}

/// Wrap a structurally-recursive lowering call in a stack-growth guard.
/// Expression and statement lowering recurse over AST nesting of unbounded
/// depth (§5).
pub fn guarded<R>(f: impl FnOnce() -> R) -> R {
    ensure_sufficient_stack(f)
}
