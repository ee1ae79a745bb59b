//! The lexical environment: a stack of [`Scope`]s, searched innermost-first.

use crate::uniq::Uniq;
use clc_diagnostic::Diagnostic;
use clc_ir::ir::IrValue;
use clc_ir::{InternalName, Pos, RType, Scope, StackReference};
use rustc_hash::FxHashMap;

/// The lexical stack used by both resolution and lowering.
///
/// `push`/`pop` are rarely called directly outside this crate; prefer
/// [`Stack::with_scope`], which pushes, runs a closure, and pops
/// unconditionally on every return path (mirroring the teacher crate's own
/// `with_*_scope` RAII helpers), so a fallible lowering step can never leak
/// an unbalanced scope.
#[derive(Clone, Debug, Default)]
pub struct Stack {
    scopes: Vec<Scope>,
}

impl Stack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// # Panics
    /// Panics if the stack is empty; this is a programmer error (§5).
    pub fn pop(&mut self) -> Scope {
        self.scopes.pop().expect("pop on empty stack")
    }

    /// Push a pre-built scope, e.g. the resolved top-level scope or a
    /// function's parameter scope.
    pub fn add(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    /// Push an empty scope, run `f`, pop unconditionally, and return `f`'s
    /// result.
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.push();
        let result = f(self);
        self.pop();
        result
    }

    /// Bind `name` to a fresh address-taken slot of type `tp`, with internal
    /// name equal to the source name (class field layout relies on this).
    pub fn alloc(&mut self, name: impl Into<String>, tp: RType) -> InternalName {
        let name = name.into();
        let internal = InternalName::new(name.clone());
        self.innermost_mut()
            .insert(name, internal.clone(), StackReference::Pointer(tp));
        internal
    }

    /// Bind `name` to `reference`, with a fresh `source_name.N` internal
    /// name for SSA disambiguation. Used for local declarations and for
    /// rewriting a `Variable` binding's SSA name on assignment.
    pub fn put(&mut self, name: impl Into<String>, reference: StackReference, uniq: &mut Uniq) -> InternalName {
        let name = name.into();
        let internal = InternalName::with_suffix(&name, uniq.fresh_suffix());
        self.innermost_mut().insert(name, internal.clone(), reference);
        internal
    }

    /// Walk innermost to outermost for the first binding of `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&(InternalName, StackReference)> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// [`Stack::lookup`], raising [`Diagnostic::LookupFailure`] on miss.
    pub fn lookup_or_fail(&self, name: &str, pos: Pos) -> Result<&(InternalName, StackReference), Diagnostic> {
        self.lookup(name).ok_or_else(|| Diagnostic::LookupFailure {
            name: name.to_string(),
            pos,
        })
    }

    /// Run `f` with the stack temporarily emptied, restoring the prior
    /// stack on exit. Used when lowering lambda bodies, which must not see
    /// the enclosing function's locals.
    pub fn shadow<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::take(&mut self.scopes);
        let result = f(self);
        self.scopes = saved;
        result
    }

    /// A snapshot suitable for later [`Stack::restore`]. Used by the
    /// loop/phi engine to roll back header-introduced bindings after
    /// reading the post-body values for phi construction (§4.4 step 6).
    #[must_use]
    pub fn snapshot(&self) -> Vec<Scope> {
        self.scopes.clone()
    }

    pub fn restore(&mut self, snapshot: Vec<Scope>) {
        self.scopes = snapshot;
    }

    fn innermost_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("binding onto an empty stack")
    }
}

/// Per corresponding scope pair in `before`/`after`, the set of names whose
/// binding changed, mapped to `(old, new)`. This is the primitive the
/// loop/phi engine uses to discover which locals need a phi node (§4.4).
#[must_use]
pub fn stack_diff(
    before: &[Scope],
    after: &[Scope],
) -> FxHashMap<String, (StackReference, StackReference)> {
    let mut diff = FxHashMap::default();
    for (before_scope, after_scope) in before.iter().zip(after.iter()) {
        let before_bindings: FxHashMap<&str, &StackReference> = before_scope
            .in_order()
            .map(|(name, _, reference)| (name, reference))
            .collect();
        for (name, _, after_ref) in after_scope.in_order() {
            match before_bindings.get(name) {
                Some(before_ref) if *before_ref != after_ref => {
                    diff.insert(name.to_string(), ((*before_ref).clone(), after_ref.clone()));
                }
                None => {
                    // Bound fresh within this scope after the snapshot; not a
                    // rebind, so not part of the phi set.
                }
                _ => {}
            }
        }
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fresh_var(uniq: &mut Uniq) -> IrValue {
        IrValue::Var(uniq.fresh_ssa())
    }

    #[test]
    fn lookup_walks_innermost_to_outermost() {
        let mut stack = Stack::new();
        let mut uniq = Uniq::new();
        stack.push();
        let v = fresh_var(&mut uniq);
        stack.put("x", StackReference::Variable(RType::Int, v), &mut uniq);
        stack.with_scope(|s| {
            let v = fresh_var(&mut uniq);
            s.put("x", StackReference::Variable(RType::Bool, v), &mut uniq);
            let (_, reference) = s.lookup("x").unwrap();
            assert_eq!(reference.value_type(), Some(RType::Bool));
        });
        let (_, reference) = stack.lookup("x").unwrap();
        assert_eq!(reference.value_type(), Some(RType::Int));
    }

    #[test]
    fn shadow_hides_enclosing_locals() {
        let mut stack = Stack::new();
        let mut uniq = Uniq::new();
        stack.push();
        let v = fresh_var(&mut uniq);
        stack.put("x", StackReference::Variable(RType::Int, v), &mut uniq);
        let found_inside = stack.shadow(|s| s.lookup("x").is_some());
        assert!(!found_inside);
        assert!(stack.lookup("x").is_some());
    }

    #[test]
    fn stack_diff_reports_only_rebound_names() {
        let mut stack = Stack::new();
        let mut uniq = Uniq::new();
        stack.push();
        let v = fresh_var(&mut uniq);
        stack.put("s", StackReference::Variable(RType::Int, v), &mut uniq);
        let v = fresh_var(&mut uniq);
        stack.put("untouched", StackReference::Variable(RType::Int, v), &mut uniq);
        let before = stack.snapshot();
        let v = fresh_var(&mut uniq);
        stack.put("s", StackReference::Variable(RType::Int, v), &mut uniq);
        let after = stack.snapshot();

        let diff = stack_diff(&before, &after);
        assert_eq!(diff.len(), 1);
        assert!(diff.contains_key("s"));
    }
}
