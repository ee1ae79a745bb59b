//! Shapes used by the lexical stack: `StackReference`, `Scope`, and the
//! `ClassTable`.
//!
//! The stack's *behavior* — push/pop/alloc/put/lookup/add/shadow,
//! `stack_diff` — is implemented over these shapes in the sibling
//! `clc_scope` crate. Keeping the shapes here (rather than in `clc_scope`)
//! lets `RType::ClassRef` and `ClassTable` live next to each other without a
//! dependency cycle between the two crates.

use crate::ir::IrValue;
use crate::name::InternalName;
use crate::rtype::RType;
use rustc_hash::FxHashMap;
use std::fmt;

/// A unique, non-negative class identifier, allocated once during
/// resolution and never reused.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        ClassId(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a name on the lexical stack is bound to.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum StackReference {
    /// A named lexical slot holding a value of this type by address (used
    /// for class fields).
    Pointer(RType),
    /// A name bound to a value of this type directly (no address taken):
    /// either an SSA variable, or a constant carried straight through
    /// (e.g. a locally-declared literal never gets its own `Assignment`).
    Variable(RType, IrValue),
    /// A top-level function binding.
    Function { ret: RType, params: Vec<RType> },
    /// A name bound to a class, used both for type annotations and for
    /// `T(...)` constructor syntax.
    Class(ClassId),
}

impl StackReference {
    /// The `RType` a value produced by reading this reference would have,
    /// if this reference denotes a value at all (classes do not).
    #[must_use]
    pub fn value_type(&self) -> Option<RType> {
        match self {
            StackReference::Pointer(t) | StackReference::Variable(t, _) => Some(t.clone()),
            StackReference::Function { ret, params } => Some(RType::function(
                ret.clone(),
                params.clone(),
            )),
            StackReference::Class(_) => None,
        }
    }
}

/// An ordered mapping from source name to `(internal_name, StackReference)`.
///
/// Insertion order is preserved (via the backing `Vec`) because class
/// layouts need declaration order for their `Pointer`-bound members; lookup
/// by name is still O(1) via the companion index.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    order: Vec<String>,
    bindings: FxHashMap<String, (InternalName, StackReference)>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `(name -> (internal_name, reference))`, shadowing any prior
    /// binding for `name` within this scope.
    pub fn insert(&mut self, name: impl Into<String>, internal: InternalName, ref_: StackReference) {
        let name = name.into();
        if !self.bindings.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.bindings.insert(name, (internal, ref_));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&(InternalName, StackReference)> {
        self.bindings.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Members in declaration order, as needed when a `Scope` is used as a
    /// class's member scope and its `Pointer`-bound members form the class
    /// layout.
    pub fn in_order(&self) -> impl Iterator<Item = (&str, &InternalName, &StackReference)> {
        self.order.iter().map(move |name| {
            let (internal, ref_) = &self.bindings[name];
            (name.as_str(), internal, ref_)
        })
    }
}

/// A class's entry in the class table: its source name, internal name, and
/// member scope (built during resolution from the class body).
#[derive(Clone, Debug)]
pub struct ClassEntry {
    pub source_name: String,
    pub internal_name: InternalName,
    pub members: Scope,
}

impl ClassEntry {
    /// The class's `Pointer`-bound members, in declaration order — these
    /// form the class's layout (see `clc_lower`'s module assembler).
    pub fn layout_members(&self) -> impl Iterator<Item = (&str, &RType)> {
        self.members.in_order().filter_map(|(name, _, ref_)| {
            if let StackReference::Pointer(ty) = ref_ {
                Some((name, ty))
            } else {
                None
            }
        })
    }
}

/// A mapping from `ClassId` to `ClassEntry`, written only during resolution
/// and read-only thereafter.
#[derive(Clone, Debug, Default)]
pub struct ClassTable {
    entries: FxHashMap<ClassId, ClassEntry>,
}

impl ClassTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ClassId, entry: ClassEntry) {
        self.entries.insert(id, entry);
    }

    #[must_use]
    pub fn get(&self, id: ClassId) -> Option<&ClassEntry> {
        self.entries.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClassId, &ClassEntry)> {
        self.entries.iter()
    }
}
