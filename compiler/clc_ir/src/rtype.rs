//! Resolved source types (`RType`).

use crate::scope::ClassId;
use std::fmt;

/// A resolved source type. Equality is structural; `ClassRef` equality is
/// by class id.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum RType {
    /// Machine word, 32-bit for this specification.
    Int,
    /// 1-bit.
    Bool,
    /// 64-bit double.
    Float,
    Void,
    /// A reference to a user-defined class by its assigned integer id.
    ClassRef(ClassId),
    Function {
        ret: Box<RType>,
        params: Vec<RType>,
    },
}

impl RType {
    #[must_use]
    pub fn function(ret: RType, params: Vec<RType>) -> Self {
        RType::Function {
            ret: Box::new(ret),
            params,
        }
    }

    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(self, RType::Function { .. })
    }

    /// True if `self` is numeric (`Int` or `Float`) — the only types
    /// `BinPlus`/`BinLess` accept as operands.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, RType::Int | RType::Float)
    }

    /// Type-expectation compatibility (§4.3): `self` (the produced type) is
    /// compatible with `expected`, honoring the special rule that a
    /// `Function(Void, args)` expectation accepts any `Function(_, args)`
    /// with a matching parameter list — this lets a lambda's unknown return
    /// type flow into a function-typed slot.
    #[must_use]
    pub fn matches_expectation(&self, expected: &RType) -> bool {
        match (self, expected) {
            (
                RType::Function { params: ps, .. },
                RType::Function {
                    ret: exp_ret,
                    params: exp_ps,
                },
            ) if **exp_ret == RType::Void => ps == exp_ps,
            _ => self == expected,
        }
    }
}

impl fmt::Display for RType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RType::Int => write!(f, "int"),
            RType::Bool => write!(f, "bool"),
            RType::Float => write!(f, "float"),
            RType::Void => write!(f, "void"),
            RType::ClassRef(id) => write!(f, "class#{id}"),
            RType::Function { ret, params } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
        }
    }
}
