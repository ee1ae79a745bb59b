//! The output SSA IR: type aliases, functions, basic blocks, instructions.

use crate::name::InternalName;
use std::fmt;

/// A basic block label (a fresh integer, per §3).
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Label(raw)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// An SSA variable id. Every `SsaId` is assigned exactly once across the
/// function it occurs in (§3 invariant).
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SsaId(u32);

impl SsaId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        SsaId(raw)
    }
}

impl fmt::Debug for SsaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for SsaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// An IR-level type: integers of known widths, pointers, aliases for
/// classes, function pointers.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum IrType {
    /// 32-bit integer (`Int`).
    I32,
    /// 1-bit integer (`Bool`).
    I1,
    /// 64-bit double (`Float`).
    F64,
    Void,
    /// Pointer to a class type alias, named by the class's internal name.
    Ptr(InternalName),
    /// Pointer to an arbitrary IR type — used for `Pointer`-bound class
    /// members, which are always stored by address regardless of whether
    /// the pointee is a primitive or another class alias.
    Pointer(Box<IrType>),
    FunctionPtr {
        ret: Box<IrType>,
        params: Vec<IrType>,
    },
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::I32 => write!(f, "i32"),
            IrType::I1 => write!(f, "i1"),
            IrType::F64 => write!(f, "double"),
            IrType::Void => write!(f, "void"),
            IrType::Ptr(name) => write!(f, "%{name}*"),
            IrType::Pointer(inner) => write!(f, "{inner}*"),
            IrType::FunctionPtr { ret, params } => {
                write!(f, "{ret} (")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")*")
            }
        }
    }
}

/// A type alias binding a class's internal name to a structure layout of
/// its pointer members, in declaration order.
#[derive(Clone, Debug)]
pub struct TypeAlias {
    pub name: InternalName,
    pub fields: Vec<IrType>,
}

/// Linkage for an IR function declaration. This core only ever emits
/// `External`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Linkage {
    External,
}

/// Calling convention. This core only ever emits `FastCC` (per §3/§6).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CallingConvention {
    FastCc,
}

bitflags::bitflags! {
    /// Function-level attributes. Top-level source functions carry
    /// [`FunctionAttrs::SHADOW_STACK`]; lifted lambdas carry none (§3, §6).
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
    pub struct FunctionAttrs: u8 {
        /// Shadow-stack GC collector tag (§1 non-goals: no GC semantics
        /// beyond this marker).
        const SHADOW_STACK = 0b0000_0001;
    }
}

/// An IR function declaration (the callable's signature, independent of
/// whether a body is attached).
#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub name: InternalName,
    pub linkage: Linkage,
    pub calling_convention: CallingConvention,
    pub ret: IrType,
    pub params: Vec<IrType>,
    pub variadic: bool,
}

/// An IR value: an SSA variable reference or a constant/global.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum IrValue {
    Var(SsaId),
    ConstInt(i32),
    ConstBool(bool),
    ConstFloat(u64), // f64 bits, for Eq/Hash-friendliness
    /// A reference to a global symbol (a top-level function or lifted
    /// lambda), used as a function-pointer value.
    Global(InternalName),
}

impl IrValue {
    #[must_use]
    pub fn const_float(v: f64) -> Self {
        IrValue::ConstFloat(v.to_bits())
    }
}

/// A binary IR operator, as emitted by the expression lowerer.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum IrBinOp {
    /// Integer add (`Int` operands).
    AddInt,
    /// Float add (`Float` operands).
    AddFloat,
    /// Signed less-than compare, `Int` operands, produces `I1`.
    IcmpSltInt,
    /// Ordered less-than compare, `Float` operands, produces `I1`.
    FcmpOltFloat,
}

/// The right-hand side of an `Assignment` statement.
#[derive(Clone, Debug)]
pub enum IrExpr {
    /// Load the value pointed to by `addr`.
    Load { addr: IrValue, ty: IrType },
    Bin {
        op: IrBinOp,
        lhs: IrValue,
        rhs: IrValue,
    },
    /// A fastcc call.
    Call {
        callee: IrValue,
        args: Vec<IrValue>,
        ret: IrType,
    },
    /// Heap allocation for constructor syntax: `Malloc(class_alias, count)`.
    Malloc {
        class_alias: InternalName,
        count: u64,
    },
    /// A φ-node: selects an incoming value based on the predecessor block.
    Phi {
        ty: IrType,
        incoming: Vec<(IrValue, Label)>,
    },
}

/// A single statement in a basic block.
#[derive(Clone, Debug)]
pub enum IrStmt {
    Assignment { lhs: SsaId, rhs: IrExpr },
    Store { value: IrValue, addr: IrValue },
    Return(Option<IrValue>),
    Branch(Label),
    BranchIf {
        cond: IrValue,
        then_label: Label,
        else_label: Label,
    },
    Unreachable,
}

impl IrStmt {
    /// True for the four terminator kinds; every basic block must end in
    /// exactly one of these (§3 invariant).
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            IrStmt::Return(_) | IrStmt::Branch(_) | IrStmt::BranchIf { .. } | IrStmt::Unreachable
        )
    }
}

/// A labelled, straight-line sequence of statements ending in exactly one
/// terminator.
#[derive(Clone, Debug)]
pub struct BasicBlock {
    pub label: Label,
    pub stmts: Vec<IrStmt>,
}

impl BasicBlock {
    #[must_use]
    pub fn terminator(&self) -> Option<&IrStmt> {
        self.stmts.last().filter(|s| s.is_terminator())
    }
}

/// A complete IR function: declaration, formal parameter names, attributes,
/// optional section, and body.
#[derive(Clone, Debug)]
pub struct Function {
    pub decl: FunctionDecl,
    pub param_names: Vec<InternalName>,
    pub attrs: FunctionAttrs,
    pub section: Option<String>,
    pub blocks: Vec<BasicBlock>,
}

/// The final assembled IR module: type aliases followed by functions
/// (lifted lambdas first, then top-level source functions — §4.5).
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub aliases: Vec<TypeAlias>,
    pub functions: Vec<Function>,
}
