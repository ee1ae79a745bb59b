//! Module assembler (§4.5): one type alias per class, concatenated with
//! lifted lambdas and then top-level source functions.

use crate::ctx::Ctx;
use crate::ir_type::ir_type;
use clc_diagnostic::Diagnostic;
use clc_ir::ast::FunctionArg;
use clc_ir::ast::Stmt;
use clc_ir::ir::{CallingConvention, Function, FunctionAttrs, FunctionDecl, IrType, IrValue, Linkage, Module, TypeAlias};
use clc_ir::{ClassTable, InternalName, Pos, RType, StackReference};

/// One alias per class, in class-ID order for deterministic output: name =
/// the class's internal name, layout = its `Pointer`-bound members' IR
/// types in declaration order. Every member is address-taken (§3), so each
/// field is a pointer to the member's type, not the type itself.
#[must_use]
pub fn class_aliases(classes: &ClassTable) -> Vec<TypeAlias> {
    let mut entries: Vec<_> = classes.iter().collect();
    entries.sort_by_key(|(id, _)| id.raw());
    entries
        .into_iter()
        .map(|(_, entry)| TypeAlias {
            name: entry.internal_name.clone(),
            fields: entry
                .layout_members()
                .map(|(_, ty)| IrType::Pointer(Box::new(ir_type(ty, classes))))
                .collect(),
        })
        .collect()
}

/// Lower one top-level function's body, then check its declared return type
/// against the body's inferred return-flow — unlike a lambda, a top-level
/// function's return type comes from its signature, not from inference, so
/// this is a post-hoc agreement check rather than a seeded hint.
pub fn lower_top_level_function(
    ctx: &mut Ctx<'_>,
    name: &str,
    declared_ret: &RType,
    args: &[FunctionArg],
    body: &[Stmt],
    pos: Pos,
) -> Result<Function, Diagnostic> {
    let mut param_types = Vec::with_capacity(args.len());
    let mut param_names = Vec::with_capacity(args.len());
    let (blocks, inferred_ret) = ctx.with_scope(|ctx| {
        for arg in args {
            let tp = clc_resolve::resolve_type(&arg.ty, &ctx.stack)?;
            let ssa = ctx.uniq.fresh_ssa();
            ctx.stack.put(
                arg.name.clone(),
                StackReference::Variable(tp.clone(), IrValue::Var(ssa)),
                &mut ctx.uniq,
            );
            param_types.push(tp);
            param_names.push(InternalName::new(arg.name.clone()));
        }
        ctx.lower_body(body, None)
    })?;

    if &inferred_ret != declared_ret {
        return Err(Diagnostic::WrongReturnType {
            expected: declared_ret.to_string(),
            found: inferred_ret.to_string(),
            pos,
        });
    }

    Ok(Function {
        decl: FunctionDecl {
            name: InternalName::new(name.to_string()),
            linkage: Linkage::External,
            calling_convention: CallingConvention::FastCc,
            ret: ir_type(declared_ret, ctx.classes),
            params: param_types.iter().map(|t| ir_type(t, ctx.classes)).collect(),
            variadic: false,
        },
        // Top-level source functions carry the shadow-stack GC tag; lifted
        // lambdas carry none (§3, §6).
        attrs: FunctionAttrs::SHADOW_STACK,
        param_names,
        section: None,
        blocks,
    })
}

/// Concatenate aliases, then lifted lambdas, then top-level functions —
/// lambdas precede their callers since forward references are disallowed.
#[must_use]
pub fn assemble(classes: &ClassTable, lifted: Vec<Function>, top_level: Vec<Function>) -> Module {
    Module {
        aliases: class_aliases(classes),
        functions: lifted.into_iter().chain(top_level).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clc_ir::{ClassEntry, ClassId, Scope};

    #[test]
    fn one_alias_per_class_with_pointer_field_layout() {
        let mut classes = ClassTable::new();
        let mut members = Scope::new();
        members.insert("x", InternalName::new("x"), StackReference::Pointer(RType::Int));
        classes.insert(
            ClassId::new(0),
            ClassEntry {
                source_name: "Point".into(),
                internal_name: InternalName::new("Point"),
                members,
            },
        );
        let aliases = class_aliases(&classes);
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].name.as_str(), "Point");
        assert_eq!(aliases[0].fields, vec![IrType::Pointer(Box::new(IrType::I32))]);
    }
}
