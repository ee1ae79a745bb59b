//! Lambda lifting (§4.3): a lambda body is lowered capture-free and hoisted
//! into the module's function list; the expression's value is a reference
//! to the freshly named function.

use crate::ctx::Ctx;
use crate::expr::Outcome;
use clc_diagnostic::Diagnostic;
use clc_ir::ast::Stmt;
use clc_ir::ir::{CallingConvention, Function, FunctionAttrs, FunctionDecl, IrValue, Linkage};
use clc_ir::{InternalName, Pos, RType, StackReference, TypeRef};

pub fn lower_lambda(
    ctx: &mut Ctx<'_>,
    args: &[(String, TypeRef)],
    body: &[Stmt],
    expect: Option<&RType>,
    _pos: Pos,
) -> Result<Outcome, Diagnostic> {
    let k = ctx.uniq.fresh_suffix();
    let internal_name = InternalName::new(format!("{}.lambda{k}", ctx.module_name));

    let mut arg_types = Vec::with_capacity(args.len());
    for (_, ty) in args {
        arg_types.push(clc_resolve::resolve_type(ty, &ctx.stack)?);
    }

    let return_hint = match expect {
        Some(RType::Function { ret, .. }) => Some((**ret).clone()),
        _ => None,
    };

    let (blocks, param_names, ret_type) = ctx.with_shadowed_stack(|ctx| {
        ctx.with_scope(|ctx| {
            let mut param_names = Vec::with_capacity(args.len());
            for ((name, _), tp) in args.iter().zip(arg_types.iter()) {
                let ssa = ctx.uniq.fresh_ssa();
                ctx.stack.put(
                    name.clone(),
                    StackReference::Variable(tp.clone(), IrValue::Var(ssa)),
                    &mut ctx.uniq,
                );
                param_names.push(InternalName::new(name.clone()));
            }
            let (blocks, ret_type) = ctx.lower_body(body, return_hint.clone())?;
            Ok::<_, Diagnostic>((blocks, param_names, ret_type))
        })
    })?;

    let param_ir_types: Vec<_> = arg_types.iter().map(|t| crate::ir_type::ir_type(t, ctx.classes)).collect();
    let ret_ir_type = crate::ir_type::ir_type(&ret_type, ctx.classes);

    ctx.lifted.push(Function {
        decl: FunctionDecl {
            name: internal_name.clone(),
            linkage: Linkage::External,
            calling_convention: CallingConvention::FastCc,
            ret: ret_ir_type,
            params: param_ir_types,
            variadic: false,
        },
        // Lifted lambdas carry no attributes: the shadow-stack GC tag is
        // only for top-level source functions (§3, §6).
        attrs: FunctionAttrs::empty(),
        param_names,
        section: None,
        blocks,
    });

    Ok(Outcome::Calc(
        vec![],
        IrValue::Global(internal_name),
        RType::function(ret_type, arg_types),
    ))
}
