//! Portable compiler driver: ties name/type resolution (`clc_resolve`) and
//! IR lowering (`clc_lower`) into one `compile` entry point. No IO, no CLI —
//! callers own how source text becomes a [`Definition`] list and what they
//! do with the resulting [`Module`] (§6).

use clc_diagnostic::Diagnostic;
use clc_ir::ast::{Definition, DefinitionKind};
use clc_ir::ir::Module;
use clc_lower::Ctx;
use tracing::{debug, instrument};

/// External configuration for one compilation (§6, §10).
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Folded into every lifted lambda's internal name, so two
    /// independently-compiled modules don't collide if later linked.
    pub module_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            module_name: "module".to_string(),
        }
    }
}

/// Resolve and lower `defs` into a complete [`Module`].
///
/// Resolution accumulates every diagnostic it finds (§4.1, §7); lowering is
/// fail-fast and stops at the first function whose body can't be lowered.
/// Either way, failure is reported as a non-empty `Vec<Diagnostic>`.
#[instrument(skip(defs), fields(module = %config.module_name), level = "debug")]
pub fn compile(defs: &[Definition], config: PipelineConfig) -> Result<Module, Vec<Diagnostic>> {
    let (top, classes) = clc_resolve::resolve_definitions(defs).map_err(|errors| {
        debug!(error_count = errors.len(), "resolution failed");
        errors
    })?;
    debug!(definition_count = defs.len(), "resolution complete");

    let mut ctx = Ctx::new(&classes, config.module_name.clone());
    ctx.stack.add(top.clone());

    let mut top_level = Vec::new();
    for def in defs {
        if let DefinitionKind::Function { name, args, body, .. } = &def.kind {
            let Some((_, reference)) = top.get(name) else {
                unreachable!("every top-level function name is bound during resolution");
            };
            let declared_ret = match reference {
                clc_ir::StackReference::Function { ret, .. } => ret.clone(),
                _ => unreachable!("a function's own binding is always `StackReference::Function`"),
            };
            debug!(function = %name, "lowering function");
            let function = clc_lower::lower_top_level_function(&mut ctx, name, &declared_ret, args, body, def.pos)
                .map_err(|e| vec![e])?;
            debug!(function = %name, "lowered function");
            top_level.push(function);
        }
    }

    Ok(clc_lower::assemble(&classes, ctx.lifted, top_level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clc_ir::ast::{FunctionArg, Stmt, StmtKind, TypeRef};
    use clc_ir::Pos;
    use pretty_assertions::assert_eq;

    fn def(kind: DefinitionKind) -> Definition {
        Definition::new(kind, Pos::SYNTHETIC)
    }

    #[test]
    fn identity_function_compiles_to_one_top_level_function() {
        let defs = vec![def(DefinitionKind::Function {
            name: "identity".into(),
            ret: TypeRef::new("int", Pos::SYNTHETIC),
            args: vec![FunctionArg {
                name: "x".into(),
                ty: TypeRef::new("int", Pos::SYNTHETIC),
            }],
            body: vec![Stmt::new(
                StmtKind::Return(Some(clc_ir::ast::Expr::new(
                    clc_ir::ast::ExprKind::Id(clc_ir::ast::ConstId::simple("x")),
                    Pos::SYNTHETIC,
                ))),
                Pos::SYNTHETIC,
            )],
        })];

        let module = compile(&defs, PipelineConfig::default()).unwrap();
        assert_eq!(module.functions.len(), 1);
        assert_eq!(module.functions[0].decl.name.as_str(), "identity");
    }

    #[test]
    fn mismatched_declared_return_type_fails() {
        let defs = vec![def(DefinitionKind::Function {
            name: "broken".into(),
            ret: TypeRef::new("bool", Pos::SYNTHETIC),
            args: vec![],
            body: vec![Stmt::new(
                StmtKind::Return(Some(clc_ir::ast::Expr::new(clc_ir::ast::ExprKind::Int(1), Pos::SYNTHETIC))),
                Pos::SYNTHETIC,
            )],
        })];

        let errors = compile(&defs, PipelineConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Diagnostic::WrongReturnType { .. }));
    }

    #[test]
    fn unresolvable_type_is_reported_without_panicking() {
        let defs = vec![def(DefinitionKind::Function {
            name: "f".into(),
            ret: TypeRef::new("Nope", Pos::SYNTHETIC),
            args: vec![],
            body: vec![],
        })];

        let errors = compile(&defs, PipelineConfig::default()).unwrap_err();
        assert!(!errors.is_empty());
    }
}
